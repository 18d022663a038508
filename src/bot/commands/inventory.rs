//! Inventory Discord commands - list and update stock.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, format, handlers::autocomplete},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Parent command for stock management.
    #[poise::command(slash_command, subcommands("inventory_list", "inventory_update"))]
    pub async fn inventory(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Inventory commands. Available subcommands:\n\
            `/inventory list` - Stock per beverage type\n\
            `/inventory update` - Set the stock of a beverage type";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows stock per beverage type at the current location.
    #[poise::command(slash_command, rename = "list")]
    pub async fn inventory_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let client = &ctx.data().client;
        client.load_inventory().await?;
        let state = client.snapshot().await;

        let embed = serenity::CreateEmbed::default()
            .title(format!(
                "📦 Inventory at {}",
                format::location_title(state.current_location.as_ref(), state.location_id)
            ))
            .description(format::inventory_list(&state.inventory)?)
            .color(format::LIST_COLOUR);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Sets the stock of a beverage type.
    #[poise::command(slash_command, rename = "update")]
    pub async fn inventory_update(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Beverage type"]
        #[autocomplete = "autocomplete::autocomplete_beverage"]
        beverage: String,
        #[description = "New quantity"] quantity: i64,
    ) -> Result<()> {
        let outcome = ctx
            .data()
            .client
            .update_inventory_item(&beverage, quantity)
            .await?;
        ctx.say(format::outcome_reply(
            outcome,
            &format!("Stock of **{}** set to {quantity}.", beverage.trim()),
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
