//! Location Discord commands - list locations and switch between them.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, format, handlers::autocomplete},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Parent command for locations.
    #[poise::command(slash_command, subcommands("location_list", "location_set"))]
    pub async fn location(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Location commands. Available subcommands:\n\
            `/location list` - Show all locations\n\
            `/location set` - Switch to another location";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists all locations and marks the current one.
    #[poise::command(slash_command, rename = "list")]
    pub async fn location_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let client = &ctx.data().client;
        client.load_locations().await?;
        let state = client.snapshot().await;

        let embed = serenity::CreateEmbed::default()
            .title("📍 Locations")
            .description(format::location_list(&state.locations, state.location_id)?)
            .color(format::LIST_COLOUR);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Switches to another location by name or id.
    #[poise::command(slash_command, rename = "set")]
    pub async fn location_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Location name or id"]
        #[autocomplete = "autocomplete::autocomplete_location"]
        location: String,
    ) -> Result<()> {
        let client = &ctx.data().client;
        if client.snapshot().await.locations.is_empty() {
            client.load_locations().await?;
        }

        let wanted = location.trim();
        let known = client.snapshot().await.locations;
        let Some(id) = known
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(wanted))
            .map(|l| l.id)
            .or_else(|| wanted.parse().ok())
        else {
            ctx.say(format!(
                "❌ Unknown location '{wanted}'. Use `/location list` to see them."
            ))
            .await?;
            return Ok(());
        };

        let outcome = client.change_location(id).await?;
        let state = client.snapshot().await;
        ctx.say(format::outcome_reply(
            outcome,
            &format!(
                "Switched to **{}**.",
                format::location_title(state.current_location.as_ref(), state.location_id)
            ),
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
