//! Coffee Discord commands - balances, cups consumed and bag purchases.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, format, handlers::autocomplete},
        core::interaction::CoffeePurchaseForm,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Parent command for the coffee tracker.
    #[poise::command(
        slash_command,
        subcommands("coffee_balances", "coffee_drink", "coffee_purchase")
    )]
    pub async fn coffee(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Coffee commands. Available subcommands:\n\
            `/coffee balances` - Cups and balance per person\n\
            `/coffee drink` - Record one cup\n\
            `/coffee purchase` - Record bags of coffee bought";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows cups consumed and money balance per person.
    #[poise::command(slash_command, rename = "balances")]
    pub async fn coffee_balances(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let client = &ctx.data().client;
        client.load_coffee_balances().await?;
        let state = client.snapshot().await;

        let embed = serenity::CreateEmbed::default()
            .title("☕ Coffee balances")
            .description(format::coffee_list(&state.coffee_balances)?)
            .color(format::LIST_COLOUR);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Records one cup of coffee.
    #[poise::command(slash_command, rename = "drink")]
    pub async fn coffee_drink(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who had the coffee"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        person: String,
    ) -> Result<()> {
        let client = &ctx.data().client;
        let person = client.find_person_by_name(&person).await?;
        let Some(person_id) = person.id else {
            ctx.say(format!("❌ {} has not been saved yet.", person.name))
                .await?;
            return Ok(());
        };

        let outcome = client.consume_coffee(person_id).await?;
        ctx.say(format::outcome_reply(
            outcome,
            &format!("One cup of coffee recorded for **{}**.", person.name),
        ))
        .await?;
        Ok(())
    }

    /// Records bags of coffee bought for the coffee fund.
    ///
    /// The cost defaults to the configured price per bag.
    #[poise::command(slash_command, rename = "purchase")]
    pub async fn coffee_purchase(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who bought the coffee"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        person: String,
        #[description = "Number of bags (defaults to 1)"] bags: Option<u32>,
        #[description = "Total cost (defaults to bags × price per bag)"] cost: Option<f64>,
    ) -> Result<()> {
        let data = ctx.data();
        let person = data.client.find_person_by_name(&person).await?;
        let Some(person_id) = person.id else {
            ctx.say(format!("❌ {} has not been saved yet.", person.name))
                .await?;
            return Ok(());
        };

        let mut form = CoffeePurchaseForm::for_bags(
            bags.unwrap_or(1),
            data.catalog.pricing.per_coffee_bag,
        );
        if let Some(cost) = cost {
            form.cost = cost;
        }

        let outcome = data
            .client
            .purchase_coffee(person_id, form.bags, form.cost)
            .await?;
        ctx.say(format::outcome_reply(
            outcome,
            &format!(
                "**{}** bought {} bag{} of coffee for {:.2} kr.",
                person.name,
                form.bags,
                if form.bags == 1 { "" } else { "s" },
                form.cost
            ),
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
