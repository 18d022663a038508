//! Beverage Discord commands - `drink`, `pay` and `quickbuy`.
//!
//! These commands change beverage counts and stock through the sync client. Replies report
//! the reconciled state, never the request that was sent.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, format, handlers::autocomplete},
        core::{
            Outcome,
            interaction::{BeverageAction, PaymentDialog},
        },
        errors::{Error, Result},
    };

    /// Whether `/drink` adds or removes a beverage.
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum DrinkAction {
        #[name = "add"]
        Add,
        #[name = "remove"]
        Remove,
    }

    impl From<DrinkAction> for BeverageAction {
        fn from(action: DrinkAction) -> Self {
            match action {
                DrinkAction::Add => Self::Add,
                DrinkAction::Remove => Self::Remove,
            }
        }
    }

    /// Adds or removes one beverage for a person.
    ///
    /// The beverage type defaults to the one the person drank last.
    #[poise::command(slash_command)]
    pub async fn drink(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who is drinking"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        person: String,
        #[description = "Add or remove one beverage"] action: DrinkAction,
        #[description = "Beverage type (defaults to their usual)"]
        #[autocomplete = "autocomplete::autocomplete_beverage"]
        beverage: Option<String>,
    ) -> Result<()> {
        let client = &ctx.data().client;
        let person = client.find_person_by_name(&person).await?;
        let beverage = beverage
            .unwrap_or_else(|| person.beverage_type_or(client.default_beverage()).to_string());

        let outcome = client
            .adjust_beverage(&person, action.into(), &beverage)
            .await?;

        let verb = match action {
            DrinkAction::Add => "Added",
            DrinkAction::Remove => "Removed",
        };
        let mut done = format!("{verb} one {beverage} for **{}**.", person.name);
        if outcome == Outcome::Applied {
            let updated = client.find_person_by_name(&person.name).await?;
            done.push_str(&format!(" Tab: {} beverages.", updated.beverages));
        }

        ctx.say(format::outcome_reply(outcome, &done)).await?;
        Ok(())
    }

    /// Settles a person's tab.
    ///
    /// Without `confirm` this only shows the amount due.
    #[poise::command(slash_command)]
    pub async fn pay(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who is paying"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        person: String,
        #[description = "Set to true to record the payment"] confirm: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let person = data.client.find_person_by_name(&person).await?;
        let dialog = PaymentDialog::open(&person, data.catalog.pricing.per_beverage);

        if !confirm.unwrap_or(false) {
            let prompt = dialog.prompt().unwrap_or_default();
            ctx.say(format!(
                "💳 {prompt}\nRun `/pay person:{} confirm:True` to record the payment.",
                person.name
            ))
            .await?;
            return Ok(());
        }

        let outcome = data.client.pay_person(&person).await?;
        ctx.say(format::outcome_reply(
            outcome,
            &format!("**{}** has paid.", person.name),
        ))
        .await?;
        Ok(())
    }

    /// Records an anonymous purchase of one beverage.
    #[poise::command(slash_command)]
    pub async fn quickbuy(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Beverage type bought"]
        #[autocomplete = "autocomplete::autocomplete_beverage"]
        beverage: String,
    ) -> Result<()> {
        let client = &ctx.data().client;
        let outcome = client.quick_buy(&beverage).await?;

        let mut done = format!("Quick buy of one {} recorded.", beverage.trim());
        if outcome == Outcome::Applied {
            let stock = client
                .snapshot()
                .await
                .inventory
                .into_iter()
                .find(|item| item.beverage_type == beverage.trim())
                .map(|item| item.quantity);
            if let Some(stock) = stock {
                done.push_str(&format!(" {stock} left in stock."));
            }
        }

        ctx.say(format::outcome_reply(outcome, &done)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
