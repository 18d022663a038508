//! Ledger Discord commands - transaction history and the statistics dashboard.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, format},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    const DEFAULT_LIMIT: u8 = 15;

    /// Parent command for the transaction history.
    #[poise::command(
        slash_command,
        subcommands("transactions_show", "transactions_hide")
    )]
    pub async fn transactions(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Transaction commands. Available subcommands:\n\
            `/transactions show` - Show the latest transactions\n\
            `/transactions hide` - Hide the transaction list";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Shows the latest transactions, newest first.
    #[poise::command(slash_command, rename = "show")]
    pub async fn transactions_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "How many to show (defaults to 15)"] limit: Option<u8>,
    ) -> Result<()> {
        let client = &ctx.data().client;
        client.load_transactions().await?;
        let state = client.snapshot().await;

        let embed = serenity::CreateEmbed::default()
            .title("🧾 Transactions")
            .description(format::transaction_list(
                &state.transactions,
                usize::from(limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 50)),
            )?)
            .color(format::LIST_COLOUR)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} in total",
                state.transactions.len()
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Hides the transaction list.
    #[poise::command(slash_command, rename = "hide")]
    pub async fn transactions_hide(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.data().client.hide_transactions().await;
        ctx.send(
            poise::CreateReply::default()
                .content("Transactions hidden.")
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }

    /// Shows leaderboards and the beverage type distribution.
    #[poise::command(slash_command)]
    pub async fn stats(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let client = &ctx.data().client;
        client.load_statistics().await?;
        let state = client.snapshot().await;

        let Some(statistics) = &state.statistics else {
            ctx.say("No statistics available yet.").await?;
            return Ok(());
        };

        let embed = serenity::CreateEmbed::default()
            .title(format!(
                "📊 Statistics for {}",
                format::location_title(state.current_location.as_ref(), state.location_id)
            ))
            .color(format::STATS_COLOUR)
            .fields(format::statistics_fields(statistics)?);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
