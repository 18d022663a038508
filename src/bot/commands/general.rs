//! General Discord commands - ping and help.
//! These commands don't touch the backend and provide basic bot functionality
//! and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let phase = ctx.data().client.phase();
        ctx.say(format!("Pong! (sync: {phase:?})")).await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**BeverageBuddy Help**\n\
        Track beverages and coffee for everyone at your location.\n\n\
        **Beverages**\n\
        • `/drink <person> <add|remove> [beverage]` - Adds or removes one beverage.\n\
        • `/pay <person> [confirm]` - Settles a person's tab.\n\
        • `/quickbuy <beverage>` - Records an anonymous purchase.\n\n\
        **People**\n\
        • `/people list|add|delete` - Shows, registers or removes people.\n\n\
        **Coffee**\n\
        • `/coffee balances|drink|purchase` - Coffee balances, cups and bag purchases.\n\n\
        **Stock and history**\n\
        • `/inventory list|update` - Shows or sets stock per beverage type.\n\
        • `/transactions show|hide` - Shows or hides the latest transactions.\n\
        • `/stats` - Leaderboards and beverage distribution.\n\n\
        **Settings**\n\
        • `/location list|set` - Shows locations or switches to another one.\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
