//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for BeverageBuddy: slash commands,
//! autocomplete handlers, reply formatting and the framework runner. Every command goes
//! through the shared [`SyncClient`]; nothing here talks to the backend directly.

/// Discord command implementations (people, drinks, coffee, inventory, ledger, location)
pub mod commands;
/// Reply text rendering
pub mod format;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::beverages::Config,
    core::SyncClient,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
/// Holds the sync client and the beverage catalog used for autocompletion and prices.
#[derive(Debug)]
pub struct BotData {
    /// Client owning the mirrored backend state
    pub client: SyncClient,
    /// Beverage catalog and display prices
    pub catalog: Config,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(client: SyncClient, catalog: Config) -> Self {
        Self { client, catalog }
    }
}

pub use commands::*;
pub use handlers::*;

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("❌ {}", error.user_message())).await {
                error!("Failed to send error message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Registers the slash commands and runs the bot until the gateway connection ends.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::people(),
                commands::drink(),
                commands::pay(),
                commands::quickbuy(),
                commands::coffee(),
                commands::inventory(),
                commands::transactions(),
                commands::stats(),
                commands::location(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
