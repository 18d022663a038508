use beverage_buddy::{
    api::HttpApi,
    bot::{self, BotData},
    config::{beverages, client::ClientConfig, database},
    core::{SyncClient, preferences::PreferenceStore},
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::{env, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Backend settings and beverage catalog
    let client_config = ClientConfig::from_env()
        .inspect_err(|e| error!("Invalid backend configuration: {}", e))?;
    let catalog = beverages::load_default_config()
        .inspect_err(|e| error!("Failed to load config.toml: {}", e))?;
    info!(
        "Using backend {} with {} catalog beverages",
        client_config.api_url,
        catalog.beverages.len()
    );

    // 4. Local preference database
    let db = database::create_connection(&database::get_database_url())
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;
    database::create_tables(&db).await?;
    let preferences = PreferenceStore::new(db);

    // 5. Sync client and the first load
    let api = HttpApi::new(&client_config.api_url, &client_config.api_key)?;
    let client = SyncClient::connect(Arc::new(api), preferences, client_config.location_override)
        .await?
        .with_default_beverage(catalog.default_beverage.clone());
    if let Err(e) = client.load_initial().await {
        warn!("Initial load failed, continuing with empty lists: {}", e);
    }

    // 6. Run the bot
    // DISCORD_BOT_TOKEN is loaded here, directly before use
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {}", e))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(client, catalog)).await
}
