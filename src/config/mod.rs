/// Beverage catalog and display prices from config.toml
pub mod beverages;

/// Backend connection settings from environment variables
pub mod client;

/// Preference database connection and table creation
pub mod database;
