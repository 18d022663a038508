//! Wire types for the beverage backend.
//!
//! Each struct mirrors one JSON shape returned or accepted by the REST API. Decoding is strict:
//! a body that does not fit these shapes is reported as a malformed response rather than
//! being patched up silently. The one leniency is numeric money fields, which the backend
//! sometimes serializes as strings (`"12.50"`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a location (venue) partitioning people and inventory.
pub type LocationId = i64;

/// Transaction tag used by the backend for anonymous purchases.
pub const QUICK_BUY: &str = "quickbuy";

/// A tracked person and their running beverage tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Server-assigned identifier, absent until the person has been synced
    #[serde(default)]
    pub id: Option<i64>,
    /// Display name
    pub name: String,
    /// Beverages consumed since the last payment
    #[serde(default)]
    pub beverages: i64,
    /// The beverage type this person drinks most recently
    #[serde(default)]
    pub beverage_type: Option<String>,
    /// Location this person belongs to
    #[serde(default)]
    pub location_id: Option<LocationId>,
}

impl Person {
    /// Returns the person's beverage type, or `fallback` when the backend has none recorded.
    #[must_use]
    pub fn beverage_type_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.beverage_type.as_deref().unwrap_or(fallback)
    }
}

/// A venue the client can switch between.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Location identifier, sent as the `X-Location-Id` header
    pub id: LocationId,
    /// Display name
    pub name: String,
}

/// Coffee consumption and money balance for one person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoffeeBalance {
    /// Person identifier
    pub id: i64,
    /// Person display name
    #[serde(default)]
    pub name: String,
    /// Cups consumed
    #[serde(alias = "cups_consumed", default)]
    pub coffee_balance: i64,
    /// Money balance, negative when the person owes the coffee fund
    #[serde(default, deserialize_with = "decimal")]
    pub balance: f64,
}

/// Stock on hand for one beverage type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Beverage type, unique per location
    pub beverage_type: String,
    /// Quantity on hand; negative when oversold
    pub quantity: i64,
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Ledger identifier
    pub id: i64,
    /// Person name, absent for quick-buys
    #[serde(default)]
    pub name: Option<String>,
    /// Type tag: `add`, `remove`, `quickbuy`, `pay`, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Beverage count delta
    #[serde(default)]
    pub beverages: i64,
    /// Beverage type involved, if any
    #[serde(default)]
    pub beverage_type: Option<String>,
    /// Money amount
    #[serde(deserialize_with = "decimal")]
    pub amount: f64,
    /// When the backend recorded the entry
    #[serde(default, alias = "created_at")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Transaction {
    /// Whether this entry is an anonymous quick-buy.
    #[must_use]
    pub fn is_quick_buy(&self) -> bool {
        self.kind == QUICK_BUY
    }
}

/// Aggregates served by the statistics endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Spend per person for the current month
    pub current_month_leaderboard: Vec<LeaderboardEntry>,
    /// Spend per person since records began
    pub all_time_leaderboard: Vec<LeaderboardEntry>,
    /// Share of purchases per beverage type
    pub beverage_type_distribution: Vec<BeverageShare>,
}

/// One row of a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Person name
    pub name: String,
    /// Total amount spent
    #[serde(deserialize_with = "decimal")]
    pub total_amount: f64,
}

/// Share of one beverage type in the distribution chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeverageShare {
    /// Beverage type
    pub beverage_type: String,
    /// Percentage of all purchases
    #[serde(deserialize_with = "decimal")]
    pub percentage: f64,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body of `POST /people`: creates a person (delta 0) or moves their count by the delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonUpdate {
    /// Person name; the backend matches existing people by name
    pub name: String,
    /// Beverage delta: `0` to create, `1` to add, `-1` to remove
    pub beverages: i64,
    /// Beverage type to record
    pub beverage_type: String,
}

/// Body of `POST /quickbuy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickBuyRequest {
    /// Beverage type bought
    pub beverage_type: String,
}

/// Body of `POST /coffee-tracker`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeTrackerRequest {
    /// Person the entry belongs to
    pub user_id: i64,
    /// Cups consumed in this entry
    pub cups_consumed: u32,
    /// Money spent buying coffee
    pub coffee_purchased: f64,
    /// Bags bought, only sent for purchases
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coffee_bags: Option<u32>,
}

/// Body of `POST /inventory/update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryUpdate {
    /// Beverage type to update
    pub beverage_type: String,
    /// New quantity
    pub quantity: i64,
}

/// Accepts a JSON number or a numeric string (Postgres `NUMERIC` columns arrive as strings).
fn decimal<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Decimal {
        Number(f64),
        Text(String),
    }

    match Decimal::deserialize(deserializer)? {
        Decimal::Number(value) => Ok(value),
        Decimal::Text(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid decimal '{text}': {e}"))),
    }
}
