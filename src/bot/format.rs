//! Text rendering for bot replies.
//!
//! Pure functions from mirrored state to Discord markdown, kept apart from the command
//! handlers so they can be tested without a gateway connection.

use crate::{
    api::{CoffeeBalance, InventoryItem, Location, Person, Statistics, Transaction},
    core::Outcome,
    errors::Result,
};
use std::fmt::Write;

/// Discord embed colour used for lists.
pub const LIST_COLOUR: u32 = 0x0058_65F2;

/// Discord embed colour used for the statistics dashboard.
pub const STATS_COLOUR: u32 = 0x0034_98DB;

/// Longest embed description Discord accepts, in characters.
pub const DESCRIPTION_LIMIT: usize = 4096;

// Room kept for the "…and N more" line
const OVERFLOW_RESERVE: usize = 32;

/// Joins `lines` one per row. When they do not fit in [`DESCRIPTION_LIMIT`], the list is cut
/// short and ends with a line counting the rows left out.
fn fit_description(lines: &[String]) -> Result<String> {
    let total: usize = lines.iter().map(|l| l.chars().count() + 1).sum();
    let budget = if total <= DESCRIPTION_LIMIT {
        DESCRIPTION_LIMIT
    } else {
        DESCRIPTION_LIMIT - OVERFLOW_RESERVE
    };

    let mut text = String::new();
    let mut used = 0;
    for (shown, line) in lines.iter().enumerate() {
        let width = line.chars().count() + 1;
        if used + width > budget {
            write!(&mut text, "…and {} more", lines.len() - shown)?;
            break;
        }
        writeln!(&mut text, "{line}")?;
        used += width;
    }
    Ok(text)
}

/// Reply for a mutation outcome; `done` describes the change in past tense.
#[must_use]
pub fn outcome_reply(outcome: Outcome, done: &str) -> String {
    match outcome {
        Outcome::Applied => format!("✅ {done}"),
        Outcome::Busy => {
            "⏳ Another change is still being saved. Try again in a moment.".to_string()
        }
        Outcome::Stale => format!(
            "✅ {done}\n⚠️ The change was saved, but the lists could not be refreshed. \
             They will catch up on the next reload."
        ),
    }
}

/// Heading naming the current location.
#[must_use]
pub fn location_title(current: Option<&Location>, location_id: i64) -> String {
    current.map_or_else(|| format!("Location {location_id}"), |l| l.name.clone())
}

/// One line per person with their tab at `price_per_beverage`.
pub fn people_list(people: &[Person], default_beverage: &str, price_per_beverage: f64) -> Result<String> {
    if people.is_empty() {
        return Ok("No one is registered here yet. Use `/people add` to add someone.".to_string());
    }

    let lines: Vec<String> = people
        .iter()
        .map(|person| {
            #[allow(clippy::cast_precision_loss)] // Beverage counts are small
            let due = person.beverages as f64 * price_per_beverage;
            format!(
                "**{}** · {} × {} · {due:.2} kr",
                person.name,
                person.beverages,
                person.beverage_type_or(default_beverage)
            )
        })
        .collect();
    fit_description(&lines)
}

/// Stock per beverage type. Negative quantities are shown as they are.
pub fn inventory_list(items: &[InventoryItem]) -> Result<String> {
    if items.is_empty() {
        return Ok("The inventory is empty.".to_string());
    }

    let lines: Vec<String> = items
        .iter()
        .map(|item| {
            let marker = if item.quantity <= 0 { " ⚠️" } else { "" };
            format!("**{}**: {}{marker}", item.beverage_type, item.quantity)
        })
        .collect();
    fit_description(&lines)
}

/// Cups and money balance per person.
pub fn coffee_list(balances: &[CoffeeBalance]) -> Result<String> {
    if balances.is_empty() {
        return Ok("No coffee has been recorded yet.".to_string());
    }

    let lines: Vec<String> = balances
        .iter()
        .map(|balance| {
            format!(
                "**{}**: {} cup{} · balance {:.2} kr",
                balance.name,
                balance.coffee_balance,
                if balance.coffee_balance == 1 { "" } else { "s" },
                balance.balance
            )
        })
        .collect();
    fit_description(&lines)
}

/// The newest `limit` ledger entries, newest first.
pub fn transaction_list(transactions: &[Transaction], limit: usize) -> Result<String> {
    if transactions.is_empty() {
        return Ok("No transactions yet.".to_string());
    }

    let mut lines = Vec::new();
    for transaction in transactions.iter().rev().take(limit) {
        let when = transaction
            .timestamp
            .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
        let who = if transaction.is_quick_buy() {
            "Quick buy"
        } else {
            transaction.name.as_deref().unwrap_or("Unknown")
        };
        let mut line = format!("`{when}` **{who}** · {}", transaction.kind);
        if let Some(beverage_type) = &transaction.beverage_type {
            write!(&mut line, " {} × {beverage_type}", transaction.beverages.abs())?;
        }
        write!(&mut line, " · {:.2} kr", transaction.amount)?;
        lines.push(line);
    }
    fit_description(&lines)
}

/// Embed fields (name, value, inline) for the statistics dashboard.
pub fn statistics_fields(statistics: &Statistics) -> Result<Vec<(String, String, bool)>> {
    const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

    let leaderboard = |entries: &[crate::api::models::LeaderboardEntry]| -> Result<String> {
        if entries.is_empty() {
            return Ok("No purchases yet.".to_string());
        }
        let mut text = String::new();
        for (rank, entry) in entries.iter().take(10).enumerate() {
            let place = MEDALS
                .get(rank)
                .map_or_else(|| format!("{}.", rank + 1), |m| (*m).to_string());
            writeln!(&mut text, "{place} {} · {:.2} kr", entry.name, entry.total_amount)?;
        }
        Ok(text)
    };

    let mut distribution = String::new();
    for share in &statistics.beverage_type_distribution {
        writeln!(
            &mut distribution,
            "{}: {:.1}%",
            share.beverage_type, share.percentage
        )?;
    }
    if distribution.is_empty() {
        distribution.push_str("No purchases yet.");
    }

    Ok(vec![
        (
            "This month".to_string(),
            leaderboard(&statistics.current_month_leaderboard)?,
            true,
        ),
        (
            "All time".to_string(),
            leaderboard(&statistics.all_time_leaderboard)?,
            true,
        ),
        ("Beverage types".to_string(), distribution, false),
    ])
}

/// Known locations, marking the current one.
pub fn location_list(locations: &[Location], current: i64) -> Result<String> {
    if locations.is_empty() {
        return Ok("The backend returned no locations.".to_string());
    }

    let lines: Vec<String> = locations
        .iter()
        .map(|location| {
            let marker = if location.id == current { " ← current" } else { "" };
            format!("`{}` **{}**{marker}", location.id, location.name)
        })
        .collect();
    fit_description(&lines)
}
