//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions come from the sync client's mirror and the beverage catalog, so typing in a
//! parameter never triggers more than one backend read.

use crate::{bot::BotData, errors::Error};

/// Discord autocomplete limit
const MAX_SUGGESTIONS: usize = 25;

fn matching<I>(candidates: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let partial_lower = partial.to_lowercase();
    let mut matching: Vec<String> = candidates
        .into_iter()
        .filter(|name| name.to_lowercase().contains(&partial_lower))
        .collect();
    matching.sort();
    matching.dedup();
    matching.truncate(MAX_SUGGESTIONS);
    matching
}

/// Suggests names of people at the current location.
///
/// Loads people first when the mirror is still empty.
pub async fn autocomplete_person_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let client = &ctx.data().client;

    let mut people = client.people().await;
    if people.is_empty() && client.load_people().await.is_ok() {
        people = client.people().await;
    }

    matching(people.into_iter().map(|p| p.name), partial)
}

/// Suggests beverage types from the catalog and the current inventory.
pub async fn autocomplete_beverage(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let data = ctx.data();
    let inventory = data.client.snapshot().await.inventory;

    let catalog = data.catalog.beverage_names().map(str::to_string);
    let stocked = inventory.into_iter().map(|item| item.beverage_type);
    matching(catalog.chain(stocked), partial)
}

/// Suggests location names.
///
/// Loads locations first when none are known yet.
pub async fn autocomplete_location(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let client = &ctx.data().client;

    let mut locations = client.snapshot().await.locations;
    if locations.is_empty() && client.load_locations().await.is_ok() {
        locations = client.snapshot().await.locations;
    }

    matching(locations.into_iter().map(|l| l.name), partial)
}
