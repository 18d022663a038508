//! Client preference storage.
//!
//! Preferences live in the `system_state` key-value table and survive restarts. The only
//! preference the sync client relies on is the selected location; resolution order for the
//! session's location is: explicit override, stored preference, [`DEFAULT_LOCATION_ID`].

use crate::{
    api::LocationId,
    entities::{SystemState, system_state},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use tracing::{debug, info, instrument, warn};

/// Key under which the selected location id is stored.
pub const LOCATION_ID_KEY: &str = "location_id";

/// Location used when nothing else selects one.
pub const DEFAULT_LOCATION_ID: LocationId = 1;

/// Persistent key-value preferences backed by the local database.
#[derive(Debug)]
pub struct PreferenceStore {
    db: DatabaseConnection,
}

impl PreferenceStore {
    /// Wraps an open connection whose tables have been created.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Retrieves the value stored under `key`.
    ///
    /// # Returns
    /// * `Ok(Some(value))` - The key exists
    /// * `Ok(None)` - Nothing stored under this key
    #[instrument(skip(self))]
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let state = SystemState::find()
            .filter(system_state::Column::Key.eq(key))
            .one(&self.db)
            .await?;
        debug!("Preference '{}' = {:?}", key, state.as_ref().map(|s| &s.value));
        Ok(state.map(|s| s.value))
    }

    /// Stores `value` under `key`, replacing any previous value.
    #[instrument(skip(self))]
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Utc::now().naive_utc();

        let existing = SystemState::find()
            .filter(system_state::Column::Key.eq(key))
            .one(&self.db)
            .await?;

        if let Some(state) = existing {
            let mut active_model: system_state::ActiveModel = state.into();
            active_model.value = Set(value.to_string());
            active_model.updated_at = Set(now);
            active_model.update(&self.db).await?;
        } else {
            let new_state = system_state::ActiveModel {
                key: Set(key.to_string()),
                value: Set(value.to_string()),
                updated_at: Set(now),
                ..Default::default()
            };
            new_state.insert(&self.db).await?;
        }

        info!("Stored preference {} = {}", key, value);
        Ok(())
    }

    /// The stored location id, if one was saved and is still a valid integer.
    pub async fn location_id(&self) -> Result<Option<LocationId>> {
        let Some(raw) = self.get(LOCATION_ID_KEY).await? else {
            return Ok(None);
        };

        match raw.parse::<LocationId>() {
            Ok(id) => Ok(Some(id)),
            Err(e) => {
                warn!("Ignoring unreadable stored location id '{}': {}", raw, e);
                Ok(None)
            }
        }
    }

    /// Remembers `id` as the selected location.
    pub async fn save_location_id(&self, id: LocationId) -> Result<()> {
        self.set(LOCATION_ID_KEY, &id.to_string()).await
    }

    /// Resolves the location for a new session.
    ///
    /// An override (the equivalent of a `?location_id=` link) wins and is persisted so later
    /// sessions keep it; otherwise the stored preference is used, falling back to
    /// [`DEFAULT_LOCATION_ID`].
    pub async fn resolve_location(&self, location_override: Option<LocationId>) -> Result<LocationId> {
        if let Some(id) = location_override {
            self.save_location_id(id).await?;
            return Ok(id);
        }

        Ok(self.location_id().await?.unwrap_or(DEFAULT_LOCATION_ID))
    }
}
