//! System state entity - Stores client preferences as key-value pairs.
//! Holds the settings a browser would keep in local storage, such as the
//! currently selected location.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// System state database model - one preference per key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_state")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Preference key (e.g., `"location_id"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Preference value stored as string
    pub value: String,
    /// When this preference was last written
    pub updated_at: DateTime,
}

/// `SystemState` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
