//! Entity module - Contains the SeaORM entity definitions for the local database.
//! The client only persists preferences; everything else is mirrored from the
//! backend and lives in memory.

pub mod system_state;

pub use system_state::{
    Column as SystemStateColumn, Entity as SystemState, Model as SystemStateModel,
};
