//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Coffee tracker commands
pub mod coffee;

/// Beverage commands (drink, pay, quick buy)
pub mod drinks;

/// General utility commands
pub mod general;

/// Stock commands
pub mod inventory;

/// Transaction history and statistics commands
pub mod ledger;

/// Location commands
pub mod location;

/// People management commands
pub mod people;

// Export commands
pub use coffee::*;
pub use drinks::*;
pub use general::*;
pub use inventory::*;
pub use ledger::*;
pub use location::*;
pub use people::*;
