//! Dialog and form state for user interactions.
//!
//! Each interaction is one enum or struct instead of a handful of independent visibility
//! flags, so states such as "confirming with no person selected" cannot be represented.

use crate::{
    api::Person,
    errors::{Error, Result},
};

/// Direction of a beverage adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeverageAction {
    /// Record one more beverage
    Add,
    /// Take one beverage back
    Remove,
}

impl BeverageAction {
    /// Count delta sent to the backend.
    #[must_use]
    pub const fn delta(self) -> i64 {
        match self {
            Self::Add => 1,
            Self::Remove => -1,
        }
    }
}

/// A confirmed beverage adjustment, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct BeverageRequest {
    /// Person whose count changes
    pub person: Person,
    /// Add or remove
    pub action: BeverageAction,
    /// Beverage type to record
    pub beverage_type: String,
}

/// The add/remove beverage dialog.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum BeverageDialog {
    /// Not shown
    #[default]
    Closed,
    /// Shown, waiting for the user to pick a beverage type
    ChoosingBeverageType(BeverageRequest),
    /// Confirmed; the request is in flight
    Confirming(BeverageRequest),
}

impl BeverageDialog {
    /// Opens the dialog for `person`, preselecting their current beverage type.
    #[must_use]
    pub fn open(person: &Person, action: BeverageAction, default_beverage: &str) -> Self {
        Self::ChoosingBeverageType(BeverageRequest {
            person: person.clone(),
            action,
            beverage_type: person.beverage_type_or(default_beverage).to_string(),
        })
    }

    /// Changes the selected beverage type. Ignored unless the dialog is waiting for a choice.
    pub fn select(&mut self, beverage_type: &str) {
        if let Self::ChoosingBeverageType(request) = self {
            request.beverage_type = beverage_type.to_string();
        }
    }

    /// Confirms the current selection and returns the request to send.
    ///
    /// Returns `None` when there is nothing to confirm (closed, or already confirming).
    pub fn confirm(&mut self) -> Option<BeverageRequest> {
        match std::mem::take(self) {
            Self::ChoosingBeverageType(request) => {
                *self = Self::Confirming(request.clone());
                Some(request)
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// Applies the result of the request: closes on success, reopens the choice on failure
    /// so the user can retry without re-entering anything.
    pub fn settle(&mut self, succeeded: bool) {
        *self = match std::mem::take(self) {
            Self::Confirming(_) if succeeded => Self::Closed,
            Self::Confirming(request) => Self::ChoosingBeverageType(request),
            other => other,
        };
    }

    /// Dismisses the dialog.
    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    /// Whether the dialog is visible.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self, Self::Closed)
    }
}

/// The "are you sure you want to pay" confirmation.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PaymentDialog {
    /// Not shown
    #[default]
    Closed,
    /// Waiting for the user to confirm paying `amount_due`
    Confirming {
        /// Person about to pay
        person: Person,
        /// Their tab at display prices
        amount_due: f64,
    },
}

impl PaymentDialog {
    /// Opens the confirmation for `person` at `price_per_beverage`.
    #[must_use]
    pub fn open(person: &Person, price_per_beverage: f64) -> Self {
        #[allow(clippy::cast_precision_loss)] // Beverage counts are small
        let amount_due = person.beverages as f64 * price_per_beverage;
        Self::Confirming {
            person: person.clone(),
            amount_due,
        }
    }

    /// Text asking the user to confirm, or `None` when closed.
    #[must_use]
    pub fn prompt(&self) -> Option<String> {
        match self {
            Self::Closed => None,
            Self::Confirming { person, amount_due } => Some(format!(
                "{} is about to pay {amount_due:.2} kr for {} beverage{}.",
                person.name,
                person.beverages,
                if person.beverages == 1 { "" } else { "s" }
            )),
        }
    }
}

/// Inputs of the coffee purchase form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoffeePurchaseForm {
    /// Bags bought
    pub bags: u32,
    /// Money spent
    pub cost: f64,
}

impl Default for CoffeePurchaseForm {
    fn default() -> Self {
        Self { bags: 1, cost: 0.0 }
    }
}

impl CoffeePurchaseForm {
    /// Form for `bags` bags with the cost prefilled from the per-bag price.
    #[must_use]
    pub fn for_bags(bags: u32, price_per_bag: f64) -> Self {
        Self {
            bags,
            cost: f64::from(bags) * price_per_bag,
        }
    }

    /// Rejects forms that would record an impossible purchase.
    pub fn validate(&self) -> Result<()> {
        if self.bags == 0 {
            return Err(Error::InvalidInput {
                message: "A coffee purchase needs at least one bag.".to_string(),
            });
        }
        if !self.cost.is_finite() || self.cost < 0.0 {
            return Err(Error::InvalidInput {
                message: "Coffee cost must be a non-negative number.".to_string(),
            });
        }
        Ok(())
    }
}

/// Inputs of the inventory update form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InventoryForm {
    /// Beverage type to update
    pub beverage_type: String,
    /// New quantity
    pub quantity: i64,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    #![allow(clippy::panic)]
    use super::*;

    fn person(beverage_type: Option<&str>, beverages: i64) -> Person {
        Person {
            id: Some(1),
            name: "Ola".to_string(),
            beverages,
            beverage_type: beverage_type.map(str::to_string),
            location_id: Some(1),
        }
    }

    #[test]
    fn test_open_preselects_current_beverage() {
        let dialog = BeverageDialog::open(&person(Some("Cola Zero"), 2), BeverageAction::Add, "Cola");
        let BeverageDialog::ChoosingBeverageType(request) = dialog else {
            panic!("dialog should be choosing");
        };
        assert_eq!(request.beverage_type, "Cola Zero");

        let dialog = BeverageDialog::open(&person(None, 2), BeverageAction::Add, "Cola");
        let BeverageDialog::ChoosingBeverageType(request) = dialog else {
            panic!("dialog should be choosing");
        };
        assert_eq!(request.beverage_type, "Cola");
    }

    #[test]
    fn test_confirm_then_success_closes() {
        let mut dialog = BeverageDialog::open(&person(None, 0), BeverageAction::Remove, "Cola");
        dialog.select("Fanta");

        let request = dialog.confirm().unwrap();
        assert_eq!(request.beverage_type, "Fanta");
        assert_eq!(request.action.delta(), -1);
        assert!(matches!(dialog, BeverageDialog::Confirming(_)));

        // Selection is frozen while confirming
        dialog.select("Solo");
        assert!(dialog.confirm().is_none());

        dialog.settle(true);
        assert_eq!(dialog, BeverageDialog::Closed);
    }

    #[test]
    fn test_failure_reopens_choice_with_same_selection() {
        let mut dialog = BeverageDialog::open(&person(None, 0), BeverageAction::Add, "Cola");
        dialog.select("Fanta");
        dialog.confirm().unwrap();

        dialog.settle(false);
        let BeverageDialog::ChoosingBeverageType(request) = &dialog else {
            panic!("dialog should be back to choosing");
        };
        assert_eq!(request.beverage_type, "Fanta");
        assert!(dialog.is_open());
    }

    #[test]
    fn test_closed_dialog_ignores_input() {
        let mut dialog = BeverageDialog::default();
        dialog.select("Cola");
        assert!(dialog.confirm().is_none());
        dialog.settle(true);
        assert!(!dialog.is_open());
    }

    #[test]
    fn test_payment_prompt() {
        let dialog = PaymentDialog::open(&person(None, 3), 10.0);
        assert_eq!(
            dialog.prompt().unwrap(),
            "Ola is about to pay 30.00 kr for 3 beverages."
        );
        assert!(PaymentDialog::Closed.prompt().is_none());
    }

    #[test]
    fn test_coffee_form_prefills_cost() {
        let form = CoffeePurchaseForm::for_bags(3, 89.0);
        assert_eq!(form.cost, 267.0);
        assert!(form.validate().is_ok());

        assert_eq!(CoffeePurchaseForm::default().bags, 1);
        assert_eq!(CoffeePurchaseForm::default().cost, 0.0);
    }

    #[test]
    fn test_coffee_form_validation() {
        assert!(CoffeePurchaseForm { bags: 0, cost: 10.0 }.validate().is_err());
        assert!(CoffeePurchaseForm { bags: 1, cost: -1.0 }.validate().is_err());
        assert!(CoffeePurchaseForm { bags: 1, cost: f64::NAN }.validate().is_err());
    }
}
