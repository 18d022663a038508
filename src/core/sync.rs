//! Client-side state synchronization with the beverage backend.
//!
//! [`SyncClient`] owns the local mirror of everything fetched from the backend. Loads replace
//! one mirrored collection wholesale. Mutations are pessimistic: the request is sent first and,
//! once the backend accepts it, every affected collection is re-fetched instead of trusting
//! the response body (read-after-write). A single [`MutationLatch`] serializes mutations;
//! attempting one while another is in flight returns [`Outcome::Busy`] without sending anything.
//!
//! Failures are classified, recorded as [`SyncState::last_error`], logged and returned. A failed
//! request never modifies the mirror.

use crate::{
    api::{
        ApiError, ApiResult, BeverageApi, CoffeeBalance, CoffeeTrackerRequest, InventoryItem,
        InventoryUpdate, Location, LocationId, Person, PersonUpdate, QuickBuyRequest, Statistics,
        Transaction,
    },
    core::{
        interaction::{
            BeverageAction, BeverageDialog, BeverageRequest, CoffeePurchaseForm, InventoryForm,
        },
        latch::{LatchGuard, MutationLatch, MutationPhase},
        preferences::PreferenceStore,
    },
    errors::{Error, ErrorCategory, Result, classify},
};
use std::{future::Future, sync::Arc};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument, warn};

/// Beverage type used when nothing else selects one.
pub const DEFAULT_BEVERAGE: &str = "Cola";

/// Result of a mutating operation that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The backend accepted the change and the mirror has been reconciled
    Applied,
    /// Another mutation was in flight; nothing was sent
    Busy,
    /// The backend accepted the change but re-fetching afterwards failed, or was discarded
    /// because the location changed, so the mirror may lag behind until the next load
    Stale,
}

/// A mirrored collection that can be re-fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// `GET /people`
    People,
    /// `GET /locations`
    Locations,
    /// `GET /coffee-balance`
    CoffeeBalances,
    /// `GET /inventory`
    Inventory,
    /// `GET /transactions`
    Transactions,
    /// `GET /statistics`
    Statistics,
}

/// Local mirror of server-side state plus the client's own form state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncState {
    /// Location every scoped request is sent for
    pub location_id: LocationId,
    /// The location matching `location_id`, once locations have been loaded
    pub current_location: Option<Location>,
    /// People at the current location
    pub people: Vec<Person>,
    /// All locations
    pub locations: Vec<Location>,
    /// Coffee balances at the current location
    pub coffee_balances: Vec<CoffeeBalance>,
    /// Stock at the current location
    pub inventory: Vec<InventoryItem>,
    /// Ledger entries at the current location
    pub transactions: Vec<Transaction>,
    /// Whether the ledger is shown
    pub transactions_visible: bool,
    /// Dashboard aggregates, once loaded
    pub statistics: Option<Statistics>,
    /// Add/remove beverage dialog
    pub beverage_dialog: BeverageDialog,
    /// Name typed into the new-person field
    pub person_draft: String,
    /// Coffee purchase inputs
    pub coffee_purchase: CoffeePurchaseForm,
    /// Inventory update inputs
    pub inventory_form: InventoryForm,
    /// The most recent failure, until dismissed
    pub last_error: Option<ErrorCategory>,
}

/// The synchronization client. See the module docs.
pub struct SyncClient {
    api: Arc<dyn BeverageApi>,
    preferences: PreferenceStore,
    state: RwLock<SyncState>,
    latch: MutationLatch,
    default_beverage: String,
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("phase", &self.latch.phase())
            .field("default_beverage", &self.default_beverage)
            .finish_non_exhaustive()
    }
}

impl SyncClient {
    /// Creates a client for `location_id` with empty mirrors.
    #[must_use]
    pub fn new(
        api: Arc<dyn BeverageApi>,
        preferences: PreferenceStore,
        location_id: LocationId,
    ) -> Self {
        Self {
            api,
            preferences,
            state: RwLock::new(SyncState {
                location_id,
                ..SyncState::default()
            }),
            latch: MutationLatch::default(),
            default_beverage: DEFAULT_BEVERAGE.to_string(),
        }
    }

    /// Creates a client whose location is resolved from `location_override`, then the stored
    /// preference, then the default location.
    pub async fn connect(
        api: Arc<dyn BeverageApi>,
        preferences: PreferenceStore,
        location_override: Option<LocationId>,
    ) -> Result<Self> {
        let location_id = preferences.resolve_location(location_override).await?;
        info!("Sync client starting at location {}", location_id);
        Ok(Self::new(api, preferences, location_id))
    }

    /// Sets the beverage type given to new people and preselected for people without one.
    #[must_use]
    pub fn with_default_beverage(mut self, beverage_type: impl Into<String>) -> Self {
        self.default_beverage = beverage_type.into();
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// A copy of the whole mirror.
    pub async fn snapshot(&self) -> SyncState {
        self.state.read().await.clone()
    }

    /// People at the current location.
    pub async fn people(&self) -> Vec<Person> {
        self.state.read().await.people.clone()
    }

    /// The current location id.
    pub async fn location_id(&self) -> LocationId {
        self.state.read().await.location_id
    }

    /// Phase of the in-flight mutation, if any.
    pub fn phase(&self) -> MutationPhase {
        self.latch.phase()
    }

    /// Whether a mutation is in flight.
    pub fn is_busy(&self) -> bool {
        self.latch.is_held()
    }

    /// The configured default beverage type.
    pub fn default_beverage(&self) -> &str {
        &self.default_beverage
    }

    /// Clears the recorded error.
    pub async fn dismiss_error(&self) {
        self.state.write().await.last_error = None;
    }

    /// Finds a person at the current location by name, ignoring case.
    ///
    /// Re-fetches people once when the mirror has no match, so someone added from another
    /// client is still found.
    pub async fn find_person_by_name(&self, name: &str) -> Result<Person> {
        if let Some(person) = self.lookup_person(name).await {
            return Ok(person);
        }

        self.load_people().await?;
        self.lookup_person(name)
            .await
            .ok_or_else(|| Error::PersonNotFound {
                name: name.to_string(),
            })
    }

    async fn lookup_person(&self, name: &str) -> Option<Person> {
        let name = name.trim().to_lowercase();
        self.state
            .read()
            .await
            .people
            .iter()
            .find(|p| p.name.to_lowercase() == name)
            .cloned()
    }

    // -----------------------------------------------------------------------
    // Loads
    // -----------------------------------------------------------------------

    /// Replaces the people mirror with `GET /people`.
    #[instrument(skip(self))]
    pub async fn load_people(&self) -> Result<()> {
        self.fetch(Collection::People).await.map(drop)
    }

    /// Replaces the locations mirror and resolves the current location from it.
    #[instrument(skip(self))]
    pub async fn load_locations(&self) -> Result<()> {
        match self.api.locations().await {
            Ok(locations) => {
                let mut state = self.state.write().await;
                let location_id = state.location_id;
                state.current_location = locations.iter().find(|l| l.id == location_id).cloned();
                if state.current_location.is_none() {
                    warn!("Location {} is not among the {} known locations", location_id, locations.len());
                }
                debug!("Loaded {} locations", locations.len());
                state.locations = locations;
                Ok(())
            }
            Err(e) => Err(self.surface("load locations", e).await),
        }
    }

    /// Replaces the coffee balances mirror with `GET /coffee-balance`.
    #[instrument(skip(self))]
    pub async fn load_coffee_balances(&self) -> Result<()> {
        self.fetch(Collection::CoffeeBalances).await.map(drop)
    }

    /// Replaces the inventory mirror with `GET /inventory`.
    #[instrument(skip(self))]
    pub async fn load_inventory(&self) -> Result<()> {
        self.fetch(Collection::Inventory).await.map(drop)
    }

    /// Replaces the ledger mirror with `GET /transactions` and shows it.
    #[instrument(skip(self))]
    pub async fn load_transactions(&self) -> Result<()> {
        self.fetch(Collection::Transactions).await?;
        self.state.write().await.transactions_visible = true;
        Ok(())
    }

    /// Hides the ledger. The mirrored entries are kept.
    pub async fn hide_transactions(&self) {
        self.state.write().await.transactions_visible = false;
    }

    /// Replaces the statistics mirror with `GET /statistics`.
    #[instrument(skip(self))]
    pub async fn load_statistics(&self) -> Result<()> {
        self.fetch(Collection::Statistics).await.map(drop)
    }

    /// Loads people and locations concurrently, as on first start.
    ///
    /// Both loads run to completion; the first failure is returned.
    pub async fn load_initial(&self) -> Result<()> {
        let (people, locations) = tokio::join!(self.load_people(), self.load_locations());
        people.and(locations)
    }

    /// Re-fetches one collection.
    ///
    /// A response that arrives after the location changed is discarded, which still counts
    /// as success here.
    pub async fn reload(&self, collection: Collection) -> Result<()> {
        self.fetch(collection).await.map(drop)
    }

    /// Re-fetches one collection and reports whether the response was applied to the mirror.
    async fn fetch(&self, collection: Collection) -> Result<bool> {
        match collection {
            Collection::People => {
                self.load_scoped(
                    "load people",
                    |location| self.api.people(location),
                    |state, people| state.people = people,
                )
                .await
            }
            Collection::Locations => self.load_locations().await.map(|()| true),
            Collection::CoffeeBalances => {
                self.load_scoped(
                    "load coffee balances",
                    |location| self.api.coffee_balances(location),
                    |state, balances| state.coffee_balances = balances,
                )
                .await
            }
            Collection::Inventory => {
                self.load_scoped(
                    "load inventory",
                    |location| self.api.inventory(location),
                    |state, inventory| state.inventory = inventory,
                )
                .await
            }
            Collection::Transactions => {
                self.load_scoped(
                    "load transactions",
                    |location| self.api.transactions(location),
                    |state, transactions| state.transactions = transactions,
                )
                .await
            }
            Collection::Statistics => {
                self.load_scoped(
                    "load statistics",
                    |location| self.api.statistics(location),
                    |state, statistics| state.statistics = Some(statistics),
                )
                .await
            }
        }
    }

    /// Fetches a location-scoped collection and applies it, unless the location changed while
    /// the request was in flight. Returns `false` when the response was discarded.
    async fn load_scoped<'a, T, F, Fut>(
        &'a self,
        action: &str,
        request: F,
        apply: impl FnOnce(&mut SyncState, T),
    ) -> Result<bool>
    where
        F: FnOnce(LocationId) -> Fut,
        Fut: Future<Output = ApiResult<T>> + 'a,
    {
        let location = self.location_id().await;
        match request(location).await {
            Ok(value) => {
                let mut state = self.state.write().await;
                if state.location_id != location {
                    debug!(
                        "Discarding {} response for location {}; now at {}",
                        action, location, state.location_id
                    );
                    return Ok(false);
                }
                apply(&mut *state, value);
                debug!("{} for location {} done", action, location);
                Ok(true)
            }
            Err(e) => Err(self.surface(action, e).await),
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Registers a new person with no beverages and the default beverage type.
    ///
    /// The name stays in the draft if the request fails, and is cleared once it succeeds.
    #[instrument(skip(self))]
    pub async fn add_person(&self, name: &str) -> Result<Outcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput {
                message: "Please enter a name.".to_string(),
            });
        }

        let Some(guard) = self.begin("add person") else {
            return Ok(Outcome::Busy);
        };
        self.state.write().await.person_draft = name.to_string();

        let update = PersonUpdate {
            name: name.to_string(),
            beverages: 0,
            beverage_type: self.default_beverage.clone(),
        };
        let location = self.location_id().await;
        let result = self.api.upsert_person(location, &update).await;
        if result.is_ok() {
            self.state.write().await.person_draft.clear();
        }

        self.finish(&guard, "add person", result, &[Collection::People])
            .await
    }

    /// Adds or removes one beverage of `beverage_type` for `person`.
    ///
    /// The beverage dialog is closed on success and returned to the beverage choice on
    /// failure, keeping the selection for a retry.
    #[instrument(skip(self, person), fields(person = %person.name))]
    pub async fn adjust_beverage(
        &self,
        person: &Person,
        action: BeverageAction,
        beverage_type: &str,
    ) -> Result<Outcome> {
        let beverage_type = beverage_type.trim();
        if beverage_type.is_empty() {
            return Err(Error::InvalidInput {
                message: "Please choose a beverage type.".to_string(),
            });
        }

        let Some(guard) = self.begin("adjust beverage") else {
            return Ok(Outcome::Busy);
        };

        let request = BeverageRequest {
            person: person.clone(),
            action,
            beverage_type: beverage_type.to_string(),
        };
        self.state.write().await.beverage_dialog = BeverageDialog::Confirming(request.clone());

        let update = PersonUpdate {
            name: request.person.name.clone(),
            beverages: request.action.delta(),
            beverage_type: request.beverage_type.clone(),
        };
        let location = self.location_id().await;
        let result = self.api.upsert_person(location, &update).await;
        self.state
            .write()
            .await
            .beverage_dialog
            .settle(result.is_ok());

        self.finish(&guard, "adjust beverage", result, &[Collection::People])
            .await
    }

    /// Records an anonymous purchase of one `beverage_type`.
    #[instrument(skip(self))]
    pub async fn quick_buy(&self, beverage_type: &str) -> Result<Outcome> {
        let beverage_type = beverage_type.trim();
        if beverage_type.is_empty() {
            return Err(Error::InvalidInput {
                message: "Please choose a beverage type.".to_string(),
            });
        }

        let Some(guard) = self.begin("quick buy") else {
            return Ok(Outcome::Busy);
        };

        let request = QuickBuyRequest {
            beverage_type: beverage_type.to_string(),
        };
        let location = self.location_id().await;
        let result = self.api.quick_buy(location, &request).await;

        self.finish(
            &guard,
            "quick buy",
            result,
            &[
                Collection::People,
                Collection::Inventory,
                Collection::Transactions,
            ],
        )
        .await
    }

    /// Settles `person`'s tab.
    ///
    /// Once the backend accepts the payment the local count is zeroed right away; the reload
    /// that follows replaces it with the server's value.
    #[instrument(skip(self, person), fields(person = %person.name))]
    pub async fn pay_person(&self, person: &Person) -> Result<Outcome> {
        let person_id = synced_id(person)?;

        let Some(guard) = self.begin("pay") else {
            return Ok(Outcome::Busy);
        };

        let location = self.location_id().await;
        let result = self.api.pay_person(location, person_id).await;
        if result.is_ok() {
            let mut state = self.state.write().await;
            if let Some(paid) = state.people.iter_mut().find(|p| p.id == Some(person_id)) {
                paid.beverages = 0;
            }
        }

        self.finish(&guard, "pay", result, &[Collection::People])
            .await
    }

    /// Removes a person.
    #[instrument(skip(self))]
    pub async fn delete_person(&self, person_id: i64) -> Result<Outcome> {
        let Some(guard) = self.begin("delete person") else {
            return Ok(Outcome::Busy);
        };

        let location = self.location_id().await;
        let result = self.api.delete_person(location, person_id).await;

        self.finish(&guard, "delete person", result, &[Collection::People])
            .await
    }

    /// Records one cup of coffee for the person with `person_id`.
    #[instrument(skip(self))]
    pub async fn consume_coffee(&self, person_id: i64) -> Result<Outcome> {
        let Some(guard) = self.begin("consume coffee") else {
            return Ok(Outcome::Busy);
        };

        let entry = CoffeeTrackerRequest {
            user_id: person_id,
            cups_consumed: 1,
            coffee_purchased: 0.0,
            coffee_bags: None,
        };
        let location = self.location_id().await;
        let result = self.api.track_coffee(location, &entry).await;

        self.finish(
            &guard,
            "consume coffee",
            result,
            &[Collection::CoffeeBalances],
        )
        .await
    }

    /// Records that the person with `person_id` bought `bags` bags of coffee for `cost`.
    ///
    /// The purchase form is reset to one bag at no cost once the backend accepts it.
    #[instrument(skip(self))]
    pub async fn purchase_coffee(&self, person_id: i64, bags: u32, cost: f64) -> Result<Outcome> {
        let form = CoffeePurchaseForm { bags, cost };
        form.validate()?;

        let Some(guard) = self.begin("purchase coffee") else {
            return Ok(Outcome::Busy);
        };
        self.state.write().await.coffee_purchase = form;

        let entry = CoffeeTrackerRequest {
            user_id: person_id,
            cups_consumed: 0,
            coffee_purchased: cost,
            coffee_bags: Some(bags),
        };
        let location = self.location_id().await;
        let result = self.api.track_coffee(location, &entry).await;
        if result.is_ok() {
            self.state.write().await.coffee_purchase = CoffeePurchaseForm::default();
        }

        self.finish(
            &guard,
            "purchase coffee",
            result,
            &[Collection::CoffeeBalances],
        )
        .await
    }

    /// Sets the stock of `beverage_type` to `quantity`.
    #[instrument(skip(self))]
    pub async fn update_inventory_item(&self, beverage_type: &str, quantity: i64) -> Result<Outcome> {
        let beverage_type = beverage_type.trim();
        if beverage_type.is_empty() {
            return Err(Error::InvalidInput {
                message: "Please choose a beverage type.".to_string(),
            });
        }

        let Some(guard) = self.begin("update inventory") else {
            return Ok(Outcome::Busy);
        };
        self.state.write().await.inventory_form = InventoryForm {
            beverage_type: beverage_type.to_string(),
            quantity,
        };

        let update = InventoryUpdate {
            beverage_type: beverage_type.to_string(),
            quantity,
        };
        let location = self.location_id().await;
        let result = self.api.update_inventory(location, &update).await;
        if result.is_ok() {
            self.state.write().await.inventory_form = InventoryForm::default();
        }

        self.finish(&guard, "update inventory", result, &[Collection::Inventory])
            .await
    }

    /// Switches to another location.
    ///
    /// The selection is persisted, every location-scoped mirror is cleared, and people,
    /// inventory and coffee balances are reloaded for the new location. This is a local
    /// operation and does not take the mutation latch.
    #[instrument(skip(self))]
    pub async fn change_location(&self, location_id: LocationId) -> Result<Outcome> {
        {
            let state = self.state.read().await;
            if !state.locations.is_empty() && !state.locations.iter().any(|l| l.id == location_id)
            {
                return Err(Error::LocationNotFound { id: location_id });
            }
        }

        self.preferences.save_location_id(location_id).await?;

        {
            let mut state = self.state.write().await;
            state.current_location = state
                .locations
                .iter()
                .find(|l| l.id == location_id)
                .cloned();
            state.location_id = location_id;
            state.people.clear();
            state.coffee_balances.clear();
            state.inventory.clear();
            state.transactions.clear();
            state.statistics = None;
            state.beverage_dialog.close();
        }
        info!("Switched to location {}", location_id);

        Ok(self
            .reconcile(&[
                Collection::People,
                Collection::Inventory,
                Collection::CoffeeBalances,
            ])
            .await)
    }

    // -----------------------------------------------------------------------
    // Shared plumbing
    // -----------------------------------------------------------------------

    fn begin(&self, action: &str) -> Option<LatchGuard<'_>> {
        let guard = self.latch.try_acquire();
        if guard.is_none() {
            info!("Ignoring {}: another change is still in flight", action);
        }
        guard
    }

    async fn finish(
        &self,
        guard: &LatchGuard<'_>,
        action: &str,
        result: ApiResult<()>,
        affected: &[Collection],
    ) -> Result<Outcome> {
        if let Err(e) = result {
            return Err(self.surface(action, e).await);
        }

        guard.reconciling();
        info!("{} accepted; reconciling {:?}", action, affected);
        Ok(self.reconcile(affected).await)
    }

    async fn reconcile(&self, affected: &[Collection]) -> Outcome {
        let mut outcome = Outcome::Applied;
        for collection in affected {
            match self.fetch(*collection).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!("Reload of {:?} was discarded after a location change", collection);
                    outcome = Outcome::Stale;
                }
                Err(e) => {
                    warn!("Reload of {:?} failed; mirror may be stale: {}", collection, e);
                    outcome = Outcome::Stale;
                }
            }
        }
        outcome
    }

    async fn surface(&self, action: &str, e: ApiError) -> Error {
        let category = classify(&e);
        error!("Failed to {}: {} ({})", action, category.user_message(), e);
        self.state.write().await.last_error = Some(category);
        Error::Api(e)
    }
}

fn synced_id(person: &Person) -> Result<i64> {
    person.id.ok_or_else(|| Error::InvalidInput {
        message: format!("{} has not been saved yet; reload and try again.", person.name),
    })
}
