//! Shared test utilities for `BeverageBuddy`.
//!
//! This module provides an in-memory preference database and [`FakeBackend`], an in-process
//! stand-in for the REST backend with failure injection, request counters and gates that
//! hold mutations or a single read in flight.

use crate::{
    api::{
        ApiError, ApiResult, BeverageApi, CoffeeBalance, CoffeeTrackerRequest, InventoryItem,
        InventoryUpdate, Location, LocationId, Person, PersonUpdate, QuickBuyRequest, Statistics,
        Transaction, models::{BeverageShare, LeaderboardEntry, QUICK_BUY},
    },
    core::{preferences::PreferenceStore, sync::SyncClient},
    errors::Result,
};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DatabaseConnection;
use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};
use tokio::sync::{Notify, Semaphore};

/// Price the fake backend charges per beverage.
pub const FAKE_PRICE: f64 = 10.0;

/// Price the fake backend charges per cup of coffee.
pub const FAKE_COFFEE_PRICE: f64 = 5.0;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all database tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Sets up a sync client talking to a fresh fake backend at location 1.
/// Returns (client, backend) so tests can seed data and inject failures.
pub async fn setup_client() -> Result<(SyncClient, Arc<FakeBackend>)> {
    let backend = Arc::new(FakeBackend::new());
    let preferences = PreferenceStore::new(setup_test_db().await?);
    let api = Arc::clone(&backend) as Arc<dyn BeverageApi>;
    let client = SyncClient::connect(api, preferences, None).await?;
    Ok((client, backend))
}

#[derive(Debug, Default)]
struct FakeState {
    next_id: i64,
    locations: Vec<Location>,
    people: Vec<Person>,
    coffee: BTreeMap<(LocationId, i64), CoffeeBalance>,
    inventory: BTreeMap<(LocationId, String), i64>,
    transactions: Vec<(LocationId, Transaction)>,
    read_failure: Option<ApiError>,
    mutation_failure: Option<ApiError>,
    requested_locations: Vec<LocationId>,
}

impl FakeState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, location: LocationId, mut transaction: Transaction) {
        transaction.id = self.allocate_id();
        self.transactions.push((location, transaction));
    }
}

/// In-process backend implementing [`BeverageApi`] over plain collections.
///
/// Data is partitioned by location the way the real backend partitions it by the
/// `X-Location-Id` header.
#[derive(Debug)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
    holding: AtomicBool,
    gate: Semaphore,
    entered: Notify,
    holding_read: AtomicBool,
    read_gate: Semaphore,
    read_parked: Notify,
    mutations: AtomicUsize,
    reads: AtomicUsize,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeBackend {
    /// An empty backend with locations 1 ("Office") and 2 ("Cabin").
    #[must_use]
    pub fn new() -> Self {
        let state = FakeState {
            locations: vec![
                Location {
                    id: 1,
                    name: "Office".to_string(),
                },
                Location {
                    id: 2,
                    name: "Cabin".to_string(),
                },
            ],
            ..FakeState::default()
        };
        Self {
            state: Mutex::new(state),
            holding: AtomicBool::new(false),
            gate: Semaphore::new(0),
            entered: Notify::new(),
            holding_read: AtomicBool::new(false),
            read_gate: Semaphore::new(0),
            read_parked: Notify::new(),
            mutations: AtomicUsize::new(0),
            reads: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a person at `location` and returns their id.
    pub fn seed_person(
        &self,
        location: LocationId,
        name: &str,
        beverages: i64,
        beverage_type: &str,
    ) -> i64 {
        let mut state = self.lock();
        let id = state.allocate_id();
        state.people.push(Person {
            id: Some(id),
            name: name.to_string(),
            beverages,
            beverage_type: Some(beverage_type.to_string()),
            location_id: Some(location),
        });
        id
    }

    /// Sets the stock of `beverage_type` at `location`.
    pub fn seed_inventory(&self, location: LocationId, beverage_type: &str, quantity: i64) {
        self.lock()
            .inventory
            .insert((location, beverage_type.to_string()), quantity);
    }

    /// Makes every read fail with `error` until cleared with `None`.
    pub fn fail_reads(&self, error: Option<ApiError>) {
        self.lock().read_failure = error;
    }

    /// Makes every mutation fail with `error` until cleared with `None`.
    pub fn fail_mutations(&self, error: Option<ApiError>) {
        self.lock().mutation_failure = error;
    }

    /// Parks subsequent mutations until [`Self::release_mutations`] is called.
    pub fn hold_mutations(&self) {
        self.holding.store(true, Ordering::SeqCst);
    }

    /// Lets parked and future mutations through.
    pub fn release_mutations(&self) {
        self.holding.store(false, Ordering::SeqCst);
        self.gate.add_permits(64);
    }

    /// Resolves once a mutation request has reached the backend.
    pub async fn wait_for_mutation(&self) {
        self.entered.notified().await;
    }

    /// Parks the next read after its location has been recorded, and before any data is
    /// taken, until [`Self::release_reads`] is called. Later reads pass.
    pub fn hold_next_read(&self) {
        self.holding_read.store(true, Ordering::SeqCst);
    }

    /// Lets a parked read through.
    pub fn release_reads(&self) {
        self.read_gate.add_permits(1);
    }

    /// Resolves once the read held by [`Self::hold_next_read`] is parked.
    pub async fn wait_for_read(&self) {
        self.read_parked.notified().await;
    }

    /// Number of mutation requests received, including failed ones.
    pub fn mutation_count(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    /// Number of read requests received, including failed ones.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Location headers of every location-scoped request, in arrival order.
    pub fn requested_locations(&self) -> Vec<LocationId> {
        self.lock().requested_locations.clone()
    }

    /// Transactions recorded at `location`.
    pub fn transactions_at(&self, location: LocationId) -> Vec<Transaction> {
        self.lock()
            .transactions
            .iter()
            .filter(|(at, _)| *at == location)
            .map(|(_, t)| t.clone())
            .collect()
    }

    async fn begin_read(&self, location: Option<LocationId>) -> ApiResult<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if let Some(location) = location {
            self.lock().requested_locations.push(location);
        }

        if self.holding_read.swap(false, Ordering::SeqCst) {
            self.read_parked.notify_one();
            if let Ok(permit) = self.read_gate.acquire().await {
                permit.forget();
            }
        }

        self.lock().read_failure.clone().map_or(Ok(()), Err)
    }

    async fn begin_mutation(&self, location: LocationId) -> ApiResult<()> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        self.lock().requested_locations.push(location);
        self.entered.notify_one();

        if self.holding.load(Ordering::SeqCst) {
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
        }

        self.lock().mutation_failure.clone().map_or(Ok(()), Err)
    }
}

#[async_trait]
impl BeverageApi for FakeBackend {
    async fn people(&self, location: LocationId) -> ApiResult<Vec<Person>> {
        self.begin_read(Some(location)).await?;
        Ok(self
            .lock()
            .people
            .iter()
            .filter(|p| p.location_id == Some(location))
            .cloned()
            .collect())
    }

    async fn upsert_person(&self, location: LocationId, update: &PersonUpdate) -> ApiResult<()> {
        self.begin_mutation(location).await?;
        let mut state = self.lock();

        let existing = state
            .people
            .iter_mut()
            .find(|p| p.name == update.name && p.location_id == Some(location));
        if let Some(person) = existing {
            person.beverages = (person.beverages + update.beverages).max(0);
            person.beverage_type = Some(update.beverage_type.clone());
        } else {
            let id = state.allocate_id();
            state.people.push(Person {
                id: Some(id),
                name: update.name.clone(),
                beverages: update.beverages.max(0),
                beverage_type: Some(update.beverage_type.clone()),
                location_id: Some(location),
            });
        }

        if update.beverages != 0 {
            let kind = if update.beverages > 0 { "add" } else { "remove" };
            #[allow(clippy::cast_precision_loss)]
            let amount = update.beverages as f64 * FAKE_PRICE;
            state.record(
                location,
                Transaction {
                    id: 0,
                    name: Some(update.name.clone()),
                    kind: kind.to_string(),
                    beverages: update.beverages,
                    beverage_type: Some(update.beverage_type.clone()),
                    amount,
                    timestamp: Some(Utc::now()),
                },
            );
        }
        Ok(())
    }

    async fn delete_person(&self, location: LocationId, person_id: i64) -> ApiResult<()> {
        self.begin_mutation(location).await?;
        let mut state = self.lock();
        let before = state.people.len();
        state.people.retain(|p| p.id != Some(person_id));
        if state.people.len() == before {
            return Err(ApiError::Status {
                status: 404,
                message: Some("Person not found".to_string()),
            });
        }
        Ok(())
    }

    async fn pay_person(&self, location: LocationId, person_id: i64) -> ApiResult<()> {
        self.begin_mutation(location).await?;
        let mut state = self.lock();
        let Some(person) = state.people.iter_mut().find(|p| p.id == Some(person_id)) else {
            return Err(ApiError::Status {
                status: 404,
                message: Some("Person not found".to_string()),
            });
        };
        let paid = std::mem::take(&mut person.beverages);
        let name = person.name.clone();
        #[allow(clippy::cast_precision_loss)]
        let amount = paid as f64 * FAKE_PRICE;
        state.record(
            location,
            Transaction {
                id: 0,
                name: Some(name),
                kind: "pay".to_string(),
                beverages: -paid,
                beverage_type: None,
                amount,
                timestamp: Some(Utc::now()),
            },
        );
        Ok(())
    }

    async fn locations(&self) -> ApiResult<Vec<Location>> {
        self.begin_read(None).await?;
        Ok(self.lock().locations.clone())
    }

    async fn coffee_balances(&self, location: LocationId) -> ApiResult<Vec<CoffeeBalance>> {
        self.begin_read(Some(location)).await?;
        Ok(self
            .lock()
            .coffee
            .iter()
            .filter(|((at, _), _)| *at == location)
            .map(|(_, balance)| balance.clone())
            .collect())
    }

    async fn track_coffee(
        &self,
        location: LocationId,
        entry: &CoffeeTrackerRequest,
    ) -> ApiResult<()> {
        self.begin_mutation(location).await?;
        let mut state = self.lock();
        let name = state
            .people
            .iter()
            .find(|p| p.id == Some(entry.user_id))
            .map(|p| p.name.clone())
            .unwrap_or_default();

        let balance = state
            .coffee
            .entry((location, entry.user_id))
            .or_insert_with(|| CoffeeBalance {
                id: entry.user_id,
                name,
                coffee_balance: 0,
                balance: 0.0,
            });
        balance.coffee_balance += i64::from(entry.cups_consumed);
        balance.balance += entry.coffee_purchased - f64::from(entry.cups_consumed) * FAKE_COFFEE_PRICE;
        Ok(())
    }

    async fn inventory(&self, location: LocationId) -> ApiResult<Vec<InventoryItem>> {
        self.begin_read(Some(location)).await?;
        Ok(self
            .lock()
            .inventory
            .iter()
            .filter(|((at, _), _)| *at == location)
            .map(|((_, beverage_type), quantity)| InventoryItem {
                beverage_type: beverage_type.clone(),
                quantity: *quantity,
            })
            .collect())
    }

    async fn update_inventory(
        &self,
        location: LocationId,
        update: &InventoryUpdate,
    ) -> ApiResult<()> {
        self.begin_mutation(location).await?;
        self.lock()
            .inventory
            .insert((location, update.beverage_type.clone()), update.quantity);
        Ok(())
    }

    async fn quick_buy(&self, location: LocationId, request: &QuickBuyRequest) -> ApiResult<()> {
        self.begin_mutation(location).await?;
        let mut state = self.lock();
        *state
            .inventory
            .entry((location, request.beverage_type.clone()))
            .or_insert(0) -= 1;
        state.record(
            location,
            Transaction {
                id: 0,
                name: None,
                kind: QUICK_BUY.to_string(),
                beverages: 1,
                beverage_type: Some(request.beverage_type.clone()),
                amount: FAKE_PRICE,
                timestamp: Some(Utc::now()),
            },
        );
        Ok(())
    }

    async fn transactions(&self, location: LocationId) -> ApiResult<Vec<Transaction>> {
        self.begin_read(Some(location)).await?;
        Ok(self.transactions_at(location))
    }

    async fn statistics(&self, location: LocationId) -> ApiResult<Statistics> {
        self.begin_read(Some(location)).await?;
        let transactions = self.transactions_at(location);

        let mut spend: BTreeMap<String, f64> = BTreeMap::new();
        let mut types: BTreeMap<String, i64> = BTreeMap::new();
        for transaction in transactions.iter().filter(|t| t.beverages > 0) {
            if let Some(name) = &transaction.name {
                *spend.entry(name.clone()).or_default() += transaction.amount;
            }
            if let Some(beverage_type) = &transaction.beverage_type {
                *types.entry(beverage_type.clone()).or_default() += transaction.beverages;
            }
        }

        let leaderboard: Vec<LeaderboardEntry> = spend
            .into_iter()
            .map(|(name, total_amount)| LeaderboardEntry { name, total_amount })
            .collect();
        let total: i64 = types.values().sum();
        #[allow(clippy::cast_precision_loss)]
        let distribution = types
            .into_iter()
            .map(|(beverage_type, count)| BeverageShare {
                beverage_type,
                percentage: count as f64 * 100.0 / total as f64,
            })
            .collect();

        Ok(Statistics {
            current_month_leaderboard: leaderboard.clone(),
            all_time_leaderboard: leaderboard,
            beverage_type_distribution: distribution,
        })
    }
}
