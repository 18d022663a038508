//! Backend API layer - the transport seam between the sync client and the REST backend.
//!
//! [`BeverageApi`] has one method per endpoint. [`HttpApi`] implements it over HTTP; tests
//! substitute an in-process fake. Every method except [`BeverageApi::locations`] is scoped
//! to a location and carries it as the `X-Location-Id` header.

/// Transport failure shapes
pub mod error;
/// `reqwest` implementation of the API
pub mod http;
/// JSON request and response types
pub mod models;

pub use error::{ApiError, ApiResult};
pub use http::HttpApi;
pub use models::{
    CoffeeBalance, CoffeeTrackerRequest, InventoryItem, InventoryUpdate, Location, LocationId,
    Person, PersonUpdate, QuickBuyRequest, Statistics, Transaction,
};

use async_trait::async_trait;

/// The REST endpoints of the beverage backend.
///
/// Mutating methods return `()`: whatever body the backend sends back is ignored, and callers
/// re-fetch the affected collections instead.
#[async_trait]
pub trait BeverageApi: Send + Sync {
    /// `GET /people`
    async fn people(&self, location: LocationId) -> ApiResult<Vec<Person>>;

    /// `POST /people`
    async fn upsert_person(&self, location: LocationId, update: &PersonUpdate) -> ApiResult<()>;

    /// `DELETE /people/{id}`
    async fn delete_person(&self, location: LocationId, person_id: i64) -> ApiResult<()>;

    /// `POST /people/{id}/pay`
    async fn pay_person(&self, location: LocationId, person_id: i64) -> ApiResult<()>;

    /// `GET /locations`
    async fn locations(&self) -> ApiResult<Vec<Location>>;

    /// `GET /coffee-balance`
    async fn coffee_balances(&self, location: LocationId) -> ApiResult<Vec<CoffeeBalance>>;

    /// `POST /coffee-tracker`
    async fn track_coffee(
        &self,
        location: LocationId,
        entry: &CoffeeTrackerRequest,
    ) -> ApiResult<()>;

    /// `GET /inventory`
    async fn inventory(&self, location: LocationId) -> ApiResult<Vec<InventoryItem>>;

    /// `POST /inventory/update`
    async fn update_inventory(&self, location: LocationId, update: &InventoryUpdate)
    -> ApiResult<()>;

    /// `POST /quickbuy`
    async fn quick_buy(&self, location: LocationId, request: &QuickBuyRequest) -> ApiResult<()>;

    /// `GET /transactions`
    async fn transactions(&self, location: LocationId) -> ApiResult<Vec<Transaction>>;

    /// `GET /statistics`
    async fn statistics(&self, location: LocationId) -> ApiResult<Statistics>;
}
