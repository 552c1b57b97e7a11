//! Remote collaborators.
//!
//! Each service the pipeline talks to sits behind a small trait so the
//! orchestrator can be driven by in-memory doubles in tests:
//!
//! - `Authenticator`: credentials -> `Principal` (`auth`)
//! - `WarehouseDirectory`: principal -> organization warehouses (`firestore`)
//! - `Geocoder`: address components -> coordinates (`geocode`)
//! - `OrderService`: order payload -> created order (`orders`)
//!
//! All concrete clients share one blocking `reqwest` client.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::domain::{Coordinates, OrderPayload, Principal, Warehouse};
use crate::error::{
    AppError, AuthenticationError, EXIT_INPUT, GeocodingError, SubmissionError, WarehouseLookupError,
};

pub mod auth;
pub mod firestore;
pub mod geocode;
pub mod orders;

pub use auth::FirebaseAuthenticator;
pub use firestore::FirestoreDirectory;
pub use geocode::GoogleGeocoder;
pub use orders::HttpOrderService;

pub trait Authenticator {
    fn authenticate(&self, identifier: &str, secret: &str) -> Result<Principal, AuthenticationError>;
}

pub trait WarehouseDirectory {
    /// Warehouses of the principal's organization, in the order the store returns them.
    fn list_warehouses(&self, principal: &Principal) -> Result<Vec<Warehouse>, WarehouseLookupError>;
}

pub trait Geocoder {
    fn geocode(&self, components: &[&str]) -> Result<Coordinates, GeocodingError>;
}

pub trait OrderService {
    /// Create one order. `Ok` only when the service answered 201; carries the response body.
    fn create_order(&self, token: &str, payload: &OrderPayload) -> Result<serde_json::Value, SubmissionError>;
}

pub fn http_client(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("parcels/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::new(EXIT_INPUT, format!("Failed to build HTTP client: {e}")))
}

/// Best-effort body text for error messages.
pub(crate) fn body_text(resp: reqwest::blocking::Response) -> String {
    resp.text().unwrap_or_else(|e| format!("<unreadable body: {e}>"))
}
