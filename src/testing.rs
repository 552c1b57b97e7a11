//! In-memory doubles for the remote collaborators, shared by unit tests.

use std::cell::{Cell, RefCell};
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::json;

use crate::config::{OrgSelection, ServiceConfig};
use crate::domain::{
    Coordinates, OrderPayload, ParcelSpec, PickupKey, PostalAddress, Principal, RawRecord, ReceiverData,
    Warehouse,
};
use crate::error::{AuthenticationError, GeocodingError, SubmissionError, WarehouseLookupError};
use crate::remote::{Authenticator, Geocoder, OrderService, WarehouseDirectory};

pub struct FakeAuthenticator {
    pub result: Result<Principal, AuthenticationError>,
    pub calls: Cell<usize>,
}

impl FakeAuthenticator {
    pub fn ok() -> Self {
        Self {
            result: Ok(Principal {
                uid: "u1".to_string(),
                token: "tok".to_string(),
            }),
            calls: Cell::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(AuthenticationError::Rejected("INVALID_PASSWORD".to_string())),
            calls: Cell::new(0),
        }
    }
}

impl Authenticator for FakeAuthenticator {
    fn authenticate(&self, _identifier: &str, _secret: &str) -> Result<Principal, AuthenticationError> {
        self.calls.set(self.calls.get() + 1);
        self.result.clone()
    }
}

pub struct FakeDirectory {
    pub result: Result<Vec<Warehouse>, WarehouseLookupError>,
    pub calls: Cell<usize>,
    pub seen_uid: RefCell<Option<String>>,
}

impl FakeDirectory {
    pub fn with(warehouses: Vec<Warehouse>) -> Self {
        Self {
            result: Ok(warehouses),
            calls: Cell::new(0),
            seen_uid: RefCell::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(WarehouseLookupError::NoOrganization("u1".to_string())),
            calls: Cell::new(0),
            seen_uid: RefCell::new(None),
        }
    }
}

impl WarehouseDirectory for FakeDirectory {
    fn list_warehouses(&self, principal: &Principal) -> Result<Vec<Warehouse>, WarehouseLookupError> {
        self.calls.set(self.calls.get() + 1);
        *self.seen_uid.borrow_mut() = Some(principal.uid.clone());
        self.result.clone()
    }
}

/// Answers every query the same way and remembers the queries.
pub struct FakeGeocoder {
    pub result: Result<Coordinates, GeocodingError>,
    pub queries: RefCell<Vec<String>>,
}

impl FakeGeocoder {
    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self {
            result: Ok(Coordinates { latitude, longitude }),
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: Err(GeocodingError::NoResults("nowhere".to_string())),
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.queries.borrow().len()
    }
}

impl Geocoder for FakeGeocoder {
    fn geocode(&self, components: &[&str]) -> Result<Coordinates, GeocodingError> {
        self.queries.borrow_mut().push(components.join("+"));
        self.result.clone()
    }
}

/// Replies with scripted statuses by call position; unscripted calls get 201.
pub struct FakeOrders {
    pub statuses: Vec<u16>,
    pub calls: RefCell<Vec<(String, OrderPayload)>>,
}

impl FakeOrders {
    pub fn accepting() -> Self {
        Self::scripted(Vec::new())
    }

    pub fn scripted(statuses: Vec<u16>) -> Self {
        Self {
            statuses,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl OrderService for FakeOrders {
    fn create_order(&self, token: &str, payload: &OrderPayload) -> Result<serde_json::Value, SubmissionError> {
        let n = self.call_count();
        self.calls.borrow_mut().push((token.to_string(), payload.clone()));
        match self.statuses.get(n).copied().unwrap_or(201) {
            201 => Ok(json!({ "id": format!("order-{n}") })),
            status => Err(SubmissionError::Status {
                status,
                body: r#"{"error":"rejected"}"#.to_string(),
            }),
        }
    }
}

pub fn springfield_warehouse() -> Warehouse {
    Warehouse {
        id: "wh1".to_string(),
        address: PostalAddress {
            apartment: "2".to_string(),
            building: "B".to_string(),
            street: "Main".to_string(),
            postcode: "00000".to_string(),
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            country: "US".to_string(),
            ..Default::default()
        },
    }
}

/// A record whose pickup fields match `springfield_warehouse()`.
pub fn springfield_record(index: usize) -> RawRecord {
    RawRecord {
        index,
        pickup: PickupKey {
            apartment: "2".to_string(),
            building: "B".to_string(),
            street: "Main".to_string(),
            postcode: "00000".to_string(),
            city: "Springfield".to_string(),
        },
        delivery: PostalAddress {
            apartment: "5".to_string(),
            building: "C".to_string(),
            street: "Elm".to_string(),
            city: "Shelbyville".to_string(),
            state: "IL".to_string(),
            country: "US".to_string(),
            postcode: "11111".to_string(),
            hint: Some("leave at door".to_string()),
            ..Default::default()
        },
        note: Some("leave at door".to_string()),
        reference_number1: Some("REF-1".to_string()),
        reference_number2: None,
        receiver: ReceiverData {
            full_name: "Ann Lee".to_string(),
            email: "ann@example.com".to_string(),
            phone: "555-0100".to_string(),
        },
        parcel: ParcelSpec {
            dimension_x: 10,
            dimension_y: 20,
            dimension_z: 30,
            requires_attention: true,
            weight: 4,
        },
    }
}

/// Config whose keys are fixed test values; `order_create_url` points wherever the test needs.
pub fn service_config(order_create_url: &str) -> ServiceConfig {
    ServiceConfig {
        firebase_api_key: "key".to_string(),
        firebase_project_id: "proj".to_string(),
        geocode_api_key: "gkey".to_string(),
        order_create_url: order_create_url.to_string(),
        org_selection: OrgSelection::Reject,
        http_timeout: Duration::from_secs(5),
    }
}

pub fn http_client() -> Client {
    crate::remote::http_client(Duration::from_secs(5)).expect("test HTTP client")
}

/// The payload `springfield_record(0)` transforms into.
pub fn springfield_payload() -> OrderPayload {
    crate::transform::transform(&springfield_record(0), &[springfield_warehouse()], &FakeGeocoder::at(1.0, 2.0))
        .expect("springfield record resolves")
}
