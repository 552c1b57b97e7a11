//! Shared domain types.
//!
//! Field names on the serialized types follow the ordering service's JSON shape
//! (camelCase, except the parcel dimensions which the service spells `dimension_x`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A postal address as stored on warehouses and sent on orders.
///
/// `latitude`/`longitude` stay `None` until geocoding succeeds. Any extra fields a
/// warehouse document carries are kept in `extra` and sent back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostalAddress {
    #[serde(deserialize_with = "lenient_string")]
    pub apartment: String,
    #[serde(deserialize_with = "lenient_string")]
    pub building: String,
    #[serde(deserialize_with = "lenient_string")]
    pub street: String,
    #[serde(deserialize_with = "lenient_string")]
    pub city: String,
    #[serde(deserialize_with = "lenient_string")]
    pub state: String,
    #[serde(deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(deserialize_with = "lenient_string")]
    pub postcode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl PostalAddress {
    /// Components sent to the geocoder, in order.
    ///
    /// Postcode and state are not part of the query; the geocoder resolves on
    /// apartment, building, street, city and country only.
    pub fn geocode_components(&self) -> [&str; 5] {
        [
            self.apartment.as_str(),
            self.building.as_str(),
            self.street.as_str(),
            self.city.as_str(),
            self.country.as_str(),
        ]
    }
}

/// Address fields are sometimes stored as numbers (apartment `2`, postcode `12345`)
/// or null; they compare against CSV text, so read them back as their text form.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected text for an address field, got {other}"
        ))),
    }
}

/// A pickup location belonging to the principal's organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    pub address: PostalAddress,
}

/// The authenticated identity for one run. Never persisted.
#[derive(Clone, PartialEq)]
pub struct Principal {
    pub uid: String,
    pub token: String,
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("uid", &self.uid)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// The `*(PickUp)` columns of a record; used only to find the warehouse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PickupKey {
    pub apartment: String,
    pub building: String,
    pub street: String,
    pub postcode: String,
    pub city: String,
}

impl PickupKey {
    /// Exact, unnormalized equality on the five matching fields.
    pub fn matches(&self, address: &PostalAddress) -> bool {
        self.apartment == address.apartment
            && self.building == address.building
            && self.street == address.street
            && self.postcode == address.postcode
            && self.city == address.city
    }
}

impl std::fmt::Display for PickupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}, {}, {} {}",
            self.apartment, self.building, self.street, self.postcode, self.city
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverData {
    pub full_name: String,
    pub email: String,
    pub phone: String,
}

/// One parcel's physical description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParcelSpec {
    pub dimension_x: u32,
    pub dimension_y: u32,
    pub dimension_z: u32,
    #[serde(rename = "requiresAttention")]
    pub requires_attention: bool,
    pub weight: u32,
}

/// One validated input row.
///
/// `index` is the row's 0-based position among the data rows of the input file
/// and is what every per-record log line refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub index: usize,
    pub pickup: PickupKey,
    /// Delivery address as read; never carries coordinates.
    pub delivery: PostalAddress,
    pub note: Option<String>,
    pub reference_number1: Option<String>,
    pub reference_number2: Option<String>,
    pub receiver: ReceiverData,
    pub parcel: ParcelSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PickupType {
    #[default]
    Asap,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelLocation {
    pub pickup_warehouse_id: String,
    pub pickup_address: PostalAddress,
    pub shipping_address: PostalAddress,
}

/// A fully resolved order, ready for the ordering service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub pickup_type: PickupType,
    pub reference_number1: String,
    pub reference_number2: String,
    pub receiver_data: ReceiverData,
    pub parcel_location: ParcelLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub parcels: Vec<ParcelSpec>,
}

/// A transformed order still tied to the input row it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingOrder {
    pub index: usize,
    pub payload: OrderPayload,
}

/// A resolved geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
}
