//! Record -> order transformation.
//!
//! For each record:
//!
//! 1. find the pickup warehouse (first exact match in snapshot order)
//! 2. geocode the delivery address (exactly one geocoder call)
//! 3. assemble the `OrderPayload`
//!
//! A record with no matching warehouse never reaches the geocoder.

use tracing::{debug, warn};

use crate::domain::{
    OrderPayload, ParcelLocation, PendingOrder, PickupKey, PickupType, PostalAddress, RawRecord, Warehouse,
};
use crate::error::{GeocodingError, TransformError};
use crate::remote::Geocoder;

/// Outcome of transforming a batch: the orders to submit and the dropped records.
#[derive(Debug, Clone, Default)]
pub struct TransformBatch {
    pub orders: Vec<PendingOrder>,
    pub failures: Vec<(usize, TransformError)>,
}

/// Transform one record into an order payload.
pub fn transform(
    record: &RawRecord,
    warehouses: &[Warehouse],
    geocoder: &dyn Geocoder,
) -> Result<OrderPayload, TransformError> {
    let warehouse = match_warehouse(&record.pickup, warehouses)?;
    let shipping_address = locate_delivery(&record.delivery, geocoder)?;
    Ok(assemble(record, warehouse, shipping_address))
}

/// Transform records one at a time, in order, dropping the ones that fail.
pub fn transform_all<'r>(
    records: impl IntoIterator<Item = &'r RawRecord>,
    warehouses: &[Warehouse],
    geocoder: &dyn Geocoder,
) -> TransformBatch {
    let mut batch = TransformBatch::default();

    for record in records {
        match transform(record, warehouses, geocoder) {
            Ok(payload) => batch.orders.push(PendingOrder {
                index: record.index,
                payload,
            }),
            Err(e) => {
                warn!(index = record.index, error = %e, "dropping record");
                batch.failures.push((record.index, e));
            }
        }
    }

    debug!(
        transformed = batch.orders.len(),
        dropped = batch.failures.len(),
        "transform finished"
    );
    batch
}

/// First warehouse whose address matches the pickup fields exactly.
pub fn match_warehouse<'w>(
    pickup: &PickupKey,
    warehouses: &'w [Warehouse],
) -> Result<&'w Warehouse, TransformError> {
    warehouses
        .iter()
        .find(|w| pickup.matches(&w.address))
        .ok_or_else(|| TransformError::UnresolvedWarehouse(pickup.to_string()))
}

fn locate_delivery(delivery: &PostalAddress, geocoder: &dyn Geocoder) -> Result<PostalAddress, GeocodingError> {
    let coords = geocoder.geocode(&delivery.geocode_components())?;
    Ok(PostalAddress {
        latitude: Some(coords.latitude),
        longitude: Some(coords.longitude),
        ..delivery.clone()
    })
}

fn assemble(record: &RawRecord, warehouse: &Warehouse, shipping_address: PostalAddress) -> OrderPayload {
    OrderPayload {
        pickup_type: PickupType::Asap,
        reference_number1: record.reference_number1.clone().unwrap_or_default(),
        reference_number2: record.reference_number2.clone().unwrap_or_default(),
        receiver_data: record.receiver.clone(),
        parcel_location: ParcelLocation {
            pickup_warehouse_id: warehouse.id.clone(),
            pickup_address: warehouse.address.clone(),
            shipping_address,
        },
        note: record.note.clone(),
        parcels: vec![record.parcel],
    }
}
