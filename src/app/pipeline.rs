//! The import pipeline.
//!
//! authenticate -> load warehouses -> read records -> transform -> submit
//!
//! Every step finishes before the next starts. Authentication and warehouse
//! loading are fatal; everything after that drops individual records and keeps
//! going.

use tracing::{debug, info, warn};

use crate::domain::RawRecord;
use crate::error::AppError;
use crate::io::ingest::RowError;
use crate::remote::{Authenticator, Geocoder, OrderService, WarehouseDirectory};
use crate::report::{BatchReport, FailureStage};

/// The remote collaborators a run talks to.
pub struct Services<'a> {
    pub authenticator: &'a dyn Authenticator,
    pub directory: &'a dyn WarehouseDirectory,
    pub geocoder: &'a dyn Geocoder,
    pub orders: &'a dyn OrderService,
}

pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

/// Where a run is. States only ever advance, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipelineState {
    Unauthenticated,
    Authenticated,
    WarehousesLoaded,
    RecordsRead,
    Transformed,
    Submitted,
}

/// Run the whole import over an already-opened record source.
pub fn run_import<I>(services: &Services<'_>, credentials: &Credentials, records: I) -> Result<BatchReport, AppError>
where
    I: IntoIterator<Item = Result<RawRecord, RowError>>,
{
    let mut report = BatchReport::default();
    let mut state = PipelineState::Unauthenticated;

    let principal = services
        .authenticator
        .authenticate(&credentials.identifier, &credentials.secret)?;
    advance(&mut state, PipelineState::Authenticated);

    let warehouses = services.directory.list_warehouses(&principal)?;
    report.warehouses = warehouses.len();
    if warehouses.is_empty() {
        warn!("organization has no warehouses; every record will be unresolved");
    }
    advance(&mut state, PipelineState::WarehousesLoaded);

    let mut valid = Vec::new();
    for row in records {
        report.records_read += 1;
        match row {
            Ok(record) => valid.push(record),
            Err(RowError { index, error }) => {
                warn!(index, error = %error, "dropping record");
                report.record_failure(index, FailureStage::Read, error);
            }
        }
    }
    advance(&mut state, PipelineState::RecordsRead);

    let batch = crate::transform::transform_all(&valid, &warehouses, services.geocoder);
    report.transformed = batch.orders.len();
    for (index, error) in batch.failures {
        report.record_failure(index, FailureStage::Transform, error);
    }
    advance(&mut state, PipelineState::Transformed);

    let outcome = crate::submit::submit_all(services.orders, &principal.token, &batch.orders);
    report.submitted = outcome.created.len();
    for (index, error) in outcome.failures {
        report.record_failure(index, FailureStage::Submit, error);
    }
    advance(&mut state, PipelineState::Submitted);

    info!(
        read = report.records_read,
        submitted = report.submitted,
        failed = report.failures.len(),
        "import finished"
    );
    Ok(report)
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    debug_assert!(next > *state);
    debug!(from = ?state, to = ?next, "pipeline state");
    *state = next;
}
