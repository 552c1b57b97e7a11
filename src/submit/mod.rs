//! Sequential order submission.
//!
//! Orders go out one at a time, in input order. A failed order is logged with its
//! record index and the loop moves on: no retry, no abort.

use tracing::{error, info};

use crate::domain::PendingOrder;
use crate::error::SubmissionError;
use crate::remote::OrderService;

#[derive(Debug, Clone, Default)]
pub struct SubmitOutcome {
    /// Record indices of the orders the service created.
    pub created: Vec<usize>,
    pub failures: Vec<(usize, SubmissionError)>,
}

pub fn submit_all(service: &dyn OrderService, token: &str, orders: &[PendingOrder]) -> SubmitOutcome {
    let mut outcome = SubmitOutcome::default();

    for order in orders {
        match service.create_order(token, &order.payload) {
            Ok(body) => {
                info!(index = order.index, response = %body, "order created");
                outcome.created.push(order.index);
            }
            Err(e) => {
                error!(index = order.index, error = %e, "order submission failed");
                outcome.failures.push((order.index, e));
            }
        }
    }

    info!(
        created = outcome.created.len(),
        failed = outcome.failures.len(),
        "submission finished"
    );
    outcome
}
