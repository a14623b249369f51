//! Batch Operation Coordinator.
//!
//! Sends exactly one remote mutation carrying every selected identifier and
//! reconciles the per-item response. It never prunes the selection itself;
//! the caller decides what to do with failed items.

use std::sync::Arc;

use boxwise_client::BoxApi;
use boxwise_core::batch::{ineligible_boxes, reconcile, BatchOperation, BatchOutcome, BatchRequest};
use boxwise_core::boxes::BoxRef;
use boxwise_core::selection::SelectedBoxes;

use crate::error::{BatchError, BatchFailure};

pub struct BatchCoordinator {
    api: Arc<dyn BoxApi>,
}

impl BatchCoordinator {
    pub fn new(api: Arc<dyn BoxApi>) -> Self {
        Self { api }
    }

    /// Snapshot `selection` and submit it.
    pub async fn submit_selection(
        &self,
        selection: &SelectedBoxes,
        op: BatchOperation,
    ) -> Result<BatchOutcome, BatchError> {
        self.submit(selection.contents().to_vec(), op).await
    }

    /// Submit `op` for every box in `snapshot`.
    ///
    /// The snapshot is owned for the whole call, so later changes to the
    /// selection do not affect it. Refuses to submit (no network call) when
    /// the payload is invalid, nothing is selected, or any box is
    /// ineligible. A whole-call failure leaves every item un-updated and may
    /// be resubmitted unchanged.
    pub async fn submit(
        &self,
        snapshot: Vec<BoxRef>,
        op: BatchOperation,
    ) -> Result<BatchOutcome, BatchError> {
        op.validate()?;

        if snapshot.is_empty() {
            return Err(BatchError::EmptySelection);
        }

        let ineligible = ineligible_boxes(&op, &snapshot);
        if !ineligible.is_empty() {
            tracing::info!(
                operation = op.name(),
                ineligible = ineligible.len(),
                "Batch submission blocked by ineligible boxes",
            );
            return Err(BatchError::Ineligible {
                label_identifiers: ineligible,
            });
        }

        let request = BatchRequest {
            label_identifiers: snapshot.iter().map(|b| b.label_identifier.clone()).collect(),
            operation: op,
        };

        tracing::info!(
            operation = request.operation.name(),
            count = request.label_identifiers.len(),
            "Submitting batch operation",
        );

        let ids = &request.label_identifiers;
        let response = match &request.operation {
            BatchOperation::MoveToLocation { location_id } => {
                self.api.move_boxes(ids, *location_id).await
            }
            BatchOperation::AssignTags { tag_ids } => self.api.assign_tags(ids, tag_ids).await,
            BatchOperation::AssignToShipment { shipment_id } => {
                self.api.assign_to_shipment(*shipment_id, ids).await
            }
        };

        let response = response.map_err(|err| match BatchFailure::from_api_error(&err) {
            Some(failure) => {
                tracing::warn!(
                    operation = request.operation.name(),
                    error = %err,
                    "Batch operation failed",
                );
                BatchError::Failed(failure)
            }
            None => {
                tracing::error!(
                    operation = request.operation.name(),
                    error = %err,
                    "Malformed batch operation response",
                );
                BatchError::Unexpected(err.to_string())
            }
        })?;

        let outcome = reconcile(&request.operation, &snapshot, response);

        tracing::info!(
            operation = request.operation.name(),
            updated = outcome.updated.len(),
            already_satisfied = outcome.already_satisfied.len(),
            failed = outcome.failed.len(),
            "Batch operation completed",
        );

        Ok(outcome)
    }
}
