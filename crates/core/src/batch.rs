//! Batch box operations: kinds, eligibility guards, and per-item
//! reconciliation of the server's response.
//!
//! Every submitted identifier ends up in exactly one of
//! [`ItemOutcome::Updated`], [`ItemOutcome::AlreadySatisfied`] or
//! [`ItemOutcome::Failed`], whichever operation was run.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::boxes::{BoxRef, UpdatedBox};
use crate::error::CoreError;
use crate::types::{DbId, LabelIdentifier};

// ---------------------------------------------------------------------------
// Operation kinds
// ---------------------------------------------------------------------------

/// A state-changing operation applied to every selected box at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BatchOperation {
    MoveToLocation { location_id: DbId },
    AssignTags { tag_ids: Vec<DbId> },
    AssignToShipment { shipment_id: DbId },
}

impl BatchOperation {
    /// Short operation name used in notifications and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MoveToLocation { .. } => "move",
            Self::AssignTags { .. } => "assign tags to",
            Self::AssignToShipment { .. } => "assign to shipment",
        }
    }

    /// Whether `b` may take part in this operation at all.
    ///
    /// Ineligible boxes block submission until they are removed.
    pub fn is_eligible(&self, b: &BoxRef) -> bool {
        match self {
            Self::MoveToLocation { .. } => b.state.is_movable(),
            Self::AssignTags { .. } => true,
            Self::AssignToShipment { .. } => b.state.is_assignable_to_shipment(),
        }
    }

    /// Whether the snapshot says `b` is already in the target state, so a
    /// server-side refusal for it is informational rather than a failure.
    pub fn is_already_satisfied(&self, b: &BoxRef) -> bool {
        match self {
            Self::MoveToLocation { location_id } => b.is_at_location(*location_id),
            Self::AssignTags { tag_ids } => b.has_all_tags(tag_ids),
            // Shipment membership is not part of the snapshot.
            Self::AssignToShipment { .. } => false,
        }
    }

    /// Validate the operation payload before anything is sent.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::AssignTags { tag_ids } if tag_ids.is_empty() => Err(CoreError::Validation(
                "At least one tag must be selected".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Label identifiers of boxes in `boxes` not eligible for `op`, in list order.
pub fn ineligible_boxes(op: &BatchOperation, boxes: &[BoxRef]) -> Vec<LabelIdentifier> {
    boxes
        .iter()
        .filter(|b| !op.is_eligible(b))
        .map(|b| b.label_identifier.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// Identifiers snapshotted from the selection plus the operation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub label_identifiers: Vec<LabelIdentifier>,
    pub operation: BatchOperation,
}

/// What the server reported for one mutation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationResponse {
    pub updated_boxes: Vec<UpdatedBox>,
    pub invalid_identifiers: Vec<LabelIdentifier>,
}

/// Per-item outcome after reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemOutcome {
    Updated,
    AlreadySatisfied,
    Failed,
}

/// Reconciled outcome of a batch operation that reached the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub updated: Vec<UpdatedBox>,
    pub already_satisfied: Vec<LabelIdentifier>,
    pub failed: Vec<LabelIdentifier>,
}

impl BatchOutcome {
    /// Identifiers the server actually changed.
    pub fn updated_identifiers(&self) -> Vec<LabelIdentifier> {
        self.updated
            .iter()
            .map(|b| b.label_identifier.clone())
            .collect()
    }

    pub fn submitted_count(&self) -> usize {
        self.updated.len() + self.already_satisfied.len() + self.failed.len()
    }

    pub fn is_full_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn outcome_of(&self, label_identifier: &str) -> Option<ItemOutcome> {
        if self
            .updated
            .iter()
            .any(|b| b.label_identifier == label_identifier)
        {
            Some(ItemOutcome::Updated)
        } else if self.already_satisfied.iter().any(|id| id == label_identifier) {
            Some(ItemOutcome::AlreadySatisfied)
        } else if self.failed.iter().any(|id| id == label_identifier) {
            Some(ItemOutcome::Failed)
        } else {
            None
        }
    }
}

/// Sort every submitted identifier into exactly one outcome.
///
/// The response is authoritative for what changed. The snapshot is only
/// consulted to explain why an item was not changed: if it already met the
/// target it is `AlreadySatisfied`, otherwise `Failed`. Identifiers the
/// response omits are `Failed`; identifiers it reports that were never
/// submitted are ignored. Output order follows `snapshot`.
///
/// `invalid_identifiers` does not change the outcome of an item. The server
/// lists boxes that were already at the target location there too, so a
/// listed identifier whose snapshot meets the target is `AlreadySatisfied`
/// and every other listed identifier is `Failed`, exactly like an omitted
/// one. The cost is that a box the server refused for another reason while
/// it happened to meet the target is reported as already satisfied.
pub fn reconcile(
    op: &BatchOperation,
    snapshot: &[BoxRef],
    response: MutationResponse,
) -> BatchOutcome {
    let mut by_id: HashMap<LabelIdentifier, UpdatedBox> = response
        .updated_boxes
        .into_iter()
        .map(|b| (b.label_identifier.clone(), b))
        .collect();

    let mut outcome = BatchOutcome::default();
    let mut seen = HashSet::new();

    for b in snapshot {
        if !seen.insert(b.label_identifier.as_str()) {
            continue;
        }
        if let Some(updated) = by_id.remove(&b.label_identifier) {
            outcome.updated.push(updated);
        } else if op.is_already_satisfied(b) {
            outcome.already_satisfied.push(b.label_identifier.clone());
        } else {
            outcome.failed.push(b.label_identifier.clone());
        }
    }

    outcome
}
