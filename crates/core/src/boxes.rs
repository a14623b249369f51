//! Box snapshot taken at resolution time.
//!
//! A [`BoxRef`] is immutable once resolved and may be stale relative to the
//! server by the time a batch operation runs. Batch responses, not these
//! snapshots, are authoritative for post-operation state.

use serde::{Deserialize, Serialize};

use crate::box_state::BoxState;
use crate::types::{DbId, LabelIdentifier, Timestamp};

/// The warehouse base (organization site) that owns a box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseRef {
    pub id: DbId,
    pub name: String,
}

/// A storage location inside a base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    pub id: DbId,
    pub name: String,
}

/// A tag attached to a box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRef {
    pub id: DbId,
    pub name: String,
}

/// Resolved box as seen by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxRef {
    pub label_identifier: LabelIdentifier,
    pub state: BoxState,
    pub location: Option<LocationRef>,
    pub base: BaseRef,
    #[serde(default)]
    pub tags: Vec<TagRef>,
    pub last_modified_on: Option<Timestamp>,
}

impl BoxRef {
    /// Whether the snapshot places this box at `location_id`.
    pub fn is_at_location(&self, location_id: DbId) -> bool {
        self.location.as_ref().is_some_and(|loc| loc.id == location_id)
    }

    /// Whether the snapshot already carries every tag in `tag_ids`.
    pub fn has_all_tags(&self, tag_ids: &[DbId]) -> bool {
        tag_ids
            .iter()
            .all(|wanted| self.tags.iter().any(|tag| tag.id == *wanted))
    }
}

/// Post-mutation record returned by the server for one box.
///
/// Carries enough to reconcile UI state without a follow-up fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdatedBox {
    pub label_identifier: LabelIdentifier,
    pub state: BoxState,
    pub location: Option<LocationRef>,
    pub last_modified_on: Option<Timestamp>,
}
