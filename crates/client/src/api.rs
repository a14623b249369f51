//! The abstract remote operations consumed by the scan services.

use async_trait::async_trait;
use boxwise_core::batch::MutationResponse;
use boxwise_core::boxes::BoxRef;
use boxwise_core::types::DbId;

use crate::error::ApiError;

/// Successful answer to a code lookup.
///
/// "Code unknown" and "no permission at all" are reported as
/// [`ApiError::NotFound`] and [`ApiError::InsufficientPermission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeLookup {
    /// The code is linked to a box the caller may view.
    Box(BoxRef),
    /// The code exists but no box is linked to it yet.
    NotAssigned,
    /// The code is linked to a box in a base the caller cannot access.
    BoxNotAuthorized,
    /// The code is linked to a box that no longer exists.
    BoxNotFound,
}

/// Successful answer to a label lookup.
///
/// An unknown label is reported as [`ApiError::NotFound`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelLookup {
    Box(BoxRef),
    /// A box carried this label but has been deleted.
    Deleted,
}

/// Remote box API.
///
/// Implementations must always fetch fresh data for lookups: acting on a
/// cached box risks moving or assigning one that has already changed.
#[async_trait]
pub trait BoxApi: Send + Sync {
    /// Resolve a scanned label hash.
    async fn resolve_code(&self, code: &str) -> Result<CodeLookup, ApiError>;

    /// Resolve a human-typed label identifier.
    async fn resolve_label(&self, label_identifier: &str) -> Result<LabelLookup, ApiError>;

    /// Move boxes to a location in one call.
    async fn move_boxes(
        &self,
        label_identifiers: &[String],
        location_id: DbId,
    ) -> Result<MutationResponse, ApiError>;

    /// Assign tags to boxes in one call.
    async fn assign_tags(
        &self,
        label_identifiers: &[String],
        tag_ids: &[DbId],
    ) -> Result<MutationResponse, ApiError>;

    /// Add boxes to a shipment that is being prepared.
    ///
    /// The server returns the updated shipment; implementations derive the
    /// per-box outcome from the boxes it now contains.
    async fn assign_to_shipment(
        &self,
        shipment_id: DbId,
        label_identifiers: &[String],
    ) -> Result<MutationResponse, ApiError>;
}
