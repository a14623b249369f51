use boxwise_client::ApiError;
use boxwise_core::error::CoreError;
use boxwise_core::types::LabelIdentifier;

/// Unexpected failure escaping a lookup service.
///
/// Expected outcomes (unknown code, no permission, network trouble) are
/// never errors; they are normalized into `ResolutionResult`.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

/// Why a whole batch call failed. No item was updated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFailureKind {
    /// Network, timeout, or server error. Safe to resubmit unchanged.
    Transient,
    /// The caller may not perform this operation.
    PermissionDenied,
    /// The target (location, tag, shipment) does not exist.
    TargetNotFound,
}

/// Aggregate failure of a batch call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind:?}: {detail}")]
pub struct BatchFailure {
    pub kind: BatchFailureKind,
    pub detail: String,
}

impl BatchFailure {
    /// Classify a remote error. Returns `None` for malformed responses,
    /// which are not an aggregate failure but an unexpected error.
    pub fn from_api_error(err: &ApiError) -> Option<Self> {
        let kind = match err {
            ApiError::Malformed(_) => return None,
            ApiError::InsufficientPermission => BatchFailureKind::PermissionDenied,
            ApiError::NotFound => BatchFailureKind::TargetNotFound,
            ApiError::Request(_) | ApiError::Http { .. } | ApiError::Application { .. } => {
                BatchFailureKind::Transient
            }
        };
        Some(Self {
            kind,
            detail: err.to_string(),
        })
    }
}

/// A batch operation that did not produce a per-item outcome.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Nothing was selected.
    #[error("No boxes selected")]
    EmptySelection,

    /// The operation payload is invalid (e.g. no tags chosen).
    #[error(transparent)]
    InvalidOperation(#[from] CoreError),

    /// Some selected boxes may not take part in the operation. Nothing was
    /// sent.
    #[error("{} box(es) are not eligible", .label_identifiers.len())]
    Ineligible { label_identifiers: Vec<LabelIdentifier> },

    /// The remote call failed as a whole.
    #[error("Batch operation failed: {0}")]
    Failed(BatchFailure),

    /// The response had an unexpected shape.
    #[error("Unexpected response: {0}")]
    Unexpected(String),
}
