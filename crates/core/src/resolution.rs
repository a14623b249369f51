//! The closed set of outcomes of resolving a scanned code or typed label.

use crate::boxes::BoxRef;

/// Outcome of one resolution call. Exactly one case is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionResult {
    /// The code or label resolved to a box the caller may view.
    Success { resolved: BoxRef },
    /// The code is known to the system but no box is linked to it yet.
    NotAssignedToBox { raw_code: String },
    /// The caller may not view the resolved box (e.g. it belongs to another
    /// organization).
    NotAuthorized,
    /// The caller has permission but the box no longer exists.
    NotFound,
    /// The code does not belong to the application, or no box carries the
    /// typed label.
    NotRecognizedFormat,
    /// Network or server error. Retryable, never presented as "does not
    /// exist".
    TransientFailure { error_detail: String },
}

/// Discriminant of [`ResolutionResult`], for logging and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionKind {
    Success,
    NotAssignedToBox,
    NotAuthorized,
    NotFound,
    NotRecognizedFormat,
    TransientFailure,
}

impl ResolutionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::NotAssignedToBox => "not_assigned_to_box",
            Self::NotAuthorized => "not_authorized",
            Self::NotFound => "not_found",
            Self::NotRecognizedFormat => "not_recognized_format",
            Self::TransientFailure => "transient_failure",
        }
    }
}

impl ResolutionResult {
    pub fn kind(&self) -> ResolutionKind {
        match self {
            Self::Success { .. } => ResolutionKind::Success,
            Self::NotAssignedToBox { .. } => ResolutionKind::NotAssignedToBox,
            Self::NotAuthorized => ResolutionKind::NotAuthorized,
            Self::NotFound => ResolutionKind::NotFound,
            Self::NotRecognizedFormat => ResolutionKind::NotRecognizedFormat,
            Self::TransientFailure { .. } => ResolutionKind::TransientFailure,
        }
    }

    /// Only transient failures are worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientFailure { .. })
    }

    /// The resolved box, if any.
    pub fn resolved_box(&self) -> Option<&BoxRef> {
        match self {
            Self::Success { resolved } => Some(resolved),
            _ => None,
        }
    }
}
