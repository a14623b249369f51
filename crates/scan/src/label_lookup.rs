//! Label Lookup Service: typed label identifier to [`ResolutionResult`].
//!
//! Labels are free-form, so there is no format check. `NotRecognizedFormat`
//! here means "no box carries this label", an ordinary outcome.

use std::sync::Arc;

use boxwise_client::{ApiError, BoxApi, LabelLookup};
use boxwise_core::resolution::ResolutionResult;

use crate::error::ScanError;

pub struct LabelLookupService {
    api: Arc<dyn BoxApi>,
}

impl LabelLookupService {
    pub fn new(api: Arc<dyn BoxApi>) -> Self {
        Self { api }
    }

    pub async fn lookup(&self, label_identifier: &str) -> Result<ResolutionResult, ScanError> {
        let label = label_identifier.trim();
        if label.is_empty() {
            return Ok(ResolutionResult::NotRecognizedFormat);
        }

        let result = match self.api.resolve_label(label).await {
            Ok(LabelLookup::Box(resolved)) => ResolutionResult::Success { resolved },
            Ok(LabelLookup::Deleted) => ResolutionResult::NotFound,
            Err(ApiError::NotFound) => ResolutionResult::NotRecognizedFormat,
            Err(ApiError::InsufficientPermission) => ResolutionResult::NotAuthorized,
            Err(ApiError::Malformed(detail)) => {
                tracing::error!(label_identifier = %label, detail = %detail, "Malformed label lookup response");
                return Err(ScanError::Unexpected(detail));
            }
            Err(err) => {
                tracing::warn!(label_identifier = %label, error = %err, "Label lookup failed");
                ResolutionResult::TransientFailure {
                    error_detail: err.to_string(),
                }
            }
        };

        tracing::info!(
            label_identifier = %label,
            kind = result.kind().as_str(),
            "Resolved box label",
        );
        Ok(result)
    }
}
