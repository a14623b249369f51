//! Resolution Service: scanned code to [`ResolutionResult`].
//!
//! Performs no navigation, notification, or selection changes; callers do,
//! so the same service backs both single-box and multi-box flows.

use std::sync::Arc;

use boxwise_client::{ApiError, BoxApi, CodeLookup};
use boxwise_core::code_format::CodeClassifier;
use boxwise_core::resolution::ResolutionResult;

use crate::error::ScanError;

pub struct ResolutionService {
    api: Arc<dyn BoxApi>,
    classifier: CodeClassifier,
}

impl ResolutionService {
    pub fn new(api: Arc<dyn BoxApi>) -> Self {
        Self::with_classifier(api, CodeClassifier::new())
    }

    pub fn with_classifier(api: Arc<dyn BoxApi>, classifier: CodeClassifier) -> Self {
        Self { api, classifier }
    }

    /// Resolve a raw scanned code.
    ///
    /// Foreign codes short-circuit to `NotRecognizedFormat` without a
    /// network call. `Err` is returned only for malformed responses.
    pub async fn resolve(
        &self,
        raw_code: &str,
        is_batch_context: bool,
    ) -> Result<ResolutionResult, ScanError> {
        let class = self.classifier.classify(raw_code);
        let Some(code) = class.code.filter(|_| class.is_application_code) else {
            tracing::debug!(is_batch_context, "Scanned code is not an application code");
            return Ok(ResolutionResult::NotRecognizedFormat);
        };

        let result = match self.api.resolve_code(&code).await {
            Ok(CodeLookup::Box(resolved)) => ResolutionResult::Success { resolved },
            Ok(CodeLookup::NotAssigned) => ResolutionResult::NotAssignedToBox {
                raw_code: raw_code.trim().to_string(),
            },
            Ok(CodeLookup::BoxNotAuthorized) => ResolutionResult::NotAuthorized,
            Ok(CodeLookup::BoxNotFound) => ResolutionResult::NotFound,
            Err(ApiError::NotFound) => ResolutionResult::NotRecognizedFormat,
            Err(ApiError::InsufficientPermission) => ResolutionResult::NotAuthorized,
            Err(ApiError::Malformed(detail)) => {
                tracing::error!(code = %code, detail = %detail, "Malformed code lookup response");
                return Err(ScanError::Unexpected(detail));
            }
            Err(err) => {
                tracing::warn!(code = %code, error = %err, "Code lookup failed");
                ResolutionResult::TransientFailure {
                    error_detail: err.to_string(),
                }
            }
        };

        tracing::info!(
            code = %code,
            is_batch_context,
            kind = result.kind().as_str(),
            "Resolved scanned code",
        );
        Ok(result)
    }
}
