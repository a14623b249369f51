//! Scanned code format classification.
//!
//! Printed box labels encode either a bare 32-character lowercase hex hash
//! or a URL carrying that hash in its `qr` query parameter, e.g.
//! `https://app.example.org/?qr=9627242265f5a7f3a1db910eb18410f8`.
//! Anything else (EAN barcodes, foreign QR payloads) is not an application
//! code and is rejected without a network round trip.
//!
//! This is a heuristic only. A code that passes may still be unknown to the
//! server, which is authoritative.

use std::sync::LazyLock;

use regex::Regex;

/// Bare label hash.
static HASH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9a-f]{32}$").expect("valid regex"));

/// Label URL: any http(s) URL whose query string has `qr=<hash>`.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s?#]+\?(?:[^#\s]*&)?qr=([0-9a-f]{32})(?:[&#]\S*)?$")
        .expect("valid regex")
});

/// Result of classifying a raw scanned string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeClass {
    pub is_application_code: bool,
    /// The label hash to resolve, present iff `is_application_code`.
    pub code: Option<String>,
}

impl CodeClass {
    fn foreign() -> Self {
        Self {
            is_application_code: false,
            code: None,
        }
    }

    fn application(code: &str) -> Self {
        Self {
            is_application_code: true,
            code: Some(code.to_string()),
        }
    }
}

/// Classifier with an optional restriction on the label URL host.
#[derive(Debug, Clone, Default)]
pub struct CodeClassifier {
    url_prefix: Option<String>,
}

impl CodeClassifier {
    /// Accept label URLs on any host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept label URLs starting with `prefix`
    /// (e.g. `https://app.example.org/`). Bare hashes are still accepted.
    pub fn with_url_prefix(prefix: impl Into<String>) -> Self {
        Self {
            url_prefix: Some(prefix.into()),
        }
    }

    /// Classify a raw scanned payload. Pure and synchronous.
    ///
    /// Surrounding whitespace (scanners often append a newline) is ignored.
    pub fn classify(&self, raw_code: &str) -> CodeClass {
        let raw = raw_code.trim();

        if HASH_RE.is_match(raw) {
            return CodeClass::application(raw);
        }

        if let Some(prefix) = &self.url_prefix {
            if !raw.starts_with(prefix.as_str()) {
                return CodeClass::foreign();
            }
        }

        match URL_RE.captures(raw).and_then(|caps| caps.get(1)) {
            Some(hash) => CodeClass::application(hash.as_str()),
            None => CodeClass::foreign(),
        }
    }
}

/// Classify with the default, host-agnostic classifier.
pub fn classify(raw_code: &str) -> CodeClass {
    CodeClassifier::new().classify(raw_code)
}
