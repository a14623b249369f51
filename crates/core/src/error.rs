#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Invalid input or configuration value.
    #[error("Validation failed: {0}")]
    Validation(String),
}
