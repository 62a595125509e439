use thiserror::Error;

/// Errors surfaced across the matching public boundary.
///
/// Recoverable gaps in the inputs (missing embedding, undeclared job
/// skills or level, absent preferences) are scored with neutral factor
/// values and never reach this type; partial profiles are the common case.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("invalid weights: {0}")]
    InvalidWeights(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl MatchError {
    /// Stable machine-readable code for consumers that serialize errors.
    pub fn code(&self) -> &'static str {
        match self {
            MatchError::InvalidWeights(_) => "invalid_weights",
            MatchError::Internal(_) => "internal_error",
        }
    }
}
