use thiserror::Error;

use crate::errors::ServiceError;

/// Failures of the health-record operations.
///
/// Reads report `NotFoundOrDenied` so a caller cannot probe for pets it does
/// not own; mutations report `PetNotFound` and `AccessDenied` separately.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Unauthorized: missing or invalid token")]
    Unauthorized,
    #[error("Pet not found or access denied")]
    NotFoundOrDenied,
    #[error("Pet not found")]
    PetNotFound,
    #[error("Access denied")]
    AccessDenied,
    #[error("Health record not found")]
    RecordNotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    Storage(#[from] ServiceError),
}

impl RecordError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            RecordError::Validation(_) => 2001,
            RecordError::Unauthorized => 2004,
            RecordError::NotFoundOrDenied => 2010,
            RecordError::PetNotFound => 2011,
            RecordError::AccessDenied => 2012,
            RecordError::RecordNotFound => 2013,
            RecordError::Storage(_) => 2200,
        }
    }
}
