use thiserror::Error;

/// Storage-level failures. Every variant is terminal for the request that hit it.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("storage error: {0}")]
    Db(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ServiceError {
    pub fn io(path: &std::path::Path, e: std::io::Error) -> Self {
        Self::Db(format!("{}: {}", path.display(), e))
    }
}
