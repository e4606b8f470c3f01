use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    /// Unreadable or corrupt document. Readers recover from this with an empty document.
    #[error("storage read error: {0}")]
    StorageRead(String),
    /// Encoding, writing or replacing the document failed; the update was not persisted.
    #[error("storage write error: {0}")]
    StorageWrite(String),
}

impl ServiceError {
    pub fn required(field: &str) -> Self { Self::Validation(format!("{} required", field)) }

    pub fn is_validation(&self) -> bool { matches!(self, Self::Validation(_)) }
}
