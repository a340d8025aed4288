use crate::vitals::VitalsField;

/// Errors surfaced by the vitals editing workflow.
#[derive(Debug, thiserror::Error)]
pub enum VitalsError {
    #[error("invalid {field} input: {input:?} is not a number")]
    Validation { field: VitalsField, input: String },
    #[error("patient store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),
    #[error("patient not found: {0}")]
    PatientNotFound(String),
    #[error("vitals session is closed")]
    SessionClosed,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type VitalsResult<T> = std::result::Result<T, VitalsError>;

/// Failures reported by a [`PatientStore`](crate::ports::PatientStore) adapter.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unknown patient: {0}")]
    UnknownPatient(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    /// Reported by host adapters whose backend enforces a deadline. The bundled
    /// in-memory and JSON-file stores never return it.
    #[error("commit timed out")]
    Timeout,
    #[error("failed to read patient file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write patient file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize patients: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize patients: {0}")]
    Deserialization(serde_json::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failure to deliver a user notification. Never fatal to a submit.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification sink unavailable: {0}")]
    Unavailable(String),
}
