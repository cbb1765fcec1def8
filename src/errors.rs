use thiserror::Error;
use uuid::Uuid;

/// Error type that captures tracker failures outside the occurrence engine.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),
    #[error("Invalid custom interval: {0}")]
    InvalidInterval(u32),
    #[error("Item not found: {0}")]
    ItemNotFound(Uuid),
    #[error("Item {0} is not an expense")]
    NotAnExpense(Uuid),
    #[error("Window start is after window end")]
    InvalidWindow,
}
