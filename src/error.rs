use thiserror::Error;

/// Errors raised by the progression core, the shop and the timer.
///
/// Shell code (CLI handlers, TUI) converts these into `anyhow::Error` with `?`.
#[derive(Error, Debug)]
pub enum ForgeError {
    #[error("Invalid value for '{field}': {message}")]
    InvalidArgument { field: &'static str, message: String },

    #[error("Insufficient balance: need {needed} coins, have {available}")]
    InsufficientBalance { needed: u64, available: u64 },

    #[error("Unknown shop item: {0}")]
    UnknownItem(String),

    #[error("'{0}' is already owned")]
    AlreadyOwned(String),

    #[error("Storage error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ForgeError {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ForgeError::InvalidArgument {
            field,
            message: message.into(),
        }
    }
}

pub type Result<T, E = ForgeError> = std::result::Result<T, E>;
