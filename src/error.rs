use thiserror::Error;

/// Errors surfaced while building a preflight bind.
///
/// Delegated transport errors never appear here: they are returned by the
/// inner bind as `std::io::Error` and forwarded untouched.
#[derive(Error, Debug)]
pub enum PreflightError {
    #[error("Invalid probe payload (expected hex): {0}")]
    InvalidPayload(#[from] hex::FromHexError),
    #[error("No tokio runtime available to run probe tasks")]
    NoRuntime,
    #[error("Invalid preflight configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PreflightError>;
