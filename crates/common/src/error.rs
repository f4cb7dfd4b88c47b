use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to encode request: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("no order id in response")]
    MissingOrderId,

    #[error("malformed order id: '{0}'")]
    InvalidOrderId(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
