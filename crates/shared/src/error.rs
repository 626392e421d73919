use std::time::Duration;

use thiserror::Error;

/// Every way a single exchange with the chat service can fail. All variants are
/// recovered the same way by the session controller.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid chat service base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("chat service unreachable: {0}")]
    Network(String),
    #[error("chat service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed chat service payload: {0}")]
    Malformed(String),
    #[error("chat service did not reply within {0:?}")]
    Timeout(Duration),
}
