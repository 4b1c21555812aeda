//! Errors returned by the RPC-facing handlers.

use thiserror::Error;

use seqindex_core::error::{IngestError, ParseIdError};

/// JSON-RPC "invalid params".
pub const CODE_INVALID_PARAMS: i64 = -32602;
/// JSON-RPC "internal error".
pub const CODE_INTERNAL: i64 = -32603;
/// Server-defined "resource not found".
pub const CODE_NOT_FOUND: i64 = -32004;

/// Errors surfaced to RPC clients.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The request carried an unparseable id or address.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error("tx not found")]
    TxNotFound,

    #[error("asset not found")]
    AssetNotFound,

    #[error("no block at timestamp {0}")]
    NoBlockAtTimestamp(i64),

    /// The state controller failed.
    #[error("state error: {0}")]
    State(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl ServiceError {
    /// JSON-RPC error code for this error.
    pub fn code(&self) -> i64 {
        match self {
            Self::InvalidParams(_) => CODE_INVALID_PARAMS,
            Self::TxNotFound | Self::AssetNotFound | Self::NoBlockAtTimestamp(_) => CODE_NOT_FOUND,
            Self::State(_) | Self::Ingest(_) => CODE_INTERNAL,
        }
    }

    /// Returns `true` for "nothing there" errors, as opposed to bad input or failures.
    pub fn is_not_found(&self) -> bool {
        self.code() == CODE_NOT_FOUND
    }
}

impl From<ParseIdError> for ServiceError {
    fn from(err: ParseIdError) -> Self {
        Self::InvalidParams(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes() {
        assert_eq!(ServiceError::from(ParseIdError::Checksum).code(), CODE_INVALID_PARAMS);
        assert!(ServiceError::TxNotFound.is_not_found());
        assert!(ServiceError::NoBlockAtTimestamp(5).is_not_found());
        assert!(!ServiceError::State("boom".into()).is_not_found());
        assert_eq!(
            ServiceError::from(IngestError::HeightAlreadyIndexed(1)).code(),
            CODE_INTERNAL
        );
    }
}
