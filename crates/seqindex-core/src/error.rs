//! Error types shared across the seqindex crates.

use thiserror::Error;

/// An identifier or address string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseIdError {
    #[error("invalid encoding: {0}")]
    Encoding(String),

    #[error("invalid length: expected {expected} bytes, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("checksum mismatch")]
    Checksum,
}

/// A raw transaction could not be decoded through the registries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input reading {field}")]
    Truncated { field: &'static str },

    #[error("unknown action type {0}")]
    UnknownAction(u8),

    #[error("unknown auth type {0}")]
    UnknownAuth(u8),

    #[error("malformed {kind} payload: {reason}")]
    Malformed { kind: &'static str, reason: String },
}

/// The block codec failed to derive an identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("block has {txs} transactions but {results} results")]
    ResultsMismatch { txs: usize, results: usize },

    #[error("{0}")]
    Other(String),
}

/// Errors that abort a single ingestion call. Nothing is indexed when one is
/// returned.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("block id derivation failed: {0}")]
    Codec(#[from] CodecError),

    #[error("transaction {index} failed to decode: {source}")]
    Decode {
        index: usize,
        #[source]
        source: DecodeError,
    },

    #[error("height {0} is already indexed")]
    HeightAlreadyIndexed(u64),
}

impl IngestError {
    /// Returns `true` if the height was already taken. The stored block may
    /// differ from the rejected one, so callers should compare ids before
    /// treating this as a harmless re-delivery.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::HeightAlreadyIndexed(_))
    }
}
