//! 32-byte identifiers and 33-byte addresses.
//!
//! Ids use the node's cb58 text form: base58 over the raw bytes followed by
//! the last four bytes of their SHA-256 digest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::error::ParseIdError;

const CHECKSUM_LEN: usize = 4;

/// Length of an [`Id`] in bytes.
pub const ID_LEN: usize = 32;

/// Length of an [`Address`] in bytes (type prefix + 32-byte key).
pub const ADDRESS_LEN: usize = 33;

/// cb58 text of [`Id::EMPTY`].
pub const EMPTY_CB58: &str = "11111111111111111111111111111111LpoYY";

/// A content-derived 32-byte identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Id([u8; ID_LEN]);

/// Identifier of an accepted block.
pub type BlockId = Id;

/// Identifier of a transaction (`sha256` of its raw bytes).
pub type TxId = Id;

impl Id {
    /// The all-zero id.
    pub const EMPTY: Self = Self([0u8; ID_LEN]);

    pub const fn new(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Hash arbitrary bytes into an id.
    pub fn digest(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }

    /// Encode as cb58.
    pub fn to_cb58(&self) -> String {
        let checksum = Sha256::digest(self.0);
        let mut buf = Vec::with_capacity(ID_LEN + CHECKSUM_LEN);
        buf.extend_from_slice(&self.0);
        buf.extend_from_slice(&checksum[checksum.len() - CHECKSUM_LEN..]);
        bs58::encode(buf).into_string()
    }
}

impl From<[u8; ID_LEN]> for Id {
    fn from(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Id {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = bs58::decode(s)
            .into_vec()
            .map_err(|e| ParseIdError::Encoding(e.to_string()))?;
        if raw.len() != ID_LEN + CHECKSUM_LEN {
            return Err(ParseIdError::Length {
                expected: ID_LEN + CHECKSUM_LEN,
                actual: raw.len(),
            });
        }
        let (body, checksum) = raw.split_at(ID_LEN);
        let digest = Sha256::digest(body);
        if digest[digest.len() - CHECKSUM_LEN..] != *checksum {
            return Err(ParseIdError::Checksum);
        }
        let mut bytes = [0u8; ID_LEN];
        bytes.copy_from_slice(body);
        Ok(Self(bytes))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cb58())
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.to_cb58())
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_cb58())
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ─── Address ──────────────────────────────────────────────────────────────────

/// An account address: one type byte followed by a 32-byte key.
///
/// Text form is lowercase hex, optionally `0x`-prefixed on input.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// The leading type byte.
    pub fn kind(&self) -> u8 {
        self.0[0]
    }
}

impl FromStr for Address {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(s).map_err(|e| ParseIdError::Encoding(e.to_string()))?;
        let bytes: [u8; ADDRESS_LEN] =
            raw.as_slice()
                .try_into()
                .map_err(|_| ParseIdError::Length {
                    expected: ADDRESS_LEN,
                    actual: raw.len(),
                })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_has_known_cb58() {
        assert_eq!(Id::EMPTY.to_cb58(), EMPTY_CB58);
        // one leading '1' per zero byte of the body
        assert!(EMPTY_CB58.starts_with(&"1".repeat(ID_LEN)));
        assert_eq!(EMPTY_CB58.parse::<Id>().unwrap(), Id::EMPTY);
        assert!(Id::EMPTY.is_empty());
    }

    #[test]
    fn cb58_parses_back() {
        let id = Id::digest(b"block 7");
        let parsed: Id = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn cb58_rejects_bad_checksum() {
        let mut text = Id::digest(b"x").to_cb58();
        // flip the final character to another base58 digit
        let last = text.pop().unwrap();
        text.push(if last == '2' { '3' } else { '2' });
        assert!(text.parse::<Id>().is_err());
    }

    #[test]
    fn cb58_rejects_garbage() {
        assert!(matches!("not-an-id".parse::<Id>(), Err(ParseIdError::Encoding(_))));
        assert!(matches!("1111".parse::<Id>(), Err(ParseIdError::Length { .. })));
    }

    #[test]
    fn address_hex_with_and_without_prefix() {
        let hex = format!("00{}", "ab".repeat(32));
        let a: Address = hex.parse().unwrap();
        let b: Address = format!("0x{hex}").parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.kind(), 0);
        assert_eq!(a.to_string(), format!("0x{hex}"));
    }

    #[test]
    fn address_wrong_length() {
        assert!(matches!(
            "0xabcd".parse::<Address>(),
            Err(ParseIdError::Length { expected: 33, actual: 2 })
        ));
    }
}
