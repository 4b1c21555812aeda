//! Action and auth registries used to decode raw transactions.
//!
//! Registries are injected through a [`Parser`](crate::parser::Parser) so the
//! index can be exercised with a reduced set of action types in tests.

use std::collections::HashMap;

use crate::block::Transaction;
use crate::error::DecodeError;
use crate::ids::{Address, Id, TxId, ADDRESS_LEN, ID_LEN};

/// Type id of the sequencer message action.
pub const SEQUENCER_MSG_ID: u8 = 0;
/// Type id of the transfer action.
pub const TRANSFER_ID: u8 = 1;
/// Type id of ED25519 auth.
pub const ED25519_ID: u8 = 0;
/// Type id of SECP256R1 auth.
pub const SECP256R1_ID: u8 = 1;

const SIGNATURE_LEN: usize = 64;

// ─── Byte reader ──────────────────────────────────────────────────────────────

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], DecodeError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or(DecodeError::Truncated { field })?;
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn u8(&mut self, field: &'static str) -> Result<u8, DecodeError> {
        Ok(self.take(1, field)?[0])
    }

    fn u32(&mut self, field: &'static str) -> Result<u32, DecodeError> {
        let b = self.take(4, field)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn u64(&mut self, field: &'static str) -> Result<u64, DecodeError> {
        let b = self.take(8, field)?;
        let mut arr = [0u8; 8];
        arr.copy_from_slice(b);
        Ok(u64::from_be_bytes(arr))
    }

    /// A `u32` length prefix followed by that many bytes.
    fn bytes(&mut self, field: &'static str) -> Result<&'a [u8], DecodeError> {
        let len = self.u32(field)? as usize;
        self.take(len, field)
    }

    fn rest(&mut self) -> &'a [u8] {
        let out = &self.buf[self.pos..];
        self.pos = self.buf.len();
        out
    }

    fn finish(&self, kind: &'static str) -> Result<(), DecodeError> {
        if self.pos == self.buf.len() {
            Ok(())
        } else {
            Err(DecodeError::Malformed {
                kind,
                reason: format!("{} trailing bytes", self.buf.len() - self.pos),
            })
        }
    }
}

// ─── Actions ──────────────────────────────────────────────────────────────────

/// A message posted to a rollup's namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerMsg {
    /// Destination chain id; its hex form is the namespace.
    pub chain_id: Vec<u8>,
    /// Opaque payload.
    pub data: Vec<u8>,
}

impl SequencerMsg {
    pub fn new(chain_id: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            chain_id: chain_id.into(),
            data: data.into(),
        }
    }

    /// The namespace this message is routed to.
    pub fn namespace(&self) -> String {
        hex::encode(&self.chain_id)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(8 + self.chain_id.len() + self.data.len());
        out.extend_from_slice(&(self.chain_id.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.chain_id);
        out.extend_from_slice(&(self.data.len() as u32).to_be_bytes());
        out.extend_from_slice(&self.data);
        out
    }

    /// Wrap this message into a raw transaction signed with `auth`.
    pub fn into_transaction(&self, auth_type: u8, auth: &[u8]) -> Transaction {
        Transaction::encode(SEQUENCER_MSG_ID, &self.encode(), auth_type, auth)
    }

    fn decode(payload: &[u8]) -> Result<Action, DecodeError> {
        let mut r = Reader::new(payload);
        let chain_id = r.bytes("chain_id")?.to_vec();
        let data = r.bytes("data")?.to_vec();
        r.finish("sequencer_msg")?;
        Ok(Action::SequencerMsg(Self { chain_id, data }))
    }
}

/// A token transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub to: Address,
    pub asset: Id,
    pub value: u64,
}

impl Transfer {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(ADDRESS_LEN + ID_LEN + 8);
        out.extend_from_slice(self.to.as_bytes());
        out.extend_from_slice(self.asset.as_bytes());
        out.extend_from_slice(&self.value.to_be_bytes());
        out
    }

    fn decode(payload: &[u8]) -> Result<Action, DecodeError> {
        let mut r = Reader::new(payload);
        let mut to = [0u8; ADDRESS_LEN];
        to.copy_from_slice(r.take(ADDRESS_LEN, "to")?);
        let mut asset = [0u8; ID_LEN];
        asset.copy_from_slice(r.take(ID_LEN, "asset")?);
        let value = r.u64("value")?;
        r.finish("transfer")?;
        Ok(Action::Transfer(Self {
            to: Address::new(to),
            asset: Id::new(asset),
            value,
        }))
    }
}

/// A decoded transaction action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SequencerMsg(SequencerMsg),
    Transfer(Transfer),
    /// A registered action type this crate does not interpret.
    Other { type_id: u8, payload: Vec<u8> },
}

impl Action {
    pub fn as_sequencer_msg(&self) -> Option<&SequencerMsg> {
        match self {
            Self::SequencerMsg(msg) => Some(msg),
            _ => None,
        }
    }
}

/// A decoded transaction authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Auth {
    pub type_id: u8,
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
}

/// A raw transaction after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub id: TxId,
    pub action: Action,
    pub auth: Auth,
}

// ─── Registry traits ──────────────────────────────────────────────────────────

/// Decodes action payloads by type id.
pub trait ActionRegistry: Send + Sync {
    fn decode_action(&self, type_id: u8, payload: &[u8]) -> Result<Action, DecodeError>;
}

/// Decodes auth payloads by type id.
pub trait AuthRegistry: Send + Sync {
    fn decode_auth(&self, type_id: u8, payload: &[u8]) -> Result<Auth, DecodeError>;
}

/// Decode `tx` using the given registries.
pub fn decode_transaction(
    tx: &Transaction,
    actions: &dyn ActionRegistry,
    auths: &dyn AuthRegistry,
) -> Result<DecodedTransaction, DecodeError> {
    let mut r = Reader::new(tx.as_bytes());
    let action_type = r.u8("action_type")?;
    let action = actions.decode_action(action_type, r.bytes("action")?)?;
    let auth_type = r.u8("auth_type")?;
    let auth = auths.decode_auth(auth_type, r.rest())?;
    Ok(DecodedTransaction {
        id: tx.id(),
        action,
        auth,
    })
}

// ─── In-memory registries ─────────────────────────────────────────────────────

/// Decoder function for one action type.
pub type ActionDecoder = fn(&[u8]) -> Result<Action, DecodeError>;

/// Action registry backed by a `HashMap`.
#[derive(Clone)]
pub struct MemoryActionRegistry {
    decoders: HashMap<u8, ActionDecoder>,
}

impl MemoryActionRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Registry with the sequencer message and transfer actions.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(SEQUENCER_MSG_ID, SequencerMsg::decode);
        registry.register(TRANSFER_ID, Transfer::decode);
        registry
    }

    /// Register (or replace) the decoder for `type_id`.
    pub fn register(&mut self, type_id: u8, decoder: ActionDecoder) {
        self.decoders.insert(type_id, decoder);
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl Default for MemoryActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionRegistry for MemoryActionRegistry {
    fn decode_action(&self, type_id: u8, payload: &[u8]) -> Result<Action, DecodeError> {
        let decoder = self
            .decoders
            .get(&type_id)
            .ok_or(DecodeError::UnknownAction(type_id))?;
        decoder(payload)
    }
}

/// Auth registry keyed by type id, each entry fixing the public key length.
#[derive(Clone)]
pub struct MemoryAuthRegistry {
    key_lengths: HashMap<u8, usize>,
}

impl MemoryAuthRegistry {
    /// Registry with ED25519 (32-byte keys) and SECP256R1 (33-byte keys).
    pub fn new() -> Self {
        let mut key_lengths = HashMap::new();
        key_lengths.insert(ED25519_ID, 32);
        key_lengths.insert(SECP256R1_ID, 33);
        Self { key_lengths }
    }

    pub fn register(&mut self, type_id: u8, public_key_len: usize) {
        self.key_lengths.insert(type_id, public_key_len);
    }
}

impl Default for MemoryAuthRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthRegistry for MemoryAuthRegistry {
    fn decode_auth(&self, type_id: u8, payload: &[u8]) -> Result<Auth, DecodeError> {
        let key_len = *self
            .key_lengths
            .get(&type_id)
            .ok_or(DecodeError::UnknownAuth(type_id))?;
        let mut r = Reader::new(payload);
        let public_key = r.take(key_len, "public_key")?.to_vec();
        let signature = r.take(SIGNATURE_LEN, "signature")?.to_vec();
        r.finish("auth")?;
        Ok(Auth {
            type_id,
            public_key,
            signature,
        })
    }
}

/// A zeroed ED25519 auth blob, for building fixtures.
pub fn ed25519_placeholder_auth() -> Vec<u8> {
    vec![0u8; 32 + SIGNATURE_LEN]
}
