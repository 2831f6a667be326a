//! Canonical binary encoding of persisted account records.
//!
//! Every account in the ledger is stored in the state trie as an RLP list of
//! exactly four fields: `[balance, nonce, storage_root, code]`. A plain
//! account has no storage sub-trie and its root encodes as the empty byte
//! string rather than a digest. Field order is part of the persisted format
//! and must not change.

use bytes::Bytes;
use ethereum_types::{H256, U256};
use rlp::{DecoderError, Encodable, Rlp, RlpStream};
use thiserror::Error;

/// Number of fields in a persisted account record.
const RECORD_FIELDS: usize = 4;

/// Stores the result of decoding a persisted record.
pub type CodecResult<T> = Result<T, MalformedRecord>;

/// An error type for account record decoding.
///
/// A corrupt persisted record is always surfaced to the caller, never
/// silently defaulted.
#[derive(Debug, Eq, Error, PartialEq)]
pub enum MalformedRecord {
    /// The byte stream was truncated, a length prefix pointed past the end of
    /// the buffer, or a field had the wrong type or width.
    #[error("undecodable account record: {0}")]
    Rlp(#[from] DecoderError),

    /// The record was a well-formed list with the wrong number of fields.
    #[error("account record has {0} fields (expected 4)")]
    FieldCount(usize),
}

/// The decoded form of a persisted account record.
///
/// The account's address is deliberately not part of the record: it is the
/// key the record is stored under in the state trie.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountRecord {
    /// Account balance.
    pub balance: U256,

    /// Number of state-changing operations originated by the account so far.
    pub nonce: u64,

    /// Root digest of the account's storage sub-trie, or `None` for a plain
    /// account with no storage namespace.
    pub storage_root: Option<H256>,

    /// Contract bytecode. Empty for plain accounts.
    pub code: Bytes,
}

impl AccountRecord {
    /// Encodes this record into its canonical persisted byte form.
    ///
    /// Encoding is deterministic: identical records always produce identical
    /// bytes, and `decode(encode(r)) == r` for every valid record.
    pub fn encode(&self) -> Bytes {
        rlp::encode(self).freeze()
    }

    /// Decodes a persisted record.
    pub fn decode(bytes: &[u8]) -> CodecResult<Self> {
        let rlp = Rlp::new(bytes);

        let field_count = rlp.item_count()?;
        if field_count != RECORD_FIELDS {
            return Err(MalformedRecord::FieldCount(field_count));
        }

        let root_field = rlp.at(2)?;
        let storage_root = match root_field.data()?.len() {
            0 => None,
            _ => Some(root_field.as_val()?),
        };

        Ok(Self {
            balance: rlp.val_at(0)?,
            nonce: rlp.val_at(1)?,
            storage_root,
            code: Bytes::copy_from_slice(rlp.at(3)?.data()?),
        })
    }
}

impl Encodable for AccountRecord {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(RECORD_FIELDS);
        s.append(&self.balance);
        s.append(&self.nonce);
        match self.storage_root {
            Some(root) => s.append(&root),
            None => s.append_empty_data(),
        };
        s.append(&RawBytes(&self.code));
    }
}

/// Adapter that appends a field as a raw RLP byte string.
pub(crate) struct RawBytes<'a>(pub(crate) &'a [u8]);

impl Encodable for RawBytes<'_> {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.encoder().encode_value(self.0);
    }
}
