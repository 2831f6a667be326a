//! Transaction content hashing and contract address derivation.
//!
//! Only the parts of a transaction this crate consumes are modelled here: an
//! optional recipient (absent for contract creation), the transferred value,
//! and the code/init payloads. Signatures, gas accounting and validation
//! rules live elsewhere.

use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use keccak_hash::keccak;
use rlp::{Encodable, RlpStream};

use crate::codec::RawBytes;

/// An inbound state-changing transaction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transaction {
    /// Sender-assigned sequence number.
    pub nonce: u64,

    /// Destination account, or `None` for a contract-creation transaction.
    pub recipient: Option<Address>,

    /// Value transferred to the recipient (or to the created contract).
    pub value: U256,

    /// Call payload; for contract creation, the contract's bytecode.
    pub data: Bytes,

    /// Initialization payload, consumed only during contract construction.
    pub init: Bytes,
}

impl Transaction {
    /// A message call to an existing account.
    pub fn message_call(nonce: u64, recipient: Address, value: U256, data: Bytes) -> Self {
        Self {
            nonce,
            recipient: Some(recipient),
            value,
            data,
            init: Bytes::new(),
        }
    }

    /// A contract-creation transaction: no recipient, `data` becomes the
    /// contract's code and `init` its construction payload.
    pub fn contract_creation(nonce: u64, value: U256, data: Bytes, init: Bytes) -> Self {
        Self {
            nonce,
            recipient: None,
            value,
            data,
            init,
        }
    }

    /// Whether this transaction creates a contract (it designates no
    /// explicit recipient).
    pub const fn is_contract_creation(&self) -> bool {
        self.recipient.is_none()
    }

    /// Keccak-256 digest of the transaction's canonical encoding.
    pub fn hash(&self) -> H256 {
        keccak(rlp::encode(self))
    }

    /// The address a contract created by this transaction lives at: the last
    /// 20 bytes of the 32-byte content hash. The slicing is fixed; two
    /// transactions only collide here if their hashes do.
    pub fn contract_address(&self) -> Address {
        Address::from_slice(&self.hash().as_bytes()[12..])
    }
}

impl Encodable for Transaction {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(5);
        s.append(&self.nonce);
        match self.recipient {
            Some(to) => s.append(&to),
            None => s.append_empty_data(),
        };
        s.append(&self.value);
        s.append(&RawBytes(&self.data));
        s.append(&RawBytes(&self.init));
    }
}
