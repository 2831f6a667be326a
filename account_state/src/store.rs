//! Seam over the content-addressed state store.
//!
//! The trie itself is an external collaborator (the [`eth_trie`] crate);
//! this module exposes the three primitives the rest of the crate consumes
//! (get, update, root) plus the ability to reopen a trie at a previously
//! committed root over the same shared node database. Faults coming out of
//! the store are propagated unchanged.

use std::{fmt, sync::Arc};

use eth_trie::{EthTrie, MemoryDB, Trie as _, TrieError};
use ethereum_types::H256;
use keccak_hash::KECCAK_NULL_RLP;
use thiserror::Error;

use crate::codec::MalformedRecord;

/// Stores the result of operations that only touch the backing store.
pub type StoreResult<T> = Result<T, TrieError>;

/// Stores the result of state operations that may touch both the backing
/// store and the record codec.
pub type StateResult<T> = Result<T, StateError>;

/// Top-level error for state operations.
#[derive(Debug, Error)]
pub enum StateError {
    /// A persisted account record or storage scalar failed to decode.
    #[error(transparent)]
    Malformed(#[from] MalformedRecord),

    /// The backing store faulted.
    #[error(transparent)]
    Store(#[from] TrieError),
}

/// Cloneable handle to the node database backing every trie in a ledger.
///
/// All tries opened through one handle share the same storage, which is what
/// lets an account record carry just a root digest: the sub-trie behind it is
/// reachable from the shared database.
#[derive(Clone)]
pub struct StateDb {
    nodes: Arc<MemoryDB>,
}

impl Default for StateDb {
    fn default() -> Self {
        Self::new()
    }
}

impl StateDb {
    /// Creates a fresh, empty node database.
    pub fn new() -> Self {
        Self {
            nodes: Arc::new(MemoryDB::new(false)),
        }
    }

    /// Opens an empty trie backed by this database.
    pub fn trie(&self) -> Trie {
        Trie {
            inner: EthTrie::new(self.nodes.clone()),
        }
    }

    /// Reopens a trie at a previously committed root.
    ///
    /// The zero digest and the canonical empty-trie root both open a fresh
    /// empty trie. Opening itself never faults; a root that cannot be
    /// resolved from the database surfaces as a store fault on the first
    /// read through it.
    pub fn trie_at(&self, root: H256) -> StoreResult<Trie> {
        if root.is_zero() || root == KECCAK_NULL_RLP {
            return Ok(self.trie());
        }

        Ok(Trie {
            inner: EthTrie::new(self.nodes.clone()).at_root(root),
        })
    }
}

impl fmt::Debug for StateDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateDb").finish_non_exhaustive()
    }
}

/// A content-addressed key/value mapping with a single root digest.
pub struct Trie {
    inner: EthTrie<MemoryDB>,
}

impl Trie {
    /// Reads the value stored under `key`.
    ///
    /// A miss is not an error: it reads as the empty byte string.
    pub fn get(&self, key: &[u8]) -> StoreResult<Vec<u8>> {
        Ok(self.inner.get(key)?.unwrap_or_default())
    }

    /// Upserts `value` under `key`. Last write wins.
    pub fn update(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        self.inner.insert(key, value)
    }

    /// Commits pending writes and returns the root digest summarizing the
    /// trie's full contents.
    ///
    /// Identical contents always produce identical roots, regardless of
    /// insertion order.
    pub fn root(&mut self) -> StoreResult<H256> {
        self.inner.root_hash()
    }
}

impl fmt::Debug for Trie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trie").finish_non_exhaustive()
    }
}
