//! The address-keyed top-level view of the ledger.
//!
//! Every leaf of the state trie is a serialized
//! [`AccountRecord`](crate::codec::AccountRecord) stored under the account's
//! address; contract leaves in turn carry the root of their own storage
//! sub-trie. Both levels share one [`StateDb`] node database.

use ethereum_types::{Address, H256};
use log::trace;

use crate::{
    state_object::StateObject,
    store::{StateDb, StateResult, StoreResult, Trie},
};

/// An address-keyed trie of serialized accounts plus the shared database
/// handle that sub-tries are reopened from.
#[derive(Debug)]
pub struct State {
    trie: Trie,
    db: StateDb,
}

impl State {
    /// Creates an empty state over `db`.
    pub fn new(db: StateDb) -> Self {
        Self {
            trie: db.trie(),
            db,
        }
    }

    /// Reopens the state committed at `root`.
    pub fn at_root(db: StateDb, root: H256) -> StoreResult<Self> {
        Ok(Self {
            trie: db.trie_at(root)?,
            db,
        })
    }

    /// The shared node database backing this state and all of its sub-tries.
    pub const fn db(&self) -> &StateDb {
        &self.db
    }

    /// Fetches and decodes the account stored at `address`.
    ///
    /// An absent account is `None`; a present-but-corrupt record is an
    /// error, never a default.
    pub fn get_object(&self, address: Address) -> StateResult<Option<StateObject>> {
        let raw = self.trie.get(address.as_bytes())?;
        if raw.is_empty() {
            return Ok(None);
        }

        StateObject::from_bytes(address, &raw, &self.db).map(Some)
    }

    /// Serializes `object` (recomputing its storage root) and upserts it
    /// under its address key.
    pub fn update_object(&mut self, object: &mut StateObject) -> StoreResult<()> {
        trace!("Updating account {:x}", object.address());

        let encoded = object.serialize()?;
        self.trie.update(object.address().as_bytes(), &encoded)
    }

    /// Commits pending writes and returns the single digest summarizing the
    /// whole ledger.
    pub fn root(&mut self) -> StoreResult<H256> {
        self.trie.root()
    }
}
