//! Address-keyed cache of live state objects with nonce lookahead.
//!
//! Transaction construction needs the *next* nonce for an address before any
//! of the pending transactions commit. The committed trie only reflects the
//! last committed nonce, so a burst of transactions from one address would
//! collide on nonces if every one of them re-read the store. The cache pairs
//! the nonce observed at insertion time with a live reference to the object;
//! the caller advances the cached value as it hands nonces out. The cache
//! itself is a passive shared counter and never increments anything.

use std::{collections::HashMap, sync::Arc};

use ethereum_types::Address;
use parking_lot::RwLock;

use crate::state_object::StateObject;

/// Shared handle to a live state object.
pub type SharedStateObject = Arc<RwLock<StateObject>>;

/// A state object paired with the nonce captured when it entered the cache.
///
/// Volatile: never persisted, rebuilt from the live object on every
/// [`StateObjectCache::insert`].
#[derive(Clone, Debug)]
pub struct CachedStateObject {
    /// Predicted next-use nonce for the address. Advanced by the caller.
    pub nonce: u64,

    /// The live object the nonce was captured from.
    pub object: SharedStateObject,
}

/// Address-keyed map of [`CachedStateObject`] records.
#[derive(Debug, Default)]
pub struct StateObjectCache {
    cached: HashMap<Address, CachedStateObject>,
}

impl StateObjectCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caches `object` under `address`, capturing its current nonce, and
    /// returns the new record.
    ///
    /// A second insert for the same address replaces the prior record
    /// outright (last writer wins, no merge); records for different
    /// addresses never interfere.
    pub fn insert(&mut self, address: Address, object: SharedStateObject) -> CachedStateObject {
        let nonce = object.read().nonce();
        let record = CachedStateObject { nonce, object };
        self.cached.insert(address, record.clone());

        record
    }

    /// Looks up the cached record for `address`.
    pub fn get(&self, address: &Address) -> Option<&CachedStateObject> {
        self.cached.get(address)
    }

    /// Mutable lookup, for callers advancing the predicted nonce.
    pub fn get_mut(&mut self, address: &Address) -> Option<&mut CachedStateObject> {
        self.cached.get_mut(address)
    }
}
