//! Per-address account and contract state for an Ethereum-style ledger.
//!
//! The crate models the canonical in-memory representation of an account
//! ([`StateObject`][state_object::StateObject]), its deterministic persisted
//! encoding ([`AccountRecord`][codec::AccountRecord]), the address-keyed state
//! view backed by a content-addressed trie ([`State`][state::State]), a
//! pre-commit nonce cache ([`StateObjectCache`][cache::StateObjectCache]), and
//! the contract-creation transition
//! ([`create_contract`][create::create_contract]).
//!
//! The trie itself is an external collaborator (the [`eth_trie`] crate); the
//! rest of the crate only ever touches it through the narrow get/update/root
//! seam in [`store`].

#![deny(rustdoc::broken_intra_doc_links)]
#![deny(missing_debug_implementations)]
#![deny(missing_docs)]

pub mod cache;
pub mod codec;
pub mod create;
pub mod state;
pub mod state_object;
pub mod store;
pub mod transaction;

#[cfg(test)]
pub(crate) mod testing_utils;
