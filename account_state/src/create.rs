//! The contract-creation state transition.

use keccak_hash::KECCAK_NULL_RLP;
use log::debug;

use crate::{
    state::State,
    state_object::StateObject,
    store::StateResult,
    transaction::Transaction,
};

/// Runs the contract-creation transition for `tx` against `state`.
///
/// A transaction with an explicit recipient creates nothing and yields
/// `None`. Otherwise a contract account is constructed at the address
/// derived from the transaction's content hash, funded with the transferred
/// value, given an empty storage sub-trie, the transaction's payload as code
/// and its initialization payload as init code, and persisted once under its
/// address key.
pub fn create_contract(tx: &Transaction, state: &mut State) -> StateResult<Option<StateObject>> {
    if !tx.is_contract_creation() {
        return Ok(None);
    }

    let address = tx.contract_address();
    debug!("Creating contract at {:x}", address);

    let mut contract = StateObject::new_contract(address, tx.value, KECCAK_NULL_RLP, state.db())?;
    contract.set_code(tx.data.clone());
    contract.set_init_code(tx.init.clone());
    state.update_object(&mut contract)?;

    Ok(Some(contract))
}
