//! The per-address account/contract entity.
//!
//! A [`StateObject`] is a pure data holder: balance and nonce arithmetic is
//! exact but unvalidated here (sufficiency and overflow policy belong to the
//! transaction-validation layer above), and storage/code reads are total
//! functions with default-zero semantics.

use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use log::trace;

use crate::{
    codec::{AccountRecord, MalformedRecord},
    store::{StateDb, StateResult, StoreResult, Trie},
};

/// An account or contract, keyed by its 160-bit address.
///
/// The address is fixed at construction and never reassigned. Contracts
/// additionally carry bytecode and a private storage namespace backed by a
/// dedicated sub-trie whose root digest becomes part of the serialized
/// account record (the two-level trie: addresses at the top, per-account
/// storage slots below).
#[derive(Debug)]
pub struct StateObject {
    address: Address,
    balance: U256,
    nonce: u64,
    storage: Option<Trie>,
    code: Bytes,
    init_code: Bytes,
}

impl StateObject {
    /// Constructs a plain account with no code and no storage namespace.
    pub fn new_account(address: Address, balance: U256) -> Self {
        Self {
            address,
            balance,
            nonce: 0,
            storage: None,
            code: Bytes::new(),
            init_code: Bytes::new(),
        }
    }

    /// Constructs a contract whose storage sub-trie is rooted at
    /// `storage_root` (the empty root for a brand-new contract), backed by
    /// the shared node database.
    pub fn new_contract(
        address: Address,
        balance: U256,
        storage_root: H256,
        db: &StateDb,
    ) -> StoreResult<Self> {
        Ok(Self {
            address,
            balance,
            nonce: 0,
            storage: Some(db.trie_at(storage_root)?),
            code: Bytes::new(),
            init_code: Bytes::new(),
        })
    }

    /// Reconstructs an entity from its persisted record.
    ///
    /// The address is supplied by the caller since it is the state trie key
    /// the record was found under, not part of the record itself. A decoded
    /// storage root is reopened as a sub-trie over the same shared database.
    pub fn from_bytes(address: Address, bytes: &[u8], db: &StateDb) -> StateResult<Self> {
        let record = AccountRecord::decode(bytes)?;

        let storage = match record.storage_root {
            Some(root) => Some(db.trie_at(root)?),
            None => None,
        };

        Ok(Self {
            address,
            balance: record.balance,
            nonce: record.nonce,
            storage,
            code: record.code,
            init_code: Bytes::new(),
        })
    }

    /// The account's address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// The account's balance.
    pub const fn balance(&self) -> U256 {
        self.balance
    }

    /// The account's nonce.
    pub const fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The contract bytecode. Empty for plain accounts.
    pub fn code(&self) -> &Bytes {
        &self.code
    }

    /// The construction-time initialization code.
    ///
    /// Not part of the persisted record, so it is only populated on freshly
    /// created contracts.
    pub fn init_code(&self) -> &Bytes {
        &self.init_code
    }

    /// Installs the contract bytecode. Set once at contract creation.
    pub fn set_code(&mut self, code: Bytes) {
        self.code = code;
    }

    /// Installs the initialization code. Set once at contract creation.
    pub fn set_init_code(&mut self, init_code: Bytes) {
        self.init_code = init_code;
    }

    /// Reads the storage slot `key`.
    ///
    /// Total over default-zero semantics: a missing slot, and any slot of an
    /// account with no storage namespace, reads as zero.
    pub fn storage_get(&self, key: U256) -> StateResult<U256> {
        let Some(trie) = self.storage.as_ref() else {
            return Ok(U256::zero());
        };

        let raw = trie.get(&storage_key_bytes(key))?;
        if raw.is_empty() {
            return Ok(U256::zero());
        }

        Ok(rlp::decode::<U256>(&raw).map_err(MalformedRecord::from)?)
    }

    /// Writes `value` into the storage slot `key`. Last write wins.
    ///
    /// Writes against a plain account with no storage namespace are ignored.
    pub fn storage_set(&mut self, key: U256, value: U256) -> StoreResult<()> {
        trace!("Storage write at slot {} of {:x}", key, self.address);

        match self.storage.as_mut() {
            Some(trie) => trie.update(&storage_key_bytes(key), &rlp::encode(&value)),
            None => Ok(()),
        }
    }

    /// Reads a storage entry under a caller-encoded key, returning the raw
    /// stored bytes (empty on miss).
    pub fn storage_get_raw(&self, key: &[u8]) -> StoreResult<Vec<u8>> {
        match self.storage.as_ref() {
            Some(trie) => trie.get(key),
            None => Ok(Vec::new()),
        }
    }

    /// Writes raw bytes under a caller-encoded storage key.
    ///
    /// Writes against a plain account with no storage namespace are ignored.
    pub fn storage_set_raw(&mut self, key: &[u8], value: &[u8]) -> StoreResult<()> {
        match self.storage.as_mut() {
            Some(trie) => trie.update(key, value),
            None => Ok(()),
        }
    }

    /// Fetches the code byte at `offset`, or zero for any offset at or past
    /// the end of the code. Never faults: executing past the end of code is
    /// an implicit no-op.
    pub fn code_byte(&self, offset: U256) -> u8 {
        if offset >= U256::from(self.code.len()) {
            return 0;
        }

        self.code[offset.as_usize()]
    }

    /// Credits `amount` to the balance. The arithmetic is exact; sufficiency
    /// and overflow policy live in the validation layer above.
    pub fn add_balance(&mut self, amount: U256) {
        self.balance += amount;
    }

    /// Debits `amount` from the balance. The caller guards sufficiency.
    pub fn sub_balance(&mut self, amount: U256) {
        self.balance -= amount;
    }

    /// Returns unspent gas to the account after metered execution.
    ///
    /// Same contract as [`Self::add_balance`]; it exists as a named
    /// operation for the post-execution call site.
    pub fn return_gas(&mut self, amount: U256) {
        self.add_balance(amount);
    }

    /// Advances the nonce by one. The nonce only ever increments.
    pub fn increment_nonce(&mut self) {
        self.nonce += 1;
    }

    /// Current root digest of the storage sub-trie, or `None` for a plain
    /// account. Recomputed from the sub-trie's contents, so identical
    /// contents always reproduce the identical root.
    pub fn storage_root(&mut self) -> StoreResult<Option<H256>> {
        self.storage.as_mut().map(Trie::root).transpose()
    }

    /// Serializes the entity into its canonical 4-field persisted record.
    ///
    /// Takes `&mut self` because the storage root must be recomputed if
    /// storage was mutated since the last commit.
    pub fn serialize(&mut self) -> StoreResult<Bytes> {
        let storage_root = self.storage_root()?;

        Ok(AccountRecord {
            balance: self.balance,
            nonce: self.nonce,
            storage_root,
            code: self.code.clone(),
        }
        .encode())
    }
}

/// Fixed-width big-endian encoding of a storage slot key.
fn storage_key_bytes(key: U256) -> [u8; 32] {
    let mut buf = [0u8; 32];
    key.to_big_endian(&mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use ethereum_types::{Address, U256};
    use hex_literal::hex;
    use keccak_hash::KECCAK_NULL_RLP;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::StateObject;
    use crate::{
        store::StateDb,
        testing_utils::{addr, common_setup},
    };

    fn fresh_contract(db: &StateDb) -> StateObject {
        StateObject::new_contract(addr(0xcc), U256::from(500), KECCAK_NULL_RLP, db).unwrap()
    }

    #[test]
    fn fresh_contract_storage_reads_zero() {
        common_setup();

        let db = StateDb::new();
        let contract = fresh_contract(&db);

        for key in [U256::zero(), U256::one(), U256::MAX, U256::from(1) << 200] {
            assert_eq!(contract.storage_get(key).unwrap(), U256::zero());
        }
    }

    #[test]
    fn storage_write_then_read() {
        common_setup();

        let db = StateDb::new();
        let mut contract = fresh_contract(&db);

        contract.storage_set(U256::from(1), U256::from(99)).unwrap();
        assert_eq!(contract.storage_get(U256::from(1)).unwrap(), U256::from(99));

        // Unrelated writes must not disturb the slot.
        let mut rng = StdRng::seed_from_u64(0xACC7);
        for _ in 0..50 {
            let key = U256::from(rng.gen::<u64>()) + U256::from(2);
            contract.storage_set(key, U256::from(rng.gen::<u64>())).unwrap();
        }
        assert_eq!(contract.storage_get(U256::from(1)).unwrap(), U256::from(99));

        // Last write wins.
        contract.storage_set(U256::from(1), U256::from(7)).unwrap();
        assert_eq!(contract.storage_get(U256::from(1)).unwrap(), U256::from(7));
    }

    #[test]
    fn plain_account_storage_is_inert() {
        common_setup();

        let mut account = StateObject::new_account(addr(0xaa), U256::zero());

        account.storage_set(U256::one(), U256::from(5)).unwrap();
        assert_eq!(account.storage_get(U256::one()).unwrap(), U256::zero());
        assert!(account.storage_get_raw(b"anything").unwrap().is_empty());
    }

    #[test]
    fn raw_storage_round_trips() {
        common_setup();

        let db = StateDb::new();
        let mut contract = fresh_contract(&db);

        contract.storage_set_raw(b"named-slot", b"payload").unwrap();
        assert_eq!(contract.storage_get_raw(b"named-slot").unwrap(), b"payload");
    }

    #[test]
    fn code_byte_is_zero_past_end() {
        common_setup();

        let db = StateDb::new();
        let mut contract = fresh_contract(&db);
        contract.set_code(Bytes::copy_from_slice(&hex!("abcd12")));

        assert_eq!(contract.code_byte(U256::zero()), 0xab);
        assert_eq!(contract.code_byte(U256::one()), 0xcd);
        assert_eq!(contract.code_byte(U256::from(2)), 0x12);

        assert_eq!(contract.code_byte(U256::from(3)), 0);
        assert_eq!(contract.code_byte(U256::MAX), 0);
    }

    #[test]
    fn balance_arithmetic_is_exact() {
        common_setup();

        let mut account = StateObject::new_account(addr(0x01), U256::from(100));

        account.add_balance(U256::from(50));
        assert_eq!(account.balance(), U256::from(150));

        account.sub_balance(U256::from(120));
        assert_eq!(account.balance(), U256::from(30));

        account.return_gas(U256::from(5));
        assert_eq!(account.balance(), U256::from(35));
    }

    #[test]
    fn nonce_only_increments() {
        common_setup();

        let mut account = StateObject::new_account(addr(0x02), U256::zero());
        assert_eq!(account.nonce(), 0);

        for expected in 1..=5 {
            account.increment_nonce();
            assert_eq!(account.nonce(), expected);
        }
    }

    #[test]
    fn serialize_round_trips_through_from_bytes() {
        common_setup();

        let db = StateDb::new();
        let mut contract = fresh_contract(&db);
        contract.set_code(Bytes::copy_from_slice(&hex!("6000")));
        contract.increment_nonce();
        contract.storage_set(U256::from(3), U256::from(4)).unwrap();

        let encoded = contract.serialize().unwrap();
        let mut restored =
            StateObject::from_bytes(contract.address(), &encoded, &db).unwrap();

        assert_eq!(restored.address(), contract.address());
        assert_eq!(restored.balance(), contract.balance());
        assert_eq!(restored.nonce(), contract.nonce());
        assert_eq!(restored.code(), contract.code());
        assert_eq!(
            restored.storage_root().unwrap(),
            contract.storage_root().unwrap()
        );
        assert_eq!(restored.storage_get(U256::from(3)).unwrap(), U256::from(4));
    }

    #[test]
    fn plain_account_round_trips_without_storage() {
        common_setup();

        let db = StateDb::new();
        let mut account = StateObject::new_account(addr(0x0b), U256::from(42));

        let encoded = account.serialize().unwrap();
        let mut restored = StateObject::from_bytes(account.address(), &encoded, &db).unwrap();

        assert_eq!(restored.balance(), U256::from(42));
        assert_eq!(restored.storage_root().unwrap(), None);
    }

    #[test]
    fn identical_storage_contents_reproduce_identical_roots() {
        common_setup();

        let db = StateDb::new();
        let mut first = fresh_contract(&db);
        let mut second = StateObject::new_contract(
            Address::repeat_byte(0xdd),
            U256::zero(),
            KECCAK_NULL_RLP,
            &db,
        )
        .unwrap();

        let entries: Vec<(u64, u64)> = vec![(1, 10), (2, 20), (300, 3000)];
        for (k, v) in &entries {
            first.storage_set(U256::from(*k), U256::from(*v)).unwrap();
        }
        for (k, v) in entries.iter().rev() {
            second.storage_set(U256::from(*k), U256::from(*v)).unwrap();
        }

        assert_eq!(
            first.storage_root().unwrap(),
            second.storage_root().unwrap()
        );
    }
}
