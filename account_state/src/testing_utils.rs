use std::sync::Arc;

use ethereum_types::Address;
use parking_lot::RwLock;

use crate::{cache::SharedStateObject, state_object::StateObject};

pub(crate) fn common_setup() {
    // Try init since multiple tests calling `init` will cause an error.
    let _ = pretty_env_logger::try_init();
}

/// A test address with every byte set to `b`.
pub(crate) fn addr(b: u8) -> Address {
    Address::repeat_byte(b)
}

pub(crate) fn shared(object: StateObject) -> SharedStateObject {
    Arc::new(RwLock::new(object))
}
