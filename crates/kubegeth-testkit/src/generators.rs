//! Proptest generators for property-based testing.

use proptest::prelude::*;

use kubegeth_core::{Account, Address};

/// A valid secp256k1 private key.
///
/// The top byte is capped below `0xff`, which keeps every value under the
/// curve order.
pub fn private_key() -> impl Strategy<Value = [u8; 32]> {
    (0u8..0xff, any::<[u8; 31]>())
        .prop_filter("zero is not a valid key", |(hi, rest)| {
            *hi != 0 || rest.iter().any(|b| *b != 0)
        })
        .prop_map(|(hi, rest)| {
            let mut key = [0u8; 32];
            key[0] = hi;
            key[1..].copy_from_slice(&rest);
            key
        })
}

pub fn account() -> impl Strategy<Value = Account> {
    private_key().prop_map(|key| Account::from_private_key(&key).expect("key is in range"))
}

pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Between `1` and `max` distinct accounts.
pub fn accounts(max: usize) -> impl Strategy<Value = Vec<Account>> {
    prop::collection::btree_set(private_key(), 1..=max).prop_map(|keys| {
        keys.iter()
            .map(|k| Account::from_private_key(k).expect("key is in range"))
            .collect()
    })
}

/// A DNS-1123 label usable as a network name.
pub fn network_name() -> impl Strategy<Value = String> {
    "[a-z0-9]([a-z0-9-]{0,30}[a-z0-9])?"
}
