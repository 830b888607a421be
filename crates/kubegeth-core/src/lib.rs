//! # kubegeth core
//!
//! Pure primitives for provisioning a geth clique test network: secp256k1
//! accounts, EIP-55 checksummed addresses, the genesis document, and
//! per-account credentials.
//!
//! This crate performs no I/O. Randomness is always passed in by the caller
//! and must be a `CryptoRng`.
//!
//! ## Key Types
//!
//! - [`Account`] - private key, public key and derived address
//! - [`Address`] / [`ChecksummedAddress`] - raw and mixed-case forms
//! - [`GenesisState`] - the genesis document, built by [`build_genesis`]
//! - [`CredentialBundle`] - address, private key and password for one account
//!
//! ## Usage
//!
//! ```rust
//! use kubegeth_core::{build_genesis, generate_accounts, GenesisParams};
//! use rand::rngs::OsRng;
//!
//! let accounts = generate_accounts(3, &mut OsRng).unwrap();
//! let genesis = build_genesis(&accounts, &GenesisParams::default()).unwrap();
//! assert_eq!(genesis.alloc.len(), 3);
//! ```

pub mod address;
pub mod credentials;
pub mod error;
pub mod genesis;
pub mod keys;

pub use address::{checksum, keccak256, Address, ChecksummedAddress};
pub use credentials::{generate_password, CredentialBundle, PASSWORD_LENGTH};
pub use error::{CoreError, Result};
pub use genesis::{
    build_genesis, extra_data, AllocEntry, GenesisParams, GenesisState, EXTRA_DATA_LEN,
    INITIAL_BALANCE,
};
pub use keys::{generate_account, generate_accounts, Account, PublicKey};
