//! Per-account secret material.
//!
//! A [`CredentialBundle`] holds the three values a signer node needs: its
//! address, its private key, and the password protecting its keystore.
//! Where they end up (files, a cluster secret) is the caller's business.

use rand::distributions::Alphanumeric;
use rand::{CryptoRng, Rng, RngCore};
use std::fmt;
use zeroize::Zeroizing;

use crate::address::ChecksummedAddress;
use crate::keys::Account;

/// Length of generated passwords.
pub const PASSWORD_LENGTH: usize = 20;

/// Key names used for each credential value.
pub const ADDRESS_KEY: &str = "address";
pub const PRIVATE_KEY_KEY: &str = "private_key";
pub const PASSWORD_KEY: &str = "password";

/// Generate an alphanumeric password of `len` characters.
///
/// The `CryptoRng` bound keeps non-cryptographic generators out of
/// credential material.
pub fn generate_password<R: RngCore + CryptoRng>(rng: &mut R, len: usize) -> Zeroizing<String> {
    Zeroizing::new(
        rng.sample_iter(&Alphanumeric)
            .take(len)
            .map(char::from)
            .collect(),
    )
}

/// Address, private key and password for one account.
#[derive(Clone)]
pub struct CredentialBundle {
    address: ChecksummedAddress,
    private_key: Zeroizing<String>,
    password: Zeroizing<String>,
}

impl CredentialBundle {
    /// Pair `account` with a freshly generated password.
    pub fn materialize<R: RngCore + CryptoRng>(account: &Account, rng: &mut R) -> Self {
        Self {
            address: account.checksummed_address(),
            private_key: account.private_key_hex(),
            password: generate_password(rng, PASSWORD_LENGTH),
        }
    }

    pub fn address(&self) -> &ChecksummedAddress {
        &self.address
    }

    /// Hex private key, no prefix.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// The three values keyed by their storage names, in a fixed order.
    pub fn entries(&self) -> [(&'static str, &str); 3] {
        [
            (ADDRESS_KEY, self.address.as_str()),
            (PRIVATE_KEY_KEY, self.private_key()),
            (PASSWORD_KEY, self.password()),
        ]
    }
}

impl fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialBundle")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
