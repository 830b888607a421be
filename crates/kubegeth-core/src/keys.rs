//! secp256k1 accounts.
//!
//! Wraps k256's `SecretKey` with the derived 64-byte public key and the
//! Keccak-256 address.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::SecretKey;
use rand::{CryptoRng, RngCore};
use std::fmt;
use zeroize::Zeroizing;

use crate::address::{Address, ChecksummedAddress};
use crate::error::{CoreError, Result};

/// Redraws allowed before giving up on the entropy source. A healthy source
/// lands outside `[1, n)` with probability below 2^-127 per draw.
const MAX_SCALAR_DRAWS: usize = 16;

/// A 64-byte uncompressed secp256k1 public key without the `0x04` tag.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 64]);

impl PublicKey {
    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The address this key controls.
    pub fn address(&self) -> Address {
        Address::derive(&self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// A network account: private scalar, public key and address.
///
/// Fields are derived once at construction and never change.
#[derive(Clone)]
pub struct Account {
    secret: SecretKey,
    public_key: PublicKey,
    address: Address,
}

impl Account {
    /// Generate a new account from a cryptographically secure source.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Self> {
        let mut scalar = Zeroizing::new([0u8; 32]);
        for _ in 0..MAX_SCALAR_DRAWS {
            rng.try_fill_bytes(scalar.as_mut())
                .map_err(|e| CoreError::Generation(e.to_string()))?;
            if let Ok(secret) = SecretKey::from_slice(scalar.as_ref()) {
                return Ok(Self::from_secret(secret));
            }
        }
        Err(CoreError::Generation(format!(
            "no valid secp256k1 scalar after {MAX_SCALAR_DRAWS} draws"
        )))
    }

    /// Rebuild an account from a 32-byte private key.
    pub fn from_private_key(bytes: &[u8; 32]) -> Result<Self> {
        let secret = SecretKey::from_slice(bytes)
            .map_err(|_| CoreError::InvalidInput("private key out of range".into()))?;
        Ok(Self::from_secret(secret))
    }

    /// Rebuild an account from a hex private key, with or without `0x`.
    pub fn from_private_key_hex(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(digits, bytes.as_mut())
            .map_err(|e| CoreError::InvalidInput(format!("private key hex: {e}")))?;
        Self::from_private_key(&bytes)
    }

    fn from_secret(secret: SecretKey) -> Self {
        let point = secret.public_key().to_encoded_point(false);
        let mut public = [0u8; 64];
        // Skip the 0x04 uncompressed tag.
        public.copy_from_slice(&point.as_bytes()[1..]);
        let public_key = PublicKey(public);
        Self {
            secret,
            address: public_key.address(),
            public_key,
        }
    }

    /// The raw private scalar.
    pub fn private_key(&self) -> Zeroizing<[u8; 32]> {
        let mut out = Zeroizing::new([0u8; 32]);
        out.copy_from_slice(&self.secret.to_bytes());
        out
    }

    /// The private scalar as lowercase hex, no prefix.
    pub fn private_key_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.private_key().as_ref()))
    }

    /// The uncompressed public key, without the `0x04` tag.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The account address: the low 20 bytes of `keccak256(public_key)`.
    pub fn address(&self) -> Address {
        self.address
    }

    pub fn checksummed_address(&self) -> ChecksummedAddress {
        self.address.checksum()
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Account({})", self.address)
    }
}

/// Generate one account. Failure of the entropy source is fatal.
pub fn generate_account<R: RngCore + CryptoRng>(rng: &mut R) -> Result<Account> {
    Account::generate(rng)
}

/// Generate `n` accounts in order. Index 0 is the signer by convention.
pub fn generate_accounts<R: RngCore + CryptoRng>(n: usize, rng: &mut R) -> Result<Vec<Account>> {
    (0..n).map(|_| Account::generate(rng)).collect()
}
