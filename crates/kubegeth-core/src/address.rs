//! 20-byte account addresses and their EIP-55 checksummed form.
//!
//! The checksum is carried entirely in the letter casing of the hex digits:
//! digit `i` of the lowercase address is uppercased when hex digit `i` of
//! `keccak256(lowercase_hex)` is 8 or more. Positions run over the whole
//! 40-digit string, not over byte pairs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::error::{CoreError, Result};

/// Compute the Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// A raw 20-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Length of an address in bytes.
    pub const LEN: usize = 20;

    /// The all-zero address (used as the genesis `coinbase`).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Derive the address of a 64-byte uncompressed public key (no `0x04` tag):
    /// the low-order 20 bytes of its Keccak-256 hash.
    pub fn derive(public_key: &[u8; 64]) -> Self {
        let hash = keccak256(public_key);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }

    /// Lowercase hex, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse hex with or without a `0x` prefix. Case is ignored.
    pub fn from_hex(s: &str) -> Result<Self> {
        let digits = strip_prefix(s);
        if digits.len() != Self::LEN * 2 {
            return Err(CoreError::InvalidAddress(format!(
                "expected {} hex digits, got {}",
                Self::LEN * 2,
                digits.len()
            )));
        }
        let bytes = hex::decode(digits).map_err(|e| CoreError::InvalidAddress(e.to_string()))?;
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    /// The checksummed representation of this address.
    pub fn checksum(&self) -> ChecksummedAddress {
        checksum(self)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.checksum())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.checksum(), f)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.checksum().as_str())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ChecksummedAddress::parse(&s)
            .map(|c| c.address())
            .map_err(serde::de::Error::custom)
    }
}

/// A `0x`-prefixed, EIP-55 mixed-case address string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChecksummedAddress {
    text: String,
    address: Address,
}

impl ChecksummedAddress {
    /// Parse an address string, enforcing the checksum.
    ///
    /// Mixed-case input must match the checksum casing exactly. All-lowercase
    /// or all-uppercase input carries no checksum and is accepted.
    pub fn parse(s: &str) -> Result<Self> {
        let address = Address::from_hex(s)?;
        let expected = address.checksum();

        let digits = strip_prefix(s);
        let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && digits != expected.without_prefix() {
            return Err(CoreError::ChecksumMismatch {
                expected: expected.text,
                actual: s.to_string(),
            });
        }

        Ok(expected)
    }

    /// The full string, including the `0x` prefix.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The 40 hex digits without the `0x` prefix.
    pub fn without_prefix(&self) -> &str {
        &self.text[2..]
    }

    /// The raw bytes; the same as decoding the string case-insensitively.
    pub fn address(&self) -> Address {
        self.address
    }
}

impl fmt::Debug for ChecksummedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChecksummedAddress({})", self.text)
    }
}

impl fmt::Display for ChecksummedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for ChecksummedAddress {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl Serialize for ChecksummedAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for ChecksummedAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Compute the EIP-55 checksummed form of an address.
pub fn checksum(address: &Address) -> ChecksummedAddress {
    let lower = address.to_hex();
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }

    ChecksummedAddress {
        text: out,
        address: *address,
    }
}

fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_checksum_known_vector() {
        let addr = Address::from_hex("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(
            addr.checksum().as_str(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn test_parse_rejects_bad_casing() {
        // Valid checksum with the case of one letter flipped.
        let err = ChecksummedAddress::parse("0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert!(matches!(err, Err(CoreError::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_parse_accepts_uniform_case() {
        let lower = ChecksummedAddress::parse("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        let upper = ChecksummedAddress::parse("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.as_str(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }

    #[test]
    fn test_from_hex_wrong_length() {
        assert!(matches!(
            Address::from_hex("0x1234"),
            Err(CoreError::InvalidAddress(_))
        ));
        assert!(Address::from_hex(&"zz".repeat(20)).is_err());
    }

    #[test]
    fn test_serde_uses_checksummed_string() {
        let addr = Address::from_hex("fb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359\"");
        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }

    #[test]
    fn test_zero_address() {
        assert_eq!(
            Address::ZERO.checksum().as_str(),
            "0x0000000000000000000000000000000000000000"
        );
    }

    proptest! {
        #[test]
        fn checksum_lowercases_to_plain_hex(bytes in any::<[u8; 20]>()) {
            let addr = Address(bytes);
            let checksummed = addr.checksum();
            prop_assert_eq!(checksummed.as_str().to_lowercase(), format!("0x{}", addr.to_hex()));
        }

        #[test]
        fn checksum_is_deterministic(bytes in any::<[u8; 20]>()) {
            prop_assert_eq!(checksum(&Address(bytes)), checksum(&Address(bytes)));
        }

        #[test]
        fn checksummed_parses_back(bytes in any::<[u8; 20]>()) {
            let checksummed = Address(bytes).checksum();
            let parsed = ChecksummedAddress::parse(checksummed.as_str()).unwrap();
            prop_assert_eq!(parsed.address(), Address(bytes));
        }
    }
}
