//! Golden test vectors.
//!
//! Key vectors pair a private key with the checksummed address geth derives
//! for it. Checksum vectors pair raw hex with its EIP-55 form.

use kubegeth_core::{checksum, extra_data, Account, Address, ChecksummedAddress};

#[derive(Debug, Clone)]
pub struct KeyVector {
    pub name: &'static str,
    /// Hex, no prefix.
    pub private_key: &'static str,
    pub address: &'static str,
}

#[derive(Debug, Clone)]
pub struct ChecksumVector {
    /// Any casing, no prefix.
    pub raw: &'static str,
    pub checksummed: &'static str,
}

pub fn key_vectors() -> Vec<KeyVector> {
    vec![
        KeyVector {
            name: "private key 1",
            private_key: "0000000000000000000000000000000000000000000000000000000000000001",
            address: "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf",
        },
        KeyVector {
            name: "private key 2",
            private_key: "0000000000000000000000000000000000000000000000000000000000000002",
            address: "0x2B5AD5c4795c026514f8317c7a215E218DcCD6cF",
        },
        KeyVector {
            name: "private key 3",
            private_key: "0000000000000000000000000000000000000000000000000000000000000003",
            address: "0x6813Eb9362372EEF6200f3b1dbC3f819671cBA69",
        },
        KeyVector {
            name: "web3 documentation key",
            private_key: "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318",
            address: "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23",
        },
    ]
}

pub fn checksum_vectors() -> Vec<ChecksumVector> {
    vec![
        ChecksumVector {
            raw: "5aaeb6053f3e94c9b9a09f33669435e7ef1beaed",
            checksummed: "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        },
        ChecksumVector {
            raw: "fb6916095ca1df60bb79ce92ce3ea74c37c5d359",
            checksummed: "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        },
        ChecksumVector {
            raw: "dbf03b407c01e7cd3cbea99509d93f8dddc8c6fb",
            checksummed: "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        },
        ChecksumVector {
            raw: "D1220A0CF47C7B9BE7A2E6BA89F429762E7B9ADB",
            checksummed: "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
        },
        ChecksumVector {
            raw: "52908400098527886e0f7030069857d2e4169ee7",
            checksummed: "0x52908400098527886E0F7030069857D2E4169EE7",
        },
        ChecksumVector {
            raw: "de709f2102306220921060314715629080e2fb77",
            checksummed: "0xde709f2102306220921060314715629080e2fb77",
        },
        ChecksumVector {
            raw: "1234567890abcdef1234567890abcdef1234abcd",
            checksummed: "0x1234567890AbCdef1234567890abCDEf1234abCd",
        },
    ]
}

/// `extraData` for the single signer `0x1234567890AbCdef1234567890abCDEf1234abCd`.
pub fn extra_data_vector() -> (ChecksummedAddress, String) {
    let signer = ChecksummedAddress::parse("0x1234567890AbCdef1234567890abCDEf1234abCd")
        .expect("vector is a valid checksummed address");
    let expected = format!(
        "0x{}{}{}",
        "00".repeat(32),
        "1234567890AbCdef1234567890abCDEf1234abCd",
        "00".repeat(65)
    );
    (signer, expected)
}

/// Check every vector, returning a description of each mismatch.
pub fn verify_all_vectors() -> Vec<String> {
    let mut failures = Vec::new();

    for v in key_vectors() {
        match Account::from_private_key_hex(v.private_key) {
            Ok(account) => {
                let got = account.checksummed_address();
                if got.as_str() != v.address {
                    failures.push(format!("{}: got {got}, expected {}", v.name, v.address));
                }
            }
            Err(e) => failures.push(format!("{}: {e}", v.name)),
        }
    }

    for v in checksum_vectors() {
        match Address::from_hex(v.raw) {
            Ok(address) => {
                let got = checksum(&address);
                if got.as_str() != v.checksummed {
                    failures.push(format!("{}: got {got}, expected {}", v.raw, v.checksummed));
                }
            }
            Err(e) => failures.push(format!("{}: {e}", v.raw)),
        }
    }

    let (signer, expected) = extra_data_vector();
    if extra_data(&signer) != expected {
        failures.push(format!("extraData for {signer} mismatched"));
    }

    failures
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_vectors_pass() {
        let failures = verify_all_vectors();
        assert!(failures.is_empty(), "{failures:#?}");
    }

    #[test]
    fn test_checksummed_vectors_parse_strictly() {
        for v in checksum_vectors() {
            assert!(ChecksummedAddress::parse(v.checksummed).is_ok(), "{}", v.checksummed);
        }
    }

    #[test]
    fn test_private_keys_are_hex() {
        for v in key_vectors() {
            assert_eq!(hex::decode(v.private_key).unwrap().len(), 32);
        }
    }
}
