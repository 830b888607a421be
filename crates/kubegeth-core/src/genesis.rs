//! Clique proof-of-authority genesis documents.
//!
//! The layout of `extraData` is fixed by clique: 32 bytes of vanity, then
//! the concatenated 20-byte signer addresses, then 65 bytes reserved for the
//! seal. Genesis files with any other padding are rejected by the client.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::address::{Address, ChecksummedAddress};
use crate::error::{CoreError, Result};
use crate::keys::Account;

/// 1,000,000 ether (10^24 wei) in hex.
pub const INITIAL_BALANCE: &str = "0xD3C21BCECCEDA1000000";

/// Leading zero bytes in `extraData`.
pub const EXTRA_VANITY_LEN: usize = 32;

/// Trailing zero bytes in `extraData`.
pub const EXTRA_SEAL_LEN: usize = 65;

/// Total `extraData` length in bytes for a single signer.
pub const EXTRA_DATA_LEN: usize = EXTRA_VANITY_LEN + Address::LEN + EXTRA_SEAL_LEN;

/// Tunable genesis parameters. Defaults match the reference test network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisParams {
    pub chain_id: u64,
    /// Seconds between blocks.
    pub clique_period: u64,
    /// Blocks between signer checkpoints.
    pub clique_epoch: u64,
    pub timestamp: u64,
    pub gas_limit: u64,
}

impl Default for GenesisParams {
    fn default() -> Self {
        Self {
            chain_id: 1213,
            clique_period: 3,
            clique_epoch: 30000,
            timestamp: 0x5b00_7880,
            gas_limit: 0x5f_dfb1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub chain_id: u64,
    pub clique: CliqueConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliqueConfig {
    pub period: u64,
    pub epoch: u64,
}

/// A prefunded account entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocEntry {
    pub balance: String,
}

/// The genesis document consumed by geth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenesisState {
    pub config: ChainConfig,
    pub nonce: String,
    pub timestamp: String,
    pub extra_data: String,
    pub gas_limit: String,
    pub difficulty: String,
    pub mix_hash: String,
    pub coinbase: Address,
    pub alloc: BTreeMap<ChecksummedAddress, AllocEntry>,
}

impl GenesisState {
    /// Compact JSON, as embedded in the cluster config object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON, as written to `genesis.json`.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// The signer address embedded in `extraData`.
    pub fn signer(&self) -> Result<Address> {
        let digits = self
            .extra_data
            .strip_prefix("0x")
            .ok_or_else(|| CoreError::InvalidInput("extraData missing 0x prefix".into()))?;
        if digits.len() != EXTRA_DATA_LEN * 2 {
            return Err(CoreError::InvalidInput(format!(
                "extraData is {} hex digits, expected {}",
                digits.len(),
                EXTRA_DATA_LEN * 2
            )));
        }
        let start = EXTRA_VANITY_LEN * 2;
        Address::from_hex(&digits[start..start + Address::LEN * 2])
    }
}

/// Encode the clique `extraData` for a single signer.
pub fn extra_data(signer: &ChecksummedAddress) -> String {
    format!(
        "0x{}{}{}",
        "00".repeat(EXTRA_VANITY_LEN),
        signer.without_prefix(),
        "00".repeat(EXTRA_SEAL_LEN)
    )
}

/// Build the genesis for `accounts`.
///
/// `accounts[0]` becomes the clique signer. Every account, the signer
/// included, is funded with [`INITIAL_BALANCE`].
pub fn build_genesis(accounts: &[Account], params: &GenesisParams) -> Result<GenesisState> {
    let signer = accounts
        .first()
        .ok_or_else(|| CoreError::InvalidInput("genesis requires at least one account".into()))?;

    let mut alloc = BTreeMap::new();
    for account in accounts {
        let entry = AllocEntry {
            balance: INITIAL_BALANCE.to_string(),
        };
        if alloc.insert(account.checksummed_address(), entry).is_some() {
            return Err(CoreError::InvalidInput(format!(
                "duplicate account {}",
                account.address()
            )));
        }
    }

    Ok(GenesisState {
        config: ChainConfig {
            chain_id: params.chain_id,
            clique: CliqueConfig {
                period: params.clique_period,
                epoch: params.clique_epoch,
            },
        },
        nonce: "0x0".to_string(),
        timestamp: format!("{:#x}", params.timestamp),
        extra_data: extra_data(&signer.checksummed_address()),
        gas_limit: format!("{:#x}", params.gas_limit),
        difficulty: "0x1".to_string(),
        mix_hash: format!("0x{}", "00".repeat(32)),
        coinbase: Address::ZERO,
        alloc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::keys::generate_accounts;

    fn accounts(n: usize) -> Vec<Account> {
        let mut rng = StdRng::seed_from_u64(n as u64);
        generate_accounts(n, &mut rng).unwrap()
    }

    #[test]
    fn test_empty_accounts_rejected() {
        let result = build_genesis(&[], &GenesisParams::default());
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_every_account_funded() {
        let accounts = accounts(4);
        let genesis = build_genesis(&accounts, &GenesisParams::default()).unwrap();
        assert_eq!(genesis.alloc.len(), 4);
        for account in &accounts {
            let entry = &genesis.alloc[&account.checksummed_address()];
            assert_eq!(entry.balance, INITIAL_BALANCE);
        }
    }

    #[test]
    fn test_signer_is_first_account() {
        let accounts = accounts(3);
        let genesis = build_genesis(&accounts, &GenesisParams::default()).unwrap();
        assert_eq!(genesis.signer().unwrap(), accounts[0].address());
        assert_eq!(genesis.coinbase, Address::ZERO);
    }

    #[test]
    fn test_extra_data_layout() {
        let signer = Address::from_hex("1234567890abcdef1234567890abcdef1234abcd").unwrap();
        let checksummed = signer.checksum();
        let encoded = extra_data(&checksummed);

        assert_eq!(encoded.len(), 2 + EXTRA_DATA_LEN * 2);
        assert_eq!(
            encoded,
            format!(
                "0x{}{}{}",
                "00".repeat(32),
                checksummed.without_prefix(),
                "00".repeat(65)
            )
        );
        assert_eq!(
            encoded.to_lowercase(),
            format!(
                "0x{}1234567890abcdef1234567890abcdef1234abcd{}",
                "00".repeat(32),
                "00".repeat(65)
            )
        );
    }

    #[test]
    fn test_duplicate_accounts_rejected() {
        let account = accounts(1).remove(0);
        let result = build_genesis(&[account.clone(), account], &GenesisParams::default());
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn test_json_field_names() {
        let genesis = build_genesis(&accounts(1), &GenesisParams::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&genesis.to_json().unwrap()).unwrap();

        assert_eq!(value["config"]["chainId"], 1213);
        assert_eq!(value["config"]["clique"]["period"], 3);
        assert_eq!(value["config"]["clique"]["epoch"], 30000);
        assert_eq!(value["nonce"], "0x0");
        assert_eq!(value["timestamp"], "0x5b007880");
        assert_eq!(value["gasLimit"], "0x5fdfb1");
        assert_eq!(value["difficulty"], "0x1");
        assert_eq!(value["mixHash"], format!("0x{}", "0".repeat(64)));
        assert_eq!(value["coinbase"], format!("0x{}", "0".repeat(40)));
        assert!(value["extraData"].is_string());
    }

    #[test]
    fn test_json_roundtrip() {
        let genesis = build_genesis(&accounts(2), &GenesisParams::default()).unwrap();
        let back = GenesisState::from_json(&genesis.to_json_pretty().unwrap()).unwrap();
        assert_eq!(back, genesis);
    }
}
