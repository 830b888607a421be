//! Local site bootstrap: credentials, genesis and a kustomization on disk.
//!
//! Layout under the site root:
//!
//! ```text
//! secrets/account/<i>/{address,private_key,password}
//! secrets/ethstats/password
//! genesis.json
//! kustomization.yaml
//! ```
//!
//! Directories are created owner-only (0700) and files owner-read/write
//! (0600) on unix.

use std::fs::{self, DirBuilder, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use kubegeth_core::{
    build_genesis, generate_accounts, generate_password, ChecksummedAddress, CredentialBundle,
    GenesisParams, PASSWORD_LENGTH,
};
use rand::{CryptoRng, RngCore};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::SiteError;
use crate::manifests::{CONFIG_NAME, GENESIS_KEY, SECRET_NAME};

/// Default number of accounts in a site.
pub const DEFAULT_SITE_ACCOUNTS: usize = 3;

pub const KUSTOMIZATION_FILE: &str = "kustomization.yaml";
pub const ETHSTATS_SECRET_NAME: &str = "ethstats-secret";

/// What [`bootstrap_site`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteOutcome {
    /// A new site was written; accounts are listed signer first.
    Created { accounts: Vec<ChecksummedAddress> },
    /// `genesis.json` was already there; nothing was touched.
    AlreadyPresent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Kustomization {
    api_version: &'static str,
    kind: &'static str,
    config_map_generator: Vec<Generator>,
    secret_generator: Vec<Generator>,
}

#[derive(Debug, Serialize)]
struct Generator {
    name: &'static str,
    files: Vec<String>,
    options: GeneratorOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeneratorOptions {
    disable_name_suffix_hash: bool,
}

impl Generator {
    fn new(name: &'static str, files: Vec<String>) -> Self {
        Self {
            name,
            files,
            options: GeneratorOptions {
                disable_name_suffix_hash: true,
            },
        }
    }
}

fn kustomization() -> Kustomization {
    let signer_files = ["address", "private_key", "password"]
        .iter()
        .map(|f| format!("./secrets/account/0/{f}"))
        .collect();

    Kustomization {
        api_version: "kustomize.config.k8s.io/v1beta1",
        kind: "Kustomization",
        config_map_generator: vec![Generator::new(CONFIG_NAME, vec![GENESIS_KEY.to_string()])],
        secret_generator: vec![
            Generator::new(SECRET_NAME, signer_files),
            Generator::new(
                ETHSTATS_SECRET_NAME,
                vec!["./secrets/ethstats/password".to_string()],
            ),
        ],
    }
}

/// Write a fresh site under `root` with `accounts` accounts.
///
/// Does nothing if `root/genesis.json` exists. Accounts and the genesis are
/// generated before anything is written.
pub fn bootstrap_site<R>(
    root: &Path,
    accounts: usize,
    params: &GenesisParams,
    rng: &mut R,
) -> Result<SiteOutcome, SiteError>
where
    R: RngCore + CryptoRng,
{
    let genesis_path = root.join(GENESIS_KEY);
    if genesis_path.exists() {
        info!(path = %genesis_path.display(), "genesis.json already created");
        return Ok(SiteOutcome::AlreadyPresent);
    }

    let generated = generate_accounts(accounts, rng)?;
    let genesis = build_genesis(&generated, params)?;

    let account_root = root.join("secrets").join("account");
    for (index, account) in generated.iter().enumerate() {
        let dir = account_root.join(index.to_string());
        create_private_dir(&dir)?;

        let bundle = CredentialBundle::materialize(account, rng);
        for (key, value) in bundle.entries() {
            write_private(&dir.join(key), value.as_bytes())?;
        }
        info!(index, address = %bundle.address(), "created account");
    }

    let ethstats = root.join("secrets").join("ethstats");
    create_private_dir(&ethstats)?;
    let password = generate_password(rng, PASSWORD_LENGTH);
    write_private(&ethstats.join("password"), password.as_bytes())?;
    debug!("created ethstats password");

    write_private(&genesis_path, genesis.to_json_pretty()?.as_bytes())?;
    info!(path = %genesis_path.display(), "created genesis.json");

    let kustomization_path = root.join(KUSTOMIZATION_FILE);
    let kustomization = serde_json::to_vec(&kustomization())?;
    write_private(&kustomization_path, &kustomization)?;
    info!(path = %kustomization_path.display(), "created kustomization.yaml");

    Ok(SiteOutcome::Created {
        accounts: generated.iter().map(|a| a.checksummed_address()).collect(),
    })
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SiteError {
    let path: PathBuf = path.to_path_buf();
    move |source| SiteError::Io { path, source }
}

fn create_private_dir(path: &Path) -> Result<(), SiteError> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path).map_err(io_error(path))?;

    // `mode` only applies when the directory is created.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o700)).map_err(io_error(path))?;
    }
    Ok(())
}

/// Write `contents` to `path`, readable by the owner only.
fn write_private(path: &Path, contents: &[u8]) -> Result<(), SiteError> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(io_error(path))?;
    file.write_all(contents).map_err(io_error(path))?;

    // `mode` only applies when the file is created.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(io_error(path))?;
    }
    Ok(())
}
