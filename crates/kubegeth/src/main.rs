//! kubegeth: provision private geth networks on Kubernetes.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::rngs::OsRng;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use kubegeth::site::DEFAULT_SITE_ACCOUNTS;
use kubegeth::{bootstrap_site, network_for, Config, SiteOutcome, Variant};
use kubegeth_cluster::HttpCluster;

#[derive(Parser, Debug)]
#[command(name = "kubegeth", version)]
#[command(about = "Provision private geth clique networks and light clients on Kubernetes")]
struct Args {
    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a network, completing any missing pieces of an existing one
    Create {
        /// Network name, also used as the namespace
        #[arg(long)]
        name: String,

        /// Create a light client instead of a private network
        #[arg(long)]
        light: bool,

        /// Number of accounts to generate (overrides the config file)
        #[arg(long)]
        accounts: Option<usize>,
    },

    /// Delete a network and everything in its namespace
    Delete {
        #[arg(long)]
        name: String,

        #[arg(long)]
        light: bool,
    },

    /// Write credentials, genesis.json and a kustomization to a local directory
    Site {
        #[arg(long, default_value = "site")]
        dir: PathBuf,

        #[arg(long, default_value_t = DEFAULT_SITE_ACCOUNTS)]
        accounts: usize,
    },
}

fn variant_for(light: bool) -> Variant {
    if light {
        Variant::Light
    } else {
        Variant::Full
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;

    let (name, variant, create) = match args.command {
        Command::Site { dir, accounts } => {
            anyhow::ensure!(accounts > 0, "--accounts must be at least 1");
            let outcome = bootstrap_site(&dir, accounts, &config.network.genesis, &mut OsRng)
                .with_context(|| format!("bootstrapping site in {}", dir.display()))?;
            match outcome {
                SiteOutcome::Created { accounts } => {
                    info!(dir = %dir.display(), accounts = accounts.len(), "site created")
                }
                SiteOutcome::AlreadyPresent => info!(dir = %dir.display(), "site already present"),
            }
            return Ok(());
        }
        Command::Create {
            name,
            light,
            accounts,
        } => {
            if let Some(accounts) = accounts {
                config.network.accounts = accounts;
                config.validate().context("invalid --accounts")?;
            }
            (name, variant_for(light), true)
        }
        Command::Delete { name, light } => (name, variant_for(light), false),
    };

    let cluster_config = config.cluster.resolve().context("resolving cluster settings")?;
    let cluster = Arc::new(HttpCluster::new(&cluster_config).context("building cluster client")?);
    let network = network_for(variant, &name, cluster, config.network)?;

    if create {
        info!(network = %name, %variant, "creating");
        let report = network
            .create()
            .await
            .with_context(|| format!("creating {variant} {name:?}"))?;
        info!(network = %name, changed = report.changed(), steps = report.steps.len(), "done");
    } else {
        info!(network = %name, %variant, "deleting");
        network
            .delete()
            .await
            .with_context(|| format!("deleting {variant} {name:?}"))?;
        info!(network = %name, "done");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {e}");
    }

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
