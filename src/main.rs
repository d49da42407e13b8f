//! Light wallet command line.
//!
//! Offline utilities over the wallet core: derive the receive address,
//! inspect the persisted transaction history and print fee estimates.
//!
//! The seed phrase is read from `LIGHT_WALLET_SEED_PHRASE`, never from argv.

use alloy::primitives::TxHash;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

use light_wallet::blockchain::transaction::GasPolicy;
use light_wallet::blockchain::wallet::{Bip44Deriver, KeyDeriver};
use light_wallet::config::{load_config, WalletConfig};
use light_wallet::observability::{logging, metrics};
use light_wallet::storage::{MemoryStore, Store};
use light_wallet::GasPriority;

/// Environment variable holding the BIP-39 seed phrase.
const SEED_PHRASE_ENV_VAR: &str = "LIGHT_WALLET_SEED_PHRASE";

#[derive(Parser)]
#[command(name = "light-wallet")]
#[command(about = "Light wallet utilities", long_about = None)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the checksummed receive address
    Address,
    /// List persisted transactions
    History {
        /// Start after this transaction hash
        #[arg(long)]
        from: Option<String>,
        /// Maximum number of transactions
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the transfer fee in wei for a priority tier
    Fee {
        #[arg(default_value = "medium")]
        priority: GasPriority,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => WalletConfig::default(),
    };

    logging::init_logging(&config.observability.log_level);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    match cli.command {
        Commands::Address => {
            let seed_phrase = std::env::var(SEED_PHRASE_ENV_VAR)
                .map_err(|_| format!("Environment variable {} not set", SEED_PHRASE_ENV_VAR))?;
            let keys = Bip44Deriver.derive(&seed_phrase, &config.network)?;
            println!("{}", keys.checksummed_address());
        }
        Commands::History { from, limit } => {
            let Some(path) = &config.storage.path else {
                return Err("No storage.path configured; nothing is persisted".into());
            };
            let from: Option<TxHash> = from.map(|hash| hash.parse::<TxHash>()).transpose()?;
            let store = MemoryStore::open(path)?;
            for tx in store.transaction_history(from, limit, None)? {
                println!("{}", serde_json::to_string(&tx)?);
            }
        }
        Commands::Fee { priority } => {
            let gas = GasPolicy::from_config(&config.gas);
            println!(
                "{} gas_price={} fee={}",
                priority,
                gas.gas_price(priority),
                gas.fee(priority)
            );
        }
    }

    Ok(())
}
