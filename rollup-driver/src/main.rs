//! Command-line interface for the rollup driver.

use std::process;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::{value_parser, Arg, ArgMatches, Command};
use tokio::signal;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use rollup_driver::{
    init_logging, Address, AnchorTxValidator, ChainClient, DriverConfig, DriverError,
    ExecutionEngine, HttpRpcClient, LevelFilter, SyncProgressTracker, B256,
};

const STATUS_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("rollup-driver")
        .version(rollup_driver::VERSION)
        .about("Beacon sync stall tracking and anchor transaction validation for an L2 node")
        .subcommand_required(true)
        .arg(
            Arg::new("l2-endpoint")
                .short('e')
                .long("l2-endpoint")
                .value_name("URL")
                .help("JSON-RPC endpoint of the L2 execution engine")
                .global(true)
                .default_value("http://127.0.0.1:8545"),
        )
        .arg(
            Arg::new("system-contract")
                .long("system-contract")
                .value_name("ADDRESS")
                .help("System contract anchor transactions must call")
                .global(true),
        )
        .arg(
            Arg::new("chain-id")
                .long("chain-id")
                .value_name("ID")
                .help("Expected L2 chain id (queried from the node when omitted)")
                .global(true)
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("golden-touch-address")
                .long("golden-touch-address")
                .value_name("ADDRESS")
                .help("Anchor signer address (read from the system contract when omitted)")
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .short('t')
                .long("timeout")
                .value_name("SECONDS")
                .help("Beacon sync stall timeout")
                .global(true)
                .value_parser(value_parser!(u64))
                .default_value("120"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level")
                .global(true)
                .value_parser(["error", "warn", "info", "debug", "trace"]),
        )
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .value_name("DIR")
                .help("Also write logs to files in this directory")
                .global(true),
        )
        .subcommand(
            Command::new("track")
                .about("Track beacon sync progress towards a verified block")
                .arg(
                    Arg::new("verified-height")
                        .long("verified-height")
                        .value_name("HEIGHT")
                        .help("Height of the verified block (defaults to the engine head)")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("verified-id")
                        .long("verified-id")
                        .value_name("ID")
                        .help("Id of the verified block")
                        .value_parser(value_parser!(u64))
                        .default_value("0"),
                )
                .arg(
                    Arg::new("verified-hash")
                        .long("verified-hash")
                        .value_name("HASH")
                        .help("Hash of the verified block"),
                ),
        )
        .subcommand(
            Command::new("check-anchor")
                .about("Validate the anchor transaction of a block and its receipt")
                .arg(
                    Arg::new("block")
                        .short('b')
                        .long("block")
                        .value_name("NUMBER")
                        .help("Block whose first transaction is checked")
                        .required(true)
                        .value_parser(value_parser!(u64)),
                ),
        )
        .get_matches();

    let config = match build_config(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    }

    let logging_guard = init_logging(config.logging_config())?;

    tracing::info!("Starting rollup driver {}", rollup_driver::VERSION);
    tracing::info!("L2 endpoint: {}", config.l2_endpoint);
    tracing::info!("System contract: {}", config.system_contract);

    let client = Arc::new(HttpRpcClient::new(config.l2_endpoint.clone(), config.rpc_timeout)?);

    let result = match matches.subcommand() {
        Some(("track", sub_matches)) => run_tracker(&config, client, sub_matches).await,
        Some(("check-anchor", sub_matches)) => {
            let block = sub_matches.get_one::<u64>("block").copied().unwrap_or_default();
            check_anchor(&config, client, block).await
        }
        _ => Err(DriverError::Config("unknown command".to_string())),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        // Flush file output before exiting
        drop(logging_guard);
        process::exit(1);
    }

    Ok(())
}

fn parse_arg<T>(matches: &ArgMatches, id: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    matches
        .get_one::<String>(id)
        .map(|value| value.parse::<T>().map_err(|e| format!("invalid --{} '{}': {}", id, value, e)))
        .transpose()
}

fn build_config(matches: &ArgMatches) -> Result<DriverConfig, String> {
    let mut config = DriverConfig::default();

    if let Some(endpoint) = matches.get_one::<String>("l2-endpoint") {
        config.l2_endpoint = endpoint.clone();
    }
    if let Some(contract) = parse_arg::<Address>(matches, "system-contract")? {
        config.system_contract = contract;
    }
    if let Some(chain_id) = matches.get_one::<u64>("chain-id") {
        config = config.with_chain_id(*chain_id);
    }
    if let Some(address) = parse_arg::<Address>(matches, "golden-touch-address")? {
        config = config.with_golden_touch_address(address);
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config = config.with_beacon_sync_timeout(Duration::from_secs(*timeout));
    }
    if let Some(level) = parse_arg::<LevelFilter>(matches, "log-level")? {
        config = config.with_log_level(level);
    }
    if let Some(dir) = matches.get_one::<String>("log-dir") {
        config = config.with_log_dir(dir);
    }

    Ok(config)
}

/// Chain id reported by the node, checked against the configured one.
async fn resolve_chain_id(config: &DriverConfig, client: &HttpRpcClient) -> Result<u64, DriverError> {
    let remote = client.chain_id().await?;
    match config.chain_id {
        Some(expected) if expected != remote => Err(DriverError::Config(format!(
            "node at {} serves chain id {}, expected {}",
            config.l2_endpoint, remote, expected
        ))),
        _ => Ok(remote),
    }
}

async fn run_tracker(
    config: &DriverConfig,
    client: Arc<HttpRpcClient>,
    matches: &ArgMatches,
) -> Result<(), DriverError> {
    let height = match matches.get_one::<u64>("verified-height") {
        Some(height) => *height,
        None => client.block_number().await?,
    };
    let id = matches.get_one::<u64>("verified-id").copied().unwrap_or_default();
    let hash = parse_arg::<B256>(matches, "verified-hash")
        .map_err(DriverError::Config)?
        .unwrap_or_default();

    let tracker = Arc::new(SyncProgressTracker::new(client, config.beacon_sync_timeout));
    tracker.update_meta(id, height, hash);
    tracing::info!(
        "Tracking beacon sync to verified block {} (height {}), timeout {:?}",
        id,
        height,
        config.beacon_sync_timeout
    );

    let shutdown_token = CancellationToken::new();
    let tracker_handle = tokio::spawn({
        let tracker = tracker.clone();
        let token = shutdown_token.clone();
        async move { tracker.track(token).await }
    });

    let mut status = tokio::time::interval(STATUS_INTERVAL);
    status.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                tracing::info!("Received shutdown signal (Ctrl-C)");
                break;
            }
            _ = status.tick() => {
                match tracker.out_of_sync().await {
                    Ok(out_of_sync) => tracing::info!(
                        "Beacon sync status: out_of_sync={}, triggered={}",
                        out_of_sync,
                        tracker.triggered()
                    ),
                    Err(e) => tracing::warn!("Failed to query sync status: {}", e),
                }
                if tracker.triggered() {
                    tracing::warn!(
                        "Beacon sync to height {:?} stalled, falling back is required",
                        tracker.last_synced_verified_block_height()
                    );
                }
            }
        }
    }

    shutdown_token.cancel();
    if let Err(e) = tracker_handle.await {
        tracing::error!("Tracker task failed: {}", e);
    }
    tracing::info!("Rollup driver stopped");

    Ok(())
}

async fn check_anchor(
    config: &DriverConfig,
    client: Arc<HttpRpcClient>,
    block: u64,
) -> Result<(), DriverError> {
    let chain_id = resolve_chain_id(config, &client).await?;

    let tx = client.transaction_by_block_number_and_index(block, 0).await?.ok_or_else(|| {
        DriverError::Config(format!("block {} has no transactions", block))
    })?;

    let mut validator = AnchorTxValidator::new(config.system_contract, chain_id, client)
        .with_anchor_method(&config.anchor_method_signature);
    if let Some(address) = config.golden_touch_address {
        validator = validator.with_golden_touch_address(address);
    }

    validator.validate_anchor_tx(&tx).await?;
    let receipt = validator.get_and_validate_anchor_tx_receipt(&tx).await?;

    tracing::info!(
        "Anchor transaction {} of block {} is valid ({} events, gas used {})",
        tx.hash(),
        block,
        receipt.logs.len(),
        receipt.gas_used
    );

    Ok(())
}
