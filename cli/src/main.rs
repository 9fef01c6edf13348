//! Memory Lane command-line reader.
//!
//! Reads Swan agents straight from the chain and prints JSON.
//!
//! Usage:
//!   memlane discover
//!   memlane agents
//!   memlane show 0xd4022dB6165caeA1F72a187D4d49B347E02E1484 --more 2
//!   memlane --config memlane.toml show --listed-round 3

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use memlane_config::{settings::DEFAULT_AGENT, MemlaneConfig};
use memlane_contracts::{
    artifact::Artifact,
    error::{MemlaneError, MemlaneResult},
    view::AgentView,
    Address,
};
use memlane_core::traits::ContractReader;
use memlane_diary::{parse_persona, Persona};
use memlane_net::{ArweaveGateway, BlockscoutClient, EndpointHealth, HttpTransport, RpcContractReader};
use memlane_swan::{
    discover_agents, fetch_listed_artifacts, list_agents, AgentSession, DiscoveryOptions,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// Swan Memory Lane: agent profiles, diaries and artifacts from Base.
#[derive(Parser)]
#[command(
    name = "memlane",
    about = "Read Swan agents, diaries and artifacts from the chain",
    long_about = "Discovers Swan agents through the block explorer and reads their\n\
                  profiles, round diaries and artifacts over JSON-RPC."
)]
struct Cli {
    /// TOML configuration file. Built-in Base mainnet defaults otherwise.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List agent contracts created by the factory.
    Discover,
    /// Discover agents and read a summary of each, newest first.
    Agents,
    /// Load one agent's profile, diary and artifacts.
    Show {
        /// Agent contract address. Defaults to the reference agent.
        address: Option<Address>,
        /// Extra diary and artifact pages to load after the first.
        #[arg(long, default_value_t = 0)]
        more: u32,
        /// Also list the marketplace's artifacts for this round.
        #[arg(long)]
        listed_round: Option<u64>,
    },
}

#[derive(Serialize)]
struct ShowOutput {
    view: AgentView,
    persona: Option<Persona>,
    #[serde(skip_serializing_if = "Option::is_none")]
    listed: Option<Vec<Artifact>>,
    endpoints: Vec<EndpointHealth>,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("memlane error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> MemlaneResult<()> {
    let config = match &cli.config {
        Some(path) => MemlaneConfig::from_file(path)?,
        None => MemlaneConfig::default(),
    };

    match cli.command {
        Command::Discover => run_discover(&config).await,
        Command::Agents => run_agents(&config).await,
        Command::Show {
            address,
            more,
            listed_round,
        } => run_show(&config, address.unwrap_or(DEFAULT_AGENT), more, listed_round).await,
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn run_discover(config: &MemlaneConfig) -> MemlaneResult<()> {
    let explorer = BlockscoutClient::from_settings(&config.explorer)?;
    let agents = discover_agents(
        &explorer,
        config.contracts.factory,
        &DiscoveryOptions::from(&config.explorer),
    )
    .await?;
    print_json(&agents)
}

async fn run_agents(config: &MemlaneConfig) -> MemlaneResult<()> {
    let explorer = BlockscoutClient::from_settings(&config.explorer)?;
    let reader = RpcContractReader::new(HttpTransport::from_settings(&config.rpc)?);
    let agents = list_agents(
        &explorer,
        &reader,
        config.contracts.factory,
        &DiscoveryOptions::from(&config.explorer),
        &config.directory,
    )
    .await?;
    print_json(&agents)
}

async fn run_show(
    config: &MemlaneConfig,
    address: Address,
    more: u32,
    listed_round: Option<u64>,
) -> MemlaneResult<()> {
    let rpc = Arc::new(RpcContractReader::new(HttpTransport::from_settings(&config.rpc)?));
    let reader: Arc<dyn ContractReader> = rpc.clone();
    let content = Arc::new(ArweaveGateway::from_settings(&config.content)?);
    let session = AgentSession::new(reader.clone(), content, &config.contracts, config.scan);

    session.select_agent(address).await?;
    for page in 0..more {
        let (diary, artifacts) = tokio::join!(session.load_more_diary(), session.load_more_artifacts());
        let (diary, artifacts) = (diary?, artifacts?);
        if !diary && !artifacts {
            info!(pages = page, "no more rounds to load");
            break;
        }
    }
    let view = session.view()?;

    let listed = match listed_round {
        Some(round) => Some(
            fetch_listed_artifacts(&*reader, config.contracts.marketplace, address, round).await?,
        ),
        None => None,
    };

    print_json(&ShowOutput {
        persona: view.profile.as_ref().map(|p| parse_persona(&p.description)),
        view,
        listed,
        endpoints: rpc.transport().endpoint_snapshot(),
    })
}

fn print_json<T: Serialize>(value: &T) -> MemlaneResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|e| MemlaneError::decode(format!("failed to render output: {}", e)))?;
    println!("{}", rendered);
    Ok(())
}
