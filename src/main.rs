use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;
use wordserv::{Config, PolicyKind, Server, WordStore};

/// Serves chunks of a word file to concurrent clients.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// JSON experiment config
    #[arg(long)]
    config: Option<PathBuf>,
    /// Scheduling policy, overriding the config
    #[arg(long, value_enum)]
    policy: Option<PolicyKind>,
    #[arg(long)]
    ip: Option<String>,
    #[arg(long)]
    port: Option<u16>,
    /// Word file, overriding the config's `filename`
    #[arg(long)]
    words: Option<PathBuf>,
}

fn announce(config: &Config) {
    let unspecified = config.server_ip.parse::<IpAddr>().is_ok_and(|ip| ip.is_unspecified());
    if !unspecified {
        return;
    }
    match local_ip_address::local_ip() {
        Ok(ip) => log::info!("reachable on the LAN at {ip}:{}", config.server_port),
        Err(e) => log::warn!("unable to determine LAN address: {e}"),
    }
}

fn main() -> wordserv::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(policy) = args.policy {
        config.policy = policy;
    }
    if let Some(ip) = args.ip {
        config.server_ip = ip;
    }
    if let Some(port) = args.port {
        config.server_port = port;
    }
    if let Some(words) = args.words {
        config.filename = words;
    }

    let store = WordStore::load(&config.filename)?;
    log::info!("loaded {} words from {}", store.len(), config.filename.display());

    let mut server = Server::bind(config.address(), store, config.policy.build())?
        .with_stats_interval(config.stats_interval());
    log::info!("{} server listening on {}", server.policy().name(), server.local_addr()?);
    announce(&config);
    server.run()
}
