use clap::Parser;
use log::{error, info};
use server::config::{GameConfig, SpawnPolicy};
use server::network::Server;
use shared::DEFAULT_PORT;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Authoritative bomb arena server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// IP address to bind to
    #[arg(short = 'H', long, env = "ADDRESS", default_value = "0.0.0.0")]
    host: IpAddr,

    /// UDP port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Tick rate (updates per second)
    #[arg(short, long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..=1000))]
    tick_rate: u32,

    /// Maximum number of connected players
    #[arg(short, long, default_value_t = 32)]
    max_players: usize,

    /// Where new players appear
    #[arg(long, value_enum, default_value_t = SpawnPolicy::Origin)]
    spawn: SpawnPolicy,

    /// Drop dead players from the roster after this many seconds
    #[arg(long)]
    dead_grace_secs: Option<u64>,

    /// Seed for fuses and blast shapes
    #[arg(long)]
    seed: Option<u64>,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            spawn: self.spawn,
            dead_player_grace: self.dead_grace_secs.map(Duration::from_secs),
            max_players: self.max_players,
            rng_seed: self.seed,
            ..GameConfig::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let addr = SocketAddr::new(args.host, args.port);
    let tick_duration = Duration::from_secs(1) / args.tick_rate;

    info!(
        "Starting server on {} at {}Hz (spawn: {:?}, max players: {})",
        addr, args.tick_rate, args.spawn, args.max_players
    );

    let mut server = match Server::new(addr, tick_duration, args.game_config()).await {
        Ok(server) => server,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    server.run().await?;

    info!("Game is over.");
    Ok(())
}
