//! Headless arena client.
//!
//! Connects, wanders around at random dropping the occasional bomb, and logs
//! what it would have drawn. Useful for smoke-testing a running server.

use clap::Parser;
use log::{debug, info, warn};
use rand::Rng;
use shared::{Command, Direction, Snapshot, Viewport, BLOCK_SIZE, DEFAULT_PORT};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value_t = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)))]
    server: SocketAddr,

    /// How long to play before disconnecting, in seconds
    #[arg(short, long, default_value_t = 10)]
    duration: u64,

    /// Commands sent per second
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=100))]
    rate: u32,

    /// Chance per command of dropping a bomb instead of moving
    #[arg(short, long, default_value_t = 0.05)]
    bomb_chance: f64,
}

/// Counts of what is visible on screen in one snapshot.
#[derive(Debug, Default)]
struct Frame {
    players: usize,
    bombs: usize,
    blast_cells: usize,
    walls: usize,
}

impl Frame {
    fn visible(snapshot: &Snapshot, viewport: &Viewport) -> Self {
        let on_screen = |pos: &&shared::Position| viewport.contains(**pos, BLOCK_SIZE);
        Frame {
            players: snapshot.players.iter().filter(on_screen).count(),
            bombs: snapshot.bombs.iter().filter(on_screen).count(),
            blast_cells: snapshot.explosions.iter().flatten().filter(on_screen).count(),
            walls: snapshot.walls.iter().filter(on_screen).count(),
        }
    }

    fn summary(&self) -> String {
        format!(
            "{} players, {} bombs, {} blast cells, {} walls",
            self.players, self.bombs, self.blast_cells, self.walls
        )
    }
}

async fn send(socket: &UdpSocket, server: SocketAddr, command: Command) -> std::io::Result<()> {
    socket.send_to(&command.encode(), server).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    info!("Client socket bound to {}", socket.local_addr()?);

    send(&socket, args.server, Command::Connect).await?;
    info!("Sent connect to {}", args.server);

    let viewport = Viewport::default();
    let mut rng = rand::thread_rng();
    let mut buf = vec![0u8; 65536];
    let mut snapshots = 0u64;

    let mut commands = interval(Duration::from_secs(1) / args.rate);
    commands.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let deadline = tokio::time::sleep(Duration::from_secs(args.duration));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            _ = tokio::signal::ctrl_c() => break,
            _ = commands.tick() => {
                let command = if rng.gen_bool(args.bomb_chance.clamp(0.0, 1.0)) {
                    Command::PlaceBomb
                } else {
                    Command::Move(Direction::ALL[rng.gen_range(0..Direction::ALL.len())])
                };
                send(&socket, args.server, command).await?;
            }
            received = socket.recv_from(&mut buf) => {
                let (len, from) = match received {
                    Ok(received) => received,
                    Err(e) => {
                        warn!("Error receiving snapshot: {}", e);
                        continue;
                    }
                };
                if from != args.server {
                    continue;
                }

                let text = String::from_utf8_lossy(&buf[..len]);
                match Snapshot::decode(&text) {
                    Ok(snapshot) => {
                        snapshots += 1;
                        let frame = Frame::visible(&snapshot, &viewport);
                        if snapshots % 30 == 1 {
                            info!("Snapshot {}: {}", snapshots, frame.summary());
                        } else {
                            debug!("Snapshot {}: {}", snapshots, frame.summary());
                        }
                    }
                    Err(e) => warn!("Undecodable snapshot from server: {}", e),
                }
            }
        }
    }

    send(&socket, args.server, Command::Disconnect).await?;
    info!("Disconnected after {} snapshots", snapshots);
    Ok(())
}
