//! Server network layer handling UDP communications and the tick loop

use crate::client_manager::ClientManager;
use crate::config::GameConfig;
use crate::error::ServerError;
use crate::game::{GameState, PhysicsReport};
use log::{debug, error, info, trace, warn};
use shared::{Command, DecodeError};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::time::{interval, MissedTickBehavior};

/// Read buffer size; commands are a couple of bytes, anything longer is junk.
pub const MAX_DATAGRAM_SIZE: usize = 2048;

/// Upper bound on datagrams handled in one tick so a flood cannot stall it.
pub const MAX_DATAGRAMS_PER_TICK: usize = 4096;

/// Counters for one pass of the tick loop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub datagrams: usize,
    pub physics: PhysicsReport,
    pub expired_players: usize,
    pub sent: usize,
    pub send_failures: usize,
}

/// Authoritative arena server: one socket, one roster, one world
pub struct Server {
    socket: std::net::UdpSocket,
    clients: ClientManager,
    game_state: GameState,
    tick_duration: Duration,
    buffer: Vec<u8>,
}

impl Server {
    pub async fn new(
        addr: SocketAddr,
        tick_duration: Duration,
        config: GameConfig,
    ) -> Result<Self, ServerError> {
        let clients = ClientManager::new(config.max_players);
        let game_state = GameState::new(config)?;

        // Detached from the reactor so every read reaches the kernel queue
        // directly; `into_std` leaves the socket non-blocking.
        let socket = UdpSocket::bind(addr)
            .await
            .and_then(UdpSocket::into_std)
            .map_err(|source| ServerError::Bind { addr, source })?;
        info!("Server listening on {}", socket.local_addr()?);

        Ok(Server {
            socket,
            clients,
            game_state,
            tick_duration,
            buffer: vec![0u8; MAX_DATAGRAM_SIZE],
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn game_state(&self) -> &GameState {
        &self.game_state
    }

    pub fn clients(&self) -> &ClientManager {
        &self.clients
    }

    /// Runs one drain, physics and broadcast pass against the given clock.
    pub fn tick(&mut self, now: Instant) -> TickSummary {
        let datagrams = self.drain_datagrams(now);

        let physics = self.game_state.update(now);
        let expired = self.game_state.expire_dead_players(now);
        for client_id in &expired {
            self.clients.remove_client(client_id);
        }

        self.game_state.tick += 1;
        let (sent, send_failures) = self.broadcast_snapshot();

        TickSummary {
            datagrams,
            physics,
            expired_players: expired.len(),
            sent,
            send_failures,
        }
    }

    /// Reads every datagram already queued on the socket without waiting.
    fn drain_datagrams(&mut self, now: Instant) -> usize {
        let mut received = 0;

        for _ in 0..MAX_DATAGRAMS_PER_TICK {
            match self.socket.recv_from(&mut self.buffer) {
                Ok((len, addr)) => {
                    received += 1;
                    let decoded = Command::decode(&self.buffer[..len]);
                    self.dispatch(decoded, addr, now);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => {
                    // e.g. ICMP port unreachable surfaced on some platforms
                    warn!("Error receiving datagram: {}", e);
                }
            }
        }

        received
    }

    /// Decodes and applies a single datagram from `addr`.
    pub fn handle_datagram(&mut self, data: &[u8], addr: SocketAddr, now: Instant) {
        self.dispatch(Command::decode(data), addr, now);
    }

    fn dispatch(&mut self, decoded: Result<Command, DecodeError>, addr: SocketAddr, now: Instant) {
        match decoded {
            Ok(command) => self.handle_command(command, addr, now),
            Err(e) => debug!("Dropping datagram from {}: {}", addr, e),
        }
    }

    /// Applies a decoded command to the roster and world
    pub fn handle_command(&mut self, command: Command, addr: SocketAddr, now: Instant) {
        let client_id = self.clients.find_client_by_addr(addr);

        match (command, client_id) {
            (Command::Connect, None) => match self.clients.add_client(addr) {
                Some(client_id) => {
                    self.game_state.add_player(client_id);
                }
                None => warn!(
                    "Refusing {}: server full ({} players)",
                    addr,
                    self.clients.capacity()
                ),
            },
            (Command::Connect, Some(client_id)) => {
                debug!("Ignoring repeated connect from {} ({})", addr, client_id);
            }
            (Command::Move(direction), Some(client_id)) => {
                self.game_state.move_player(client_id, direction, now);
            }
            (Command::PlaceBomb, Some(client_id)) => {
                self.game_state.place_bomb(client_id, now);
            }
            (Command::Disconnect, Some(client_id)) => {
                self.clients.remove_client(&client_id);
                self.game_state.remove_player(&client_id);
            }
            (command, None) => {
                trace!("Dropping {:?} from unregistered {}", command, addr);
            }
        }
    }

    /// Sends the same snapshot line to every known address. A failing
    /// recipient is logged and skipped.
    fn broadcast_snapshot(&self) -> (usize, usize) {
        if self.clients.is_empty() {
            return (0, 0);
        }

        let message = self.game_state.snapshot().encode();
        let mut sent = 0;
        let mut failures = 0;

        for (client_id, addr) in self.clients.client_addrs() {
            match self.socket.send_to(message.as_bytes(), addr) {
                Ok(_) => sent += 1,
                Err(e) => {
                    failures += 1;
                    warn!("Failed to send snapshot to client {} at {}: {}", client_id, addr, e);
                }
            }
        }

        (sent, failures)
    }

    /// Main server loop; runs until Ctrl+C
    pub async fn run(&mut self) -> Result<(), ServerError> {
        self.run_until(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C, shutting down gracefully..."),
                Err(e) => {
                    error!("Failed to listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        })
        .await
    }

    /// Ticks at the configured rate until `shutdown` resolves.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()>,
    {
        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            "Server started, ticking every {:?} ({} walls)",
            self.tick_duration,
            self.game_state.world().walls().len()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Server shutting down");
                    break;
                }
                _ = tick_interval.tick() => {
                    let summary = self.tick(Instant::now());

                    // Periodic monitoring
                    if self.game_state.tick % 60 == 0 && !self.clients.is_empty() {
                        debug!(
                            "Tick {}: {} clients, {} bombs, {} explosions, {} datagrams this tick",
                            self.game_state.tick,
                            self.clients.len(),
                            self.game_state.bombs().len(),
                            self.game_state.explosions().len(),
                            summary.datagrams
                        );
                    }
                }
            }
        }

        Ok(())
    }
}
