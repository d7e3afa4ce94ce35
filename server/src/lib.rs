//! # Arena Server Library
//!
//! This library provides the authoritative server for the bomb arena. It owns
//! the only copy of the world, applies the commands clients send, and
//! broadcasts the full world state to every client on each tick.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Clients never decide anything. They send intents (connect, move, drop a
//! bomb, leave) and draw whatever the server tells them the world looks like.
//!
//! ### Session Tracking
//! There is no handshake. The UDP endpoint a datagram arrives from is the
//! player's identity; the server binds it to an opaque session id on connect
//! and forgets it on disconnect.
//!
//! ### State Broadcasting
//! Every tick the complete world is serialized into one text line and sent to
//! every known address, whether or not anything changed. A lost datagram in
//! either direction is never retried; the next snapshot repairs it.
//!
//! ## Architecture Design
//!
//! ### Single-Threaded Tick Loop
//! One sequential loop drains the socket, mutates the world and broadcasts.
//! Nothing is shared across threads, so nothing is locked. The socket is only
//! touched through non-blocking calls; the tick interval is the only await.
//!
//! ### Tick Phases
//! 1. **Drain**: read every datagram already queued and apply its command.
//! 2. **Resolve**: explosions kill overlapping players, finished explosions
//!    are removed, bombs whose fuse ran out become explosions.
//! 3. **Broadcast**: one snapshot, identical for all recipients.
//!
//! ### Injected Time and Randomness
//! Every timed operation takes `now` as an argument and the world owns a
//! seedable RNG, so fuses, blast shapes and whole ticks can be replayed.
//!
//! ## Module Organization
//!
//! ### Client Manager Module (`client_manager`)
//! Address to session mapping, capacity limit, broadcast address list.
//!
//! ### Game Module (`game`)
//! The world state: players, bombs, explosions and the tick's physics pass.
//!
//! ### Entity Module (`entity`)
//! Per-entity rules: movement validation, fuses and arming, blast shapes.
//!
//! ### World and Physics Modules (`world`, `physics`)
//! Static wall grid, bounds, rectangle overlap.
//!
//! ### Network Module (`network`)
//! UDP socket, datagram dispatch and the fixed-rate loop.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::GameConfig;
//! use server::network::Server;
//! use std::time::Duration;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 30Hz tick, default arena
//!     let mut server = Server::new(
//!         "0.0.0.0:3000".parse()?,
//!         Duration::from_secs(1) / 30,
//!         GameConfig::default(),
//!     )
//!     .await?;
//!
//!     // Runs until Ctrl+C
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod config;
pub mod entity;
pub mod error;
pub mod game;
pub mod network;
pub mod physics;
pub mod world;
