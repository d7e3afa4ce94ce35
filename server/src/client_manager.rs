//! Session roster for the arena server
//!
//! Clients have no handshake or token: the UDP endpoint a datagram came from
//! is their identity. This module binds each endpoint to an opaque
//! [`SessionId`] so the simulation never handles socket addresses directly.
//! It covers:
//! - Session creation on connect, bounded by server capacity
//! - Endpoint lookup for every incoming datagram
//! - Removal on disconnect or expiry
//! - The address list used for the per-tick broadcast

use log::info;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;

/// Opaque handle for one connected client.
///
/// Ids are assigned in connection order and never reused during the lifetime
/// of a server, so ordering by id is ordering by join time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u32);

impl SessionId {
    pub fn new(raw: u32) -> Self {
        SessionId(raw)
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A connected client endpoint
#[derive(Debug)]
pub struct Client {
    /// Session handle assigned by the server
    pub id: SessionId,
    /// Network address the snapshot is sent to
    pub addr: SocketAddr,
    /// When the session was created
    pub connected_at: Instant,
}

impl Client {
    pub fn new(id: SessionId, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
        }
    }
}

/// Manages all connected clients
///
/// Sessions are kept ordered by id so broadcasts go out in join order, with a
/// reverse index from address to id for datagram routing.
pub struct ClientManager {
    /// Connected clients indexed by session
    clients: BTreeMap<SessionId, Client>,
    /// Reverse lookup for incoming datagrams
    by_addr: HashMap<SocketAddr, SessionId>,
    /// Next id handed out on connect
    next_client_id: u32,
    /// Maximum number of concurrent clients allowed
    max_clients: usize,
}

impl ClientManager {
    /// Creates an empty roster with the given capacity. Ids start from 1.
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: BTreeMap::new(),
            by_addr: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Registers a new session for `addr`
    ///
    /// Returns None if the server is at capacity. Callers check
    /// [`find_client_by_addr`](Self::find_client_by_addr) first; registering an
    /// address that already has a session returns the existing id.
    pub fn add_client(&mut self, addr: SocketAddr) -> Option<SessionId> {
        if let Some(&existing) = self.by_addr.get(&addr) {
            return Some(existing);
        }

        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = SessionId(self.next_client_id);
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.by_addr.insert(addr, client_id);
        self.clients.insert(client_id, Client::new(client_id, addr));

        Some(client_id)
    }

    /// Removes a session. Returns false if it was already gone.
    pub fn remove_client(&mut self, client_id: &SessionId) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            self.by_addr.remove(&client.addr);
            info!(
                "Client {} ({}) disconnected after {:?}",
                client.id,
                client.addr,
                client.connected_at.elapsed()
            );
            true
        } else {
            false
        }
    }

    /// Finds the session bound to a network address
    pub fn find_client_by_addr(&self, addr: SocketAddr) -> Option<SessionId> {
        self.by_addr.get(&addr).copied()
    }

    pub fn get(&self, client_id: &SessionId) -> Option<&Client> {
        self.clients.get(client_id)
    }

    /// All session ids and their addresses, in join order
    pub fn client_addrs(&self) -> Vec<(SessionId, SocketAddr)> {
        self.clients
            .values()
            .map(|client| (client.id, client.addr))
            .collect()
    }

    pub fn capacity(&self) -> usize {
        self.max_clients
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
