//! Server network layer: UDP request/response around the stateless game engine

use crate::game::GameEngine;
use crate::utils::get_timestamp;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{Packet, StateCodec, MAX_DATAGRAM_SIZE};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::interval;

pub type ServerError = Box<dyn std::error::Error + Send + Sync>;

/// Messages sent from network tasks to main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived { packet: Packet, addr: SocketAddr },
    MalformedPacket { addr: SocketAddr, len: usize },
    Shutdown,
}

/// Messages sent from the main loop to the sender task
#[derive(Debug)]
pub enum GameMessage {
    SendPacket { packet: Packet, addr: SocketAddr },
}

/// Stops a running [`Server`] from another task
#[derive(Clone)]
pub struct ShutdownHandle {
    server_tx: mpsc::UnboundedSender<ServerMessage>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        if self.server_tx.send(ServerMessage::Shutdown).is_err() {
            debug!("Server already stopped");
        }
    }
}

/// Counters reported by the periodic stats log
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RequestStats {
    pub landings: u64,
    pub presses: u64,
    pub rejected: u64,
}

impl RequestStats {
    pub fn total(&self) -> u64 {
        self.landings + self.presses + self.rejected
    }
}

/// Server answering each datagram from the state carried inside it
///
/// Nothing about a client outlives the request: the engine, the random
/// generator and the counters are the only state held here.
pub struct Server {
    socket: Arc<UdpSocket>,
    engine: GameEngine,
    rng: StdRng,
    stats: RequestStats,
    stats_interval: Duration,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    game_tx: mpsc::UnboundedSender<GameMessage>,
    game_rx: mpsc::UnboundedReceiver<GameMessage>,
}

impl Server {
    pub async fn new(
        addr: &str,
        engine: GameEngine,
        stats_interval: Duration,
    ) -> Result<Self, ServerError> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", socket.local_addr()?);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (game_tx, game_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            engine,
            rng: StdRng::from_entropy(),
            stats: RequestStats::default(),
            stats_interval,
            server_tx,
            server_rx,
            game_tx,
            game_rx,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            server_tx: self.server_tx.clone(),
        }
    }

    pub fn stats(&self) -> RequestStats {
        self.stats
    }

    /// Spawns task that continuously listens for incoming packets
    async fn spawn_network_receiver(&self) -> JoinHandle<()> {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = vec![0u8; MAX_DATAGRAM_SIZE];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        let message = match deserialize::<Packet>(&buffer[0..len]) {
                            Ok(packet) => ServerMessage::PacketReceived { packet, addr },
                            Err(_) => ServerMessage::MalformedPacket { addr, len },
                        };

                        if let Err(e) = server_tx.send(message) {
                            error!("Failed to send packet to main loop: {}", e);
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        })
    }

    /// Spawns task that processes outgoing packet queue
    async fn spawn_network_sender(&mut self) -> JoinHandle<()> {
        let socket = Arc::clone(&self.socket);
        let mut game_rx = std::mem::replace(&mut self.game_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = game_rx.recv().await {
                match message {
                    GameMessage::SendPacket { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                }
            }
        })
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), ServerError> {
        let data = serialize(packet)?;
        if data.len() > MAX_DATAGRAM_SIZE {
            warn!("Outgoing packet to {} is {} bytes", addr, data.len());
        }
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    fn send_packet(&self, packet: Packet, addr: SocketAddr) {
        if let Err(e) = self.game_tx.send(GameMessage::SendPacket { packet, addr }) {
            error!("Failed to queue packet for sending: {}", e);
        }
    }

    /// Computes the reply for one request. Returns `None` for packets that
    /// only a server would send.
    pub fn handle_packet(&mut self, packet: Packet, now: u64) -> Option<Packet> {
        match packet {
            Packet::Landing => {
                self.stats.landings += 1;
                Some(Packet::Frame {
                    frame: self.engine.landing_frame(),
                    state: None,
                })
            }

            Packet::Press {
                button_index,
                state,
            } => {
                self.stats.presses += 1;
                let current = self
                    .engine
                    .decode_state(state.as_deref(), now, &mut self.rng);
                let (next, frame) =
                    self.engine
                        .handle_press(Some(current), button_index, now, &mut self.rng);

                match StateCodec::encode(&next) {
                    Ok(blob) => Some(Packet::Frame {
                        frame,
                        state: Some(blob),
                    }),
                    Err(e) => {
                        error!("Failed to encode game state: {}", e);
                        self.stats.rejected += 1;
                        Some(Packet::Rejected {
                            reason: "Internal error".to_string(),
                        })
                    }
                }
            }

            Packet::Frame { .. } | Packet::Rejected { .. } => {
                self.stats.rejected += 1;
                None
            }
        }
    }

    fn log_stats(&self, since_last: &mut RequestStats) {
        let delta = RequestStats {
            landings: self.stats.landings - since_last.landings,
            presses: self.stats.presses - since_last.presses,
            rejected: self.stats.rejected - since_last.rejected,
        };

        if delta.total() > 0 {
            debug!(
                "{} requests in the last {:?}: {} landings, {} presses, {} rejected",
                delta.total(),
                self.stats_interval,
                delta.landings,
                delta.presses,
                delta.rejected
            );
        }
        *since_last = self.stats;
    }

    /// Main server loop coordinating all operations
    pub async fn run(&mut self) -> Result<(), ServerError> {
        let receiver = self.spawn_network_receiver().await;
        let sender = self.spawn_network_sender().await;

        let mut stats_interval = interval(self.stats_interval);
        let mut last_stats = self.stats;

        info!(
            "Server started successfully ({}s sessions, {} lives, {:.0}% hazard rounds)",
            self.engine.config().round_duration.as_secs(),
            self.engine.config().starting_lives,
            self.engine.config().hazard_chance * 100.0
        );

        loop {
            tokio::select! {
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            match self.handle_packet(packet, get_timestamp()) {
                                Some(reply) => self.send_packet(reply, addr),
                                None => warn!("Unexpected packet type from client at {}", addr),
                            }
                        },
                        Some(ServerMessage::MalformedPacket { addr, len }) => {
                            warn!("Failed to deserialize {} byte packet from {}", len, addr);
                            self.stats.rejected += 1;
                            let reply = Packet::Rejected {
                                reason: "Malformed packet".to_string(),
                            };
                            self.send_packet(reply, addr);
                        },
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                    }
                },

                _ = stats_interval.tick() => {
                    self.log_stats(&mut last_stats);
                },
            }
        }

        // The receiver never sees its channel close while we hold server_tx
        receiver.abort();
        sender.abort();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use shared::{CoinCatalog, GameState, Screen};
    use std::net::{IpAddr, Ipv4Addr};

    const NOW: u64 = 1_700_000_000_000;

    fn test_addr() -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080)
    }

    async fn create_test_server() -> Server {
        let engine = GameEngine::new(GameConfig::default(), CoinCatalog::standard());
        Server::new("127.0.0.1:0", engine, Duration::from_secs(60))
            .await
            .unwrap()
    }

    fn press(server: &mut Server, button_index: u8, state: Option<String>) -> (GameState, String) {
        match server.handle_packet(Packet::Press { button_index, state }, NOW) {
            Some(Packet::Frame {
                state: Some(blob), ..
            }) => (StateCodec::try_decode(&blob).unwrap(), blob),
            other => panic!("Unexpected reply {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_landing_has_no_state() {
        let mut server = create_test_server().await;

        match server.handle_packet(Packet::Landing, NOW) {
            Some(Packet::Frame { frame, state }) => {
                assert!(state.is_none());
                assert_eq!(frame.buttons.len(), 4);
            }
            other => panic!("Unexpected reply {:?}", other),
        }
        assert_eq!(server.stats().landings, 1);
    }

    #[tokio::test]
    async fn test_press_without_state_starts_game() {
        let mut server = create_test_server().await;

        let (state, _) = press(&mut server, 1, None);
        assert_eq!(state.screen, Screen::Game);
        assert_eq!(state.score, 0);
        assert_eq!(state.start_time, NOW);
    }

    #[tokio::test]
    async fn test_state_round_trips_through_client() {
        let mut server = create_test_server().await;

        let (_, blob) = press(&mut server, 2, None);
        let (rules, _) = press(&mut server, 2, Some(blob));
        assert_eq!(rules.screen, Screen::Menu);

        let (_, blob) = press(&mut server, 1, None);
        let (state, _) = press(&mut server, 9, Some(blob.clone()));
        assert_eq!(state, StateCodec::try_decode(&blob).unwrap());
        assert_eq!(server.stats().presses, 4);
    }

    #[tokio::test]
    async fn test_corrupt_state_treated_as_new_player() {
        let mut server = create_test_server().await;

        let (state, _) = press(&mut server, 2, Some("{\"score\": 99999".to_string()));
        assert_eq!(state.screen, Screen::Rules);
        assert_eq!(state.score, 0);
    }

    #[tokio::test]
    async fn test_server_packets_are_not_answered() {
        let mut server = create_test_server().await;

        let reply = server.handle_packet(
            Packet::Rejected {
                reason: "echo".to_string(),
            },
            NOW,
        );
        assert!(reply.is_none());
        assert_eq!(server.stats().rejected, 1);
    }

    #[tokio::test]
    async fn test_local_addr_is_ephemeral() {
        let server = create_test_server().await;
        let addr = server.local_addr().unwrap();
        assert_ne!(addr.port(), 0);
        assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn test_channel_communication() {
        let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
        let addr = test_addr();

        assert!(tx
            .send(ServerMessage::PacketReceived {
                packet: Packet::Landing,
                addr,
            })
            .is_ok());

        match rx.try_recv().unwrap() {
            ServerMessage::PacketReceived { packet, addr: a } => {
                assert_eq!(a, addr);
                assert!(matches!(packet, Packet::Landing));
            }
            _ => panic!("Unexpected message type"),
        }
    }

    #[test]
    fn test_shutdown_handle_sends_shutdown() {
        let (server_tx, mut server_rx) = mpsc::unbounded_channel();
        let handle = ShutdownHandle { server_tx };

        handle.shutdown();
        assert!(matches!(server_rx.try_recv(), Ok(ServerMessage::Shutdown)));

        drop(server_rx);
        handle.shutdown();
    }

    #[test]
    fn test_request_stats_total() {
        let stats = RequestStats {
            landings: 2,
            presses: 5,
            rejected: 1,
        };
        assert_eq!(stats.total(), 8);
        assert_eq!(RequestStats::default().total(), 0);
    }

    #[tokio::test]
    async fn test_shutdown_stops_run() {
        let mut server = create_test_server().await;
        let handle = server.shutdown_handle();
        handle.shutdown();

        let result = tokio::time::timeout(Duration::from_secs(1), server.run()).await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_shutdown_releases_socket() {
        let mut server = create_test_server().await;
        let socket = Arc::downgrade(&server.socket);
        server.shutdown_handle().shutdown();
        server.run().await.unwrap();
        drop(server);

        // Aborted tasks drop their socket handles once the runtime polls them
        for _ in 0..100 {
            if socket.upgrade().is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(socket.upgrade().is_none());
    }
}
