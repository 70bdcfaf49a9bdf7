//! # Game Server Library
//!
//! This library provides the server for Crypto Ninja, a turn-based coin
//! slicing game played one button press at a time. The server is stateless:
//! every request carries the whole game state as an opaque blob, and every
//! response hands the updated blob back to the client together with the next
//! screen to display.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Rules
//! The server decides the outcome of every press. Clients only render frames
//! and echo the state blob; they never compute scores, lives or combos.
//!
//! ### Tolerant State Handling
//! The blob is untrusted client input. Anything that fails to decode, carries
//! another schema version, or describes an impossible state is replaced by a
//! fresh game instead of failing the request.
//!
//! ### Frame Assembly
//! Each response carries a `Frame`: an image URL, a title line and the list of
//! buttons the client should offer next.
//!
//! ## Module Organization
//!
//! ### Config Module (`config`)
//! Session length, starting lives, hazard probability and image URLs.
//!
//! ### Game Module (`game`)
//! The state machine over the menu, rules, leaderboard, shop, game and
//! game-over screens:
//! - Round generation from an injected coin catalog
//! - Session timer enforcement
//! - Score, combo and lives arithmetic
//! - Frame rendering
//!
//! ### Network Module (`network`)
//! UDP transport around the engine:
//! - Packet deserialization and malformed datagram handling
//! - Request dispatch to the engine
//! - Reply queueing and periodic request statistics
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::config::GameConfig;
//! use server::game::GameEngine;
//! use server::network::Server;
//! use shared::CoinCatalog;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let engine = GameEngine::new(GameConfig::default(), CoinCatalog::standard());
//!
//!     // Bind to an address and report request counts every 30 seconds
//!     let mut server = Server::new("127.0.0.1:8080", engine, Duration::from_secs(30)).await?;
//!
//!     // Answers each datagram from the state it carries until shut down
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Timing
//!
//! The session clock starts when a game begins and is not refreshed between
//! rounds. Once it runs out, the next press in the game screen ends the game
//! without applying the pick.

pub mod config;
pub mod game;
pub mod network;
pub mod utils;
