//! # Game Client Library
//!
//! A terminal client for Crypto Ninja. The client holds no game logic: it
//! prints the frames the server sends, reads the player's button choice, and
//! returns the server's state blob untouched with the next press.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! Parses typed lines into button presses and control commands.
//!
//! ### Network Module (`network`)
//! Sends landing and press requests over UDP and keeps the latest state blob
//! and frame. Optional fake latency helps when testing over localhost.
//!
//! ### Rendering Module (`rendering`)
//! Prints a frame's image URL, title and numbered buttons.

pub mod input;
pub mod network;
pub mod rendering;
