//! The `ws` module is a reconnecting websocket client for the apparatus
//! control channel. Transports are pluggable so the client logic can be
//! exercised over in-memory channels.

mod client;
mod transport;

pub use client::*;
pub use transport::*;
