//! The `jsonrpc` module builds and validates JSON-RPC 2.0 messages for the
//! apparatus control protocol.

mod message;
mod method;

pub use message::*;
pub use method::*;
