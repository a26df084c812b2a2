pub mod hash;
pub mod jsonrpc;
pub mod logger;
pub mod ws;
