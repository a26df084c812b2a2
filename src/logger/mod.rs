//! The `logger` module hands out pre-configured logging handles.
//! See `bin/logger_demo.rs` for a test binary demonstrating its usage.

mod logger;
pub use logger::*;
