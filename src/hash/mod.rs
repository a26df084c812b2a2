//! The `hash` module fingerprints JSON-serializable values.

mod hash;
pub use hash::*;
