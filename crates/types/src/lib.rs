// crates/types/src/lib.rs
//! Wire types for the remote PDF pipeline server.
//!
//! Serde models of the JSON the server speaks on its six endpoints.
//! No I/O here — `maskdeck-core` owns the HTTP client and the polling
//! logic that consumes these shapes.

pub mod extract;
pub mod health;
pub mod job;
pub mod mask;
pub mod scan;

pub use extract::*;
pub use health::*;
pub use job::*;
pub use mask::*;
pub use scan::*;
