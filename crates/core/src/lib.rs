// crates/core/src/lib.rs
pub mod api;
pub mod error;
pub mod events;
pub mod export;
pub mod logscan;
pub mod poller;
pub mod session;

pub use api::*;
pub use error::*;
pub use events::*;
pub use export::*;
pub use logscan::*;
pub use poller::*;
pub use session::*;
