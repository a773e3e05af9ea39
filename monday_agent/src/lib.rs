//! monday agent: samples host vitals and serves them as JSON over HTTP.

pub mod args;
pub mod logging;
pub mod metrics;
pub mod select;
pub mod server;
pub mod state;
pub mod types;

/// Port the agent listens on and the reporter connects to by default.
pub const DEFAULT_PORT: u16 = 4278;
