//! Core - world construction
//!
//! See `init.rs` for building a tick-0 world from a configuration.

pub mod init;

pub use init::{initialize, initialize_with_agents, validate_config};
