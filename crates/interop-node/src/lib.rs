//! # Interop Node Library
//!
//! This library exposes the internals of the node runtime for testing.
//! The main entry point is the `main.rs` binary.
//!
//! ## Modules
//!
//! - `config` - TOML configuration with environment overrides
//! - `container` - Adapter wiring for the five components
//! - `watchdog` - Periodic swap expiry sweep
//! - `oracle_poller` - Periodic oracle ingestion
//! - `http_fetcher` - Blocking HTTP oracle source
//! - `admin` - Health and metrics endpoint
//! - `runtime` - Task lifecycle

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod admin;
pub mod config;
pub mod container;
pub mod http_fetcher;
pub mod oracle_poller;
pub mod runtime;
pub mod watchdog;

pub use config::{ConfigError, NodeConfig};
pub use container::{ContainerError, InteropContainer};
pub use http_fetcher::HttpOracleFetcher;
pub use oracle_poller::{OraclePoller, PollSummary};
pub use runtime::InteropNode;
pub use watchdog::ExpiryWatchdog;
