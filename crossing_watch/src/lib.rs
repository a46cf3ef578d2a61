//! Crossing Watch - live mirror of a remote intersection signal controller
//!
//! Polls the controller on a fixed cadence, publishes reconciled snapshots to
//! subscribers, falls back to simulated counts while the controller is
//! unreachable, and forwards operator overrides.
//!
//! - [`sync`]: poll loop, start/stop, snapshot subscription
//! - [`overrides`]: direction-select / end-override commands
//! - [`api`]: controller interface and its HTTP implementation
//! - [`wire`]: controller payload decoding
//! - [`config`]: configuration loading

pub mod api;
pub mod config;
pub mod console;
pub mod error;
pub mod overrides;
pub mod paths;
pub mod sync;
pub mod wire;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ControllerApi, HttpController};
pub use config::WatchConfig;
pub use error::{CommandError, ConfigError, FetchError};
pub use overrides::OverrideController;
pub use sync::{Synchronizer, View};
