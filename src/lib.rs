//! # crossing
//!
//! Domain model for a four-way intersection dashboard that mirrors a remote
//! signal controller.
//!
//! This crate has no async runtime and does no I/O. It owns the state record,
//! the fallback traffic simulator and the reconciliation rules; the
//! `crossing_watch` crate drives it from a poll loop.
//!
//! ## Quick Start
//!
//! ```
//! use crossing::prelude::*;
//! use std::time::SystemTime;
//!
//! let mut rec = Reconciler::new(FallbackSimulator::new(FallbackRanges::default(), 7));
//! rec.start();
//!
//! let attempt = rec.begin_attempt().unwrap();
//! let reading = SignalReading {
//!     counts: Counts::new(10, 2, 0, 7),
//!     signal: Direction::East,
//!     manual_override: true,
//! };
//! let state = rec.settle(attempt, Some(reading), SystemTime::now()).unwrap();
//!
//! assert_eq!(state.active_signal, Direction::East);
//! assert_eq!(rec.status(), ConnectivityStatus::Live);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): Enable serialization/deserialization
//!
//! ## Modules
//!
//! - [`direction`]: The four intersection approaches
//! - [`state`]: State record, counts and connectivity status
//! - [`fallback`]: Range-bounded pseudo traffic used while disconnected
//! - [`reconcile`]: Poll bookkeeping and the single state writer

#[path = "core/direction.rs"]
pub mod direction;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/state.rs"]
pub mod state;

#[path = "core/fallback.rs"]
pub mod fallback;

#[path = "core/reconcile.rs"]
pub mod reconcile;

/// Prelude module for convenient imports.
///
/// ```
/// use crossing::prelude::*;
/// ```
pub mod prelude {
    pub use crate::direction::{Direction, ParseDirectionError};
    pub use crate::fallback::{CountRange, FallbackRanges, FallbackSimulator, RangeError};
    pub use crate::reconcile::{Attempt, Ledger, Reconciler};
    pub use crate::state::{
        ConnectivityStatus, CountSource, Counts, IntersectionState, Lamp, SignalLamp, SignalReading,
    };
}
