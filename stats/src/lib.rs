//! # Redis Dashboard Stats
//!
//! Collects runtime statistics from a Redis server for the dashboard.
//!
//! ## Architecture
//!
//! - **`metrics`**: parsing of the `INFO` reply and the [`StatsSnapshot`] built from it
//! - **`collectors`**: the [`StatsSource`] seam, its Redis implementation and the collection loop
//! - **`history`**: the bounded, shared [`StatsHistory`] the HTTP handlers read from
//!
//! ## Lifecycle
//!
//! ```text
//! RedisStats::connect_with(..) ──► StatsCollector::run(shutdown) ──► disconnect on cancel
//!                                         │
//!                                         └──► StatsHistory::push(snapshot)
//! ```

#[macro_use]
extern crate tracing;

pub mod collectors;
pub mod history;
pub mod metrics;
#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use collectors::*;
pub use history::StatsHistory;
pub use metrics::*;
