//! # Collectors Module
//!
//! - **`StatsSource` trait**: anything that can answer `INFO`
//! - **`RedisStats`**: the `StatsSource` talking to a real Redis server
//! - **`StatsCollector`**: the background loop polling a source until shutdown

pub mod collector;
pub mod redis_source;
pub mod source;

// Re-export the main types for easy access
pub use collector::{
    CollectionReport,
    StatsCollector,
};
pub use redis_source::RedisStats;
pub use source::StatsSource;
