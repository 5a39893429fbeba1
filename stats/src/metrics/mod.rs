pub mod info;
pub mod snapshot;

// Re-export the main types for easy access
pub use info::*;
pub use snapshot::*;
