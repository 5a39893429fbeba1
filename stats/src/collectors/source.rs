use eyre::Result;
use std::{
    future::Future,
    pin::Pin,
};

/// Something that can answer the Redis `INFO` command.
pub trait StatsSource: Send {
    /// Fetch the raw `INFO` reply
    fn info(&mut self) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>>;

    /// Release the underlying connection. Calling it twice is harmless.
    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;

    /// Human readable target, used in logs
    fn name(&self) -> &str;
}
