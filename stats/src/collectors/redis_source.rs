use crate::collectors::StatsSource;
use eyre::{
    eyre,
    Context as _,
    OptionExt as _,
    Result,
};
use redis::aio::MultiplexedConnection;
use redis_dashboard_config::RedisConfig;
use std::{
    future::Future,
    pin::Pin,
    time::Duration,
};
use url::Url;

/// Bound on connecting plus the first `PING`.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Stats client backed by a real Redis server.
pub struct RedisStats {
    url: Url,
    target: String,
    connect_timeout: Duration,
    connection: Option<MultiplexedConnection>,
}

impl RedisStats {
    pub fn new(config: &RedisConfig) -> Result<Self> {
        Ok(Self {
            url: config.url()?,
            target: config.target(),
            connect_timeout: CONNECT_TIMEOUT,
            connection: None,
        })
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Convenience for `new` followed by `connect`.
    pub async fn connect_with(config: &RedisConfig) -> Result<Self> {
        let mut stats = Self::new(config)?;
        stats.connect().await?;
        Ok(stats)
    }

    /// Opens the connection and checks it with a `PING`, both within the connect timeout. No retries.
    pub async fn connect(&mut self) -> Result<()> {
        let client = redis::Client::open(self.url.as_str())
            .wrap_err_with(|| format!("Invalid redis connection parameters for {}", self.target))?;

        let handshake = async {
            let mut connection = client
                .get_multiplexed_async_connection()
                .await
                .wrap_err_with(|| format!("Failed to connect to redis at {}", self.target))?;

            let pong: String = redis::cmd("PING")
                .query_async(&mut connection)
                .await
                .wrap_err_with(|| format!("Redis at {} did not answer PING", self.target))?;
            debug!(redis = %self.target, %pong, "Redis answered PING");

            Ok::<_, eyre::Report>(connection)
        };

        let connection = tokio::time::timeout(self.connect_timeout, handshake)
            .await
            .map_err(|_| eyre!("Timed out connecting to redis at {}", self.target))??;

        self.connection = Some(connection);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

impl StatsSource for RedisStats {
    fn info(&mut self) -> Pin<Box<dyn Future<Output = Result<String>> + Send + '_>> {
        Box::pin(async move {
            let connection = self
                .connection
                .as_mut()
                .ok_or_eyre("Not connected to redis")?;
            let info: String = redis::cmd("INFO")
                .query_async(connection)
                .await
                .wrap_err("INFO command failed")?;
            Ok(info)
        })
    }

    fn disconnect(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            if self.connection.take().is_some() {
                info!(redis = %self.target, "Disconnected from redis server");
            }
        })
    }

    fn name(&self) -> &str {
        &self.target
    }
}
