use eyre::{
    Context as _,
    Result,
};
use redis_dashboard_config::{
    Args,
    Config,
    Environment,
};
use redis_dashboard_http::AppState;
use redis_dashboard_stats::{
    RedisStats,
    StatsCollector,
    StatsHistory,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Wires the configuration, the stats collection loop and the HTTP server together.
pub struct App {
    config: Config,
}

impl App {
    pub fn new(args: Args, environment: Environment) -> Result<Self> {
        Ok(Self::with_config(Config::new(args, environment)?))
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs until the process receives an interrupt.
    pub async fn run(self) -> Result<()> {
        let shutdown = CancellationToken::new();
        tokio::spawn(listen_for_interrupt(shutdown.clone()));
        self.run_until(shutdown).await
    }

    /// Runs until `shutdown` is cancelled.
    ///
    /// A failed redis connection returns before anything listens. Otherwise the collection loop is
    /// always stopped and awaited before this returns, whatever happened to the HTTP server.
    #[instrument(level = "debug", skip_all)]
    pub async fn run_until(self, shutdown: CancellationToken) -> Result<()> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.config.environment,
            "Starting redis dashboard"
        );
        let interval = self.config.collection_interval()?;

        info!(redis = %self.config.redis_target(), "Connecting to redis server");
        let client = RedisStats::connect_with(&self.config.redis)
            .await
            .inspect_err(|err| error!("{err:#}"))?;
        info!("Connected to redis server");

        let history = StatsHistory::new(self.config.stats.history);
        let collection = tokio::spawn(StatsCollector::new(client, history.clone(), interval).run(shutdown.clone()));

        let served = self.serve(history, shutdown.clone()).await;
        if let Err(err) = &served {
            error!("{err:#}");
        }

        shutdown.cancel();
        let report = collection.await.wrap_err("Stats collection task failed")?;
        debug!(?report, "Stats collection finished");

        served
    }

    async fn serve(&self, history: StatsHistory, shutdown: CancellationToken) -> Result<()> {
        let address = self.config.server_address();
        let listener = TcpListener::bind(address.as_str())
            .await
            .wrap_err_with(|| format!("Failed to listen on {address}"))?;

        redis_dashboard_http::serve(
            listener,
            AppState::new(&self.config, history),
            shutdown.cancelled_owned(),
        )
        .await
    }
}

async fn listen_for_interrupt(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for interrupts: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{
            signal,
            SignalKind,
        };
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(err) => {
                error!("Failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received interrupt, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
        _ = shutdown.cancelled() => return,
    }

    shutdown.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use redis_dashboard_stats::testing::{
        FakeRedis,
        RunningFakeRedis,
    };
    use std::time::Duration;
    use tokio::{
        io::{
            AsyncReadExt as _,
            AsyncWriteExt as _,
        },
        net::TcpStream,
        task::JoinHandle,
    };

    const INFO: &str = "# Server\r\nredis_version:7.2.4\r\n# Clients\r\nconnected_clients:3\r\n";

    fn free_port() -> u16 {
        std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port()
    }

    fn unreachable_redis_config(server_port: u16) -> Config {
        let mut config = Config::default();
        config.redis.host = "127.0.0.1".to_string();
        config.redis.port = 1;
        config.server.host = "127.0.0.1".to_string();
        config.server.port = server_port;
        config
    }

    #[tokio::test]
    async fn redis_connection_failure_aborts_startup() {
        let port = free_port();
        let app = App::with_config(unreachable_redis_config(port));

        let result = tokio::time::timeout(Duration::from_secs(10), app.run_until(CancellationToken::new()))
            .await
            .expect("startup must fail fast");

        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("Failed to connect to redis at 127.0.0.1:1"), "{err:#}");
        // Nothing was left listening on the HTTP port.
        assert!(std::net::TcpListener::bind(("127.0.0.1", port)).is_ok());
    }

    #[tokio::test]
    async fn invalid_interval_is_rejected_before_connecting() {
        let mut config = unreachable_redis_config(free_port());
        config.stats.interval = "whenever".to_string();

        let err = App::with_config(config).run_until(CancellationToken::new()).await.unwrap_err();
        assert!(format!("{err:#}").contains("Invalid collection interval"), "{err:#}");
    }

    fn fake_redis_config(redis: &RunningFakeRedis, interval: &str) -> Config {
        let mut config = unreachable_redis_config(free_port());
        config.redis = redis.config();
        config.stats.interval = interval.to_string();
        config
    }

    /// `GET path` over a fresh connection. `None` while nothing accepts on the address.
    async fn http_get(address: &str, path: &str) -> Option<String> {
        let mut stream = TcpStream::connect(address).await.ok()?;
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.ok()?;
        let mut response = String::new();
        stream.read_to_string(&mut response).await.ok()?;
        Some(response)
    }

    async fn wait_for_ok(address: &str, path: &str) -> String {
        tokio::time::timeout(Duration::from_secs(10), async {
            loop {
                match http_get(address, path).await {
                    Some(response) if response.starts_with("HTTP/1.1 200") => return response,
                    _ => tokio::time::sleep(Duration::from_millis(20)).await,
                }
            }
        })
        .await
        .unwrap_or_else(|_| panic!("{path} never answered 200 on {address}"))
    }

    async fn stop(shutdown: CancellationToken, running: JoinHandle<Result<()>>) -> Result<()> {
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), running)
            .await
            .expect("shutdown must finish promptly")
            .expect("app task must not panic")
    }

    #[tokio::test]
    async fn serves_collected_stats_and_shuts_down_cleanly() {
        let redis = FakeRedis::new(INFO).spawn().await.unwrap();
        let config = fake_redis_config(&redis, "50ms");
        let address = config.server_address();

        let shutdown = CancellationToken::new();
        let running = tokio::spawn(App::with_config(config).run_until(shutdown.clone()));

        wait_for_ok(&address, "/healthz").await;
        let latest = wait_for_ok(&address, "/api/stats/latest").await;
        assert!(latest.contains("\"redis_version\":\"7.2.4\""), "{latest}");
        assert!(latest.contains("\"connected_clients\":3"), "{latest}");
        assert_eq!(redis.open_connections(), 1);

        stop(shutdown, running).await.unwrap();

        // The listener is gone and the redis connection was closed.
        assert!(http_get(&address, "/healthz").await.is_none());
        tokio::time::timeout(Duration::from_secs(5), async {
            while redis.open_connections() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("the redis connection must be closed after shutdown");
    }

    #[tokio::test]
    async fn shuts_down_while_redis_stalls_on_info() {
        let redis = FakeRedis::new(INFO).stall_on("INFO").spawn().await.unwrap();
        let config = fake_redis_config(&redis, "100ms");
        let address = config.server_address();

        let shutdown = CancellationToken::new();
        let running = tokio::spawn(App::with_config(config).run_until(shutdown.clone()));

        wait_for_ok(&address, "/healthz").await;
        tokio::time::sleep(Duration::from_millis(300)).await;

        stop(shutdown, running).await.unwrap();
    }

    #[tokio::test]
    async fn interrupt_listener_returns_once_cancelled() {
        let shutdown = CancellationToken::new();
        let listener = tokio::spawn(listen_for_interrupt(shutdown.clone()));

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), listener)
            .await
            .expect("listener must stop after cancellation")
            .unwrap();
        assert!(shutdown.is_cancelled());
    }

    #[test]
    fn keeps_the_config() {
        let config = Config::default();
        assert_eq!(App::with_config(config.clone()).config(), &config);
    }
}
