#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod environment;

pub use app_config::get_config_dir;
pub use args::Args;
pub use environment::{
    Environment,
    ENV_VAR,
};
use eyre::{
    eyre,
    Context as _,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    path::PathBuf,
    time::Duration,
};
use url::Url;

/// Connection parameters of the Redis server whose statistics are collected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub database: u32,
}

/// Bind address and on-disk assets of the HTTP server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub template_dir: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsConfig {
    /// Poll interval in humantime syntax.
    pub interval: String,
    pub history: usize,
}

/// Immutable snapshot of everything the dashboard needs, loaded once at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub redis: RedisConfig,
    pub server: ServerConfig,
    pub stats: StatsConfig,
    #[serde(skip)]
    pub environment: Environment,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl Config {
    /// Layers the built-in defaults, the config file and the explicitly passed flags, in that order.
    pub fn new(args: Args, environment: Environment) -> Result<Self> {
        let file = match &args.config {
            Some(path) => config::File::from(path.as_path())
                .format(config::FileFormat::Yaml)
                .required(true),
            None => config::File::from(app_config::default_config_file())
                .format(config::FileFormat::Yaml)
                .required(false),
        };

        let mut cfg: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Yaml))
            .add_source(file)
            .add_source(args)
            .build()
            .wrap_err("Failed to load configuration")?
            .try_deserialize()
            .wrap_err("Invalid configuration")?;

        cfg.environment = environment;
        cfg.validate()?;
        debug!(?cfg, "Configuration loaded");
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.collection_interval()?;
        Ok(())
    }

    pub fn collection_interval(&self) -> Result<Duration> {
        let interval = humantime::parse_duration(&self.stats.interval)
            .wrap_err_with(|| format!("Invalid collection interval '{}'", self.stats.interval))?;
        if interval.is_zero() {
            return Err(eyre!("Collection interval must be greater than zero"));
        }
        Ok(interval)
    }

    pub fn redis_url(&self) -> Result<Url> {
        self.redis.url()
    }

    pub fn redis_target(&self) -> String {
        self.redis.target()
    }

    pub fn server_address(&self) -> String {
        self.server.address()
    }
}

impl RedisConfig {
    /// `redis://[:password@]host:port/db`
    pub fn url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("redis://{}/{}", self.target(), self.database))
            .wrap_err_with(|| format!("Invalid redis address '{}'", self.target()))?;
        if let Some(password) = self.password.as_deref().filter(|p| !p.is_empty()) {
            url.set_password(Some(password))
                .map_err(|_| eyre!("Cannot set a password on redis url {url}"))?;
        }
        Ok(url)
    }

    pub fn target(&self) -> String {
        host_port(&self.host, self.port)
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        host_port(&self.host, self.port)
    }
}

fn host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}
