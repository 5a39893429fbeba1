use clap::Parser;
use std::path::PathBuf;

/// Redis dashboard: polls a Redis server's INFO statistics and serves them over HTTP.
///
/// Flags left unset fall back to the config file and then to the built-in defaults.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// The host redis server can be found on [default: localhost]
    #[arg(long = "redis-host", env = "REDIS_DASHBOARD_REDIS_HOST", value_name = "HOST")]
    pub redis_host: Option<String>,

    /// The port the redis server is running on [default: 6379]
    #[arg(long = "redis-port", env = "REDIS_DASHBOARD_REDIS_PORT", value_name = "PORT")]
    pub redis_port: Option<u16>,

    /// The password for authentication
    #[arg(
        long = "redis-password",
        env = "REDIS_DASHBOARD_REDIS_PASSWORD",
        value_name = "PASSWORD",
        hide_env_values = true
    )]
    pub redis_password: Option<String>,

    /// The redis database to connect to [default: 0]
    #[arg(long = "redis-db", env = "REDIS_DASHBOARD_REDIS_DB", value_name = "DB")]
    pub redis_db: Option<u32>,

    /// The address to run the server on [default: localhost]
    #[arg(long = "srv-host", env = "REDIS_DASHBOARD_SRV_HOST", value_name = "HOST")]
    pub server_host: Option<String>,

    /// The port to run the server on [default: 3000]
    #[arg(long = "srv-port", env = "REDIS_DASHBOARD_SRV_PORT", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Directory served under `/static/` [default: static]
    #[arg(long = "static-dir", env = "REDIS_DASHBOARD_STATIC_DIR", value_name = "DIR")]
    pub static_dir: Option<PathBuf>,

    /// Directory holding `layout.html` and `index.html` [default: templates]
    #[arg(long = "template-dir", env = "REDIS_DASHBOARD_TEMPLATE_DIR", value_name = "DIR")]
    pub template_dir: Option<PathBuf>,

    /// How often INFO is polled, e.g. "5s" or "1m" [default: 5s]
    #[arg(long, env = "REDIS_DASHBOARD_INTERVAL", value_name = "DURATION")]
    pub interval: Option<String>,

    /// Number of snapshots kept in memory [default: 120]
    #[arg(long, env = "REDIS_DASHBOARD_HISTORY", value_name = "COUNT")]
    pub history: Option<usize>,

    /// YAML config file. Defaults to `config.yaml` in the config directory, if present.
    #[arg(short, long, env = "REDIS_DASHBOARD_CONFIG_FILE", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(host) = &self.redis_host {
                cache.insert("redis.host".to_string(), host.clone().into());
            }
            if let Some(port) = self.redis_port {
                cache.insert("redis.port".to_string(), i64::from(port).into());
            }
            if let Some(password) = &self.redis_password {
                cache.insert("redis.password".to_string(), password.clone().into());
            }
            if let Some(db) = self.redis_db {
                cache.insert("redis.database".to_string(), i64::from(db).into());
            }
            if let Some(host) = &self.server_host {
                cache.insert("server.host".to_string(), host.clone().into());
            }
            if let Some(port) = self.server_port {
                cache.insert("server.port".to_string(), i64::from(port).into());
            }
            if let Some(dir) = &self.static_dir {
                cache.insert("server.static_dir".to_string(), dir.display().to_string().into());
            }
            if let Some(dir) = &self.template_dir {
                cache.insert("server.template_dir".to_string(), dir.display().to_string().into());
            }
            if let Some(interval) = &self.interval {
                cache.insert("stats.interval".to_string(), interval.clone().into());
            }
            if let Some(history) = self.history {
                let history = i64::try_from(history)
                    .map_err(|_| config::ConfigError::Message(format!("History size {history} is too large")))?;
                cache.insert("stats.history".to_string(), history.into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let version = clap::crate_version!();
    let config_dir_path = crate::get_config_dir().display().to_string();

    format!(
        "\
Version - v{version}

Config directory: {config_dir_path}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Source as _;

    #[test]
    fn only_passed_flags_become_config_values() {
        let args = Args::try_parse_from(["redis-dashboard", "--redis-port", "6380", "--history", "10"]).unwrap();
        let values = args.collect().unwrap();

        assert_eq!(values.len(), 2);
        assert_eq!(values["redis.port"].clone().into_int().unwrap(), 6380);
        assert_eq!(values["stats.history"].clone().into_int().unwrap(), 10);
    }

    #[test]
    fn oversized_history_is_an_error() {
        let args = Args {
            history: Some(usize::MAX),
            ..Default::default()
        };
        let err = args.collect().unwrap_err();
        assert!(err.to_string().contains("too large"), "{err}");
    }
}
