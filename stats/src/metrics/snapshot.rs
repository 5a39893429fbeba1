use super::{
    KeyspaceEntry,
    RedisInfo,
};
use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

/// Statistics of one `INFO` poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub created_at: DateTime<Utc>,

    // Server
    pub redis_version: String,
    pub uptime_in_seconds: u64,

    // Clients
    pub connected_clients: u64,
    pub blocked_clients: u64,

    // Memory
    pub used_memory: u64,
    pub used_memory_peak: u64,

    // Stats
    pub total_connections_received: u64,
    pub total_commands_processed: u64,
    pub instantaneous_ops_per_sec: u64,
    pub keyspace_hits: u64,
    pub keyspace_misses: u64,
    /// keyspace hits / (keyspace hits + keyspace misses)
    pub hit_rate: f64,
    pub expired_keys: u64,
    pub evicted_keys: u64,

    // Keyspace
    pub total_keys: u64,
    pub keyspace: Vec<KeyspaceEntry>,
}

impl StatsSnapshot {
    /// Missing or non-numeric fields are read as zero.
    pub fn from_info(info: &RedisInfo, created_at: DateTime<Utc>) -> Self {
        let field = |key: &str| info.get_u64(key).unwrap_or_default();

        let keyspace = info.keyspace();
        let keyspace_hits = field("keyspace_hits");
        let keyspace_misses = field("keyspace_misses");

        Self {
            created_at,
            redis_version: info.get("redis_version").unwrap_or_default().to_string(),
            uptime_in_seconds: field("uptime_in_seconds"),
            connected_clients: field("connected_clients"),
            blocked_clients: field("blocked_clients"),
            used_memory: field("used_memory"),
            used_memory_peak: field("used_memory_peak"),
            total_connections_received: field("total_connections_received"),
            total_commands_processed: field("total_commands_processed"),
            instantaneous_ops_per_sec: field("instantaneous_ops_per_sec"),
            keyspace_hits,
            keyspace_misses,
            hit_rate: hit_rate(keyspace_hits, keyspace_misses),
            expired_keys: field("expired_keys"),
            evicted_keys: field("evicted_keys"),
            total_keys: keyspace.iter().map(|db| db.keys).sum(),
            keyspace,
        }
    }

    pub fn used_memory_mb(&self) -> f64 {
        self.used_memory as f64 / (1024.0 * 1024.0)
    }
}

pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits.saturating_add(misses);
    if total == 0 {
        return 0.0;
    }
    hits as f64 / total as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::info::tests::SAMPLE_INFO;
    use pretty_assertions::assert_eq;

    #[test]
    fn snapshot_from_info() {
        let now = Utc::now();
        let snapshot = StatsSnapshot::from_info(&RedisInfo::parse(SAMPLE_INFO), now);

        assert_eq!(snapshot.created_at, now);
        assert_eq!(snapshot.redis_version, "7.2.4");
        assert_eq!(snapshot.connected_clients, 12);
        assert_eq!(snapshot.used_memory, 1_048_576);
        assert_eq!(snapshot.used_memory_mb(), 1.0);
        assert_eq!(snapshot.instantaneous_ops_per_sec, 25);
        assert_eq!(snapshot.keyspace_hits, 90);
        assert_eq!(snapshot.keyspace_misses, 10);
        assert_eq!(snapshot.hit_rate, 0.9);
        assert_eq!(snapshot.total_keys, 15);
        assert_eq!(snapshot.keyspace.len(), 2);
    }

    #[test]
    fn missing_fields_are_zero() {
        let snapshot = StatsSnapshot::from_info(&RedisInfo::parse("# Server\nredis_version:6.0.0\n"), Utc::now());

        assert_eq!(snapshot.redis_version, "6.0.0");
        assert_eq!(snapshot.used_memory, 0);
        assert_eq!(snapshot.hit_rate, 0.0);
        assert_eq!(snapshot.total_keys, 0);
        assert!(snapshot.keyspace.is_empty());
    }

    #[test]
    fn hit_rate_edges() {
        assert_eq!(hit_rate(0, 0), 0.0);
        assert_eq!(hit_rate(5, 0), 1.0);
        assert_eq!(hit_rate(0, 5), 0.0);
        assert_eq!(hit_rate(1, 3), 0.25);
    }

    #[test]
    fn serializes_the_fields_the_dashboard_plots() {
        let snapshot = StatsSnapshot::from_info(&RedisInfo::parse(SAMPLE_INFO), Utc::now());
        let json = serde_json::to_value(&snapshot).unwrap();

        for key in ["created_at", "hit_rate", "keyspace_misses", "used_memory", "instantaneous_ops_per_sec"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }
}
