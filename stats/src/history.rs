use crate::metrics::StatsSnapshot;
use std::{
    collections::VecDeque,
    sync::Arc,
};
use tokio::sync::RwLock;

/// Bounded, oldest-first ring of snapshots shared between the collection loop and the HTTP handlers.
#[derive(Debug, Clone)]
pub struct StatsHistory {
    snapshots: Arc<RwLock<VecDeque<StatsSnapshot>>>,
    capacity: usize,
}

impl StatsHistory {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn push(&self, snapshot: StatsSnapshot) {
        let mut snapshots = self.snapshots.write().await;
        while snapshots.len() >= self.capacity {
            snapshots.pop_front();
        }
        snapshots.push_back(snapshot);
    }

    pub async fn all(&self) -> Vec<StatsSnapshot> {
        self.snapshots.read().await.iter().cloned().collect()
    }

    /// The `limit` most recent snapshots, still oldest first.
    pub async fn recent(&self, limit: usize) -> Vec<StatsSnapshot> {
        let snapshots = self.snapshots.read().await;
        let skip = snapshots.len().saturating_sub(limit);
        snapshots.iter().skip(skip).cloned().collect()
    }

    pub async fn latest(&self) -> Option<StatsSnapshot> {
        self.snapshots.read().await.back().cloned()
    }

    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::RedisInfo;
    use chrono::{
        TimeZone as _,
        Utc,
    };
    use pretty_assertions::assert_eq;

    fn snapshot(second: u32) -> StatsSnapshot {
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, second).unwrap();
        StatsSnapshot::from_info(&RedisInfo::default(), created_at)
    }

    fn seconds(snapshots: &[StatsSnapshot]) -> Vec<i64> {
        snapshots.iter().map(|s| s.created_at.timestamp() % 60).collect()
    }

    #[tokio::test]
    async fn evicts_oldest_beyond_capacity() {
        let history = StatsHistory::new(3);
        for second in 0..5 {
            history.push(snapshot(second)).await;
        }

        assert_eq!(history.len().await, 3);
        assert_eq!(seconds(&history.all().await), vec![2, 3, 4]);
        assert_eq!(history.latest().await.map(|s| s.created_at.timestamp() % 60), Some(4));
    }

    #[tokio::test]
    async fn recent_keeps_order() {
        let history = StatsHistory::new(10);
        for second in 0..4 {
            history.push(snapshot(second)).await;
        }

        assert_eq!(seconds(&history.recent(2).await), vec![2, 3]);
        assert_eq!(seconds(&history.recent(100).await), vec![0, 1, 2, 3]);
        assert!(history.recent(0).await.is_empty());
    }

    #[tokio::test]
    async fn zero_capacity_keeps_one() {
        let history = StatsHistory::new(0);
        assert_eq!(history.capacity(), 1);
        assert!(history.is_empty().await);
        assert!(history.latest().await.is_none());

        history.push(snapshot(1)).await;
        history.push(snapshot(2)).await;
        assert_eq!(seconds(&history.all().await), vec![2]);
    }

    #[tokio::test]
    async fn clones_share_snapshots() {
        let history = StatsHistory::new(2);
        let reader = history.clone();
        history.push(snapshot(7)).await;
        assert_eq!(reader.len().await, 1);
    }
}
