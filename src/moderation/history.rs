//! Bounded audit trail of resolved posts
//!
//! Every post that leaves a queue as sent or rejected is recorded here. The
//! trail is in-memory only and evicts the oldest record once full.

use crate::moderation::types::ModerationRecord;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Default number of records kept.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Capacity-limited record of terminal moderation transitions.
#[derive(Clone)]
pub struct ModerationHistory {
    inner: Arc<RwLock<HistoryInner>>,
}

struct HistoryInner {
    /// front = oldest
    records: VecDeque<ModerationRecord>,
    capacity: usize,
}

impl ModerationHistory {
    /// Create a trail holding at most `capacity` records (0 disables recording).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HistoryInner {
                records: VecDeque::with_capacity(capacity.min(1024)),
                capacity,
            })),
        }
    }

    /// Append a record, evicting the oldest at capacity.
    pub async fn record(&self, record: ModerationRecord) {
        let mut inner = self.inner.write().await;
        if inner.capacity == 0 {
            return;
        }
        if inner.records.len() >= inner.capacity {
            inner.records.pop_front();
        }
        inner.records.push_back(record);
    }

    /// Records for one agent, oldest first.
    pub async fn for_agent(&self, agent_id: &str) -> Vec<ModerationRecord> {
        self.inner
            .read()
            .await
            .records
            .iter()
            .filter(|r| r.agent_id == agent_id)
            .cloned()
            .collect()
    }
}
