//! Per-tourist position history store.
//!
//! Each evaluation reads the recent window and then appends the new
//! sample, so access per tourist must be serialized. The store keeps
//! one mutex per tourist id rather than a single global lock, keeping
//! unrelated tourists fully independent.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use safety_scoring::PositionSample;
use tokio::sync::{Mutex, RwLock};

/// Most recent samples retained per tourist.
pub const HISTORY_WINDOW: usize = 50;

/// Bounded recent-position window for one tourist.
#[derive(Debug, Default)]
pub struct PositionHistory {
    samples: VecDeque<PositionSample>,
}

impl PositionHistory {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_WINDOW),
        }
    }

    /// Append a sample, evicting the oldest past the window bound.
    pub fn push(&mut self, sample: PositionSample) {
        if self.samples.len() == HISTORY_WINDOW {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Snapshot of the window, oldest first.
    pub fn snapshot(&self) -> Vec<PositionSample> {
        self.samples.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// In-memory history store keyed by tourist id.
#[derive(Default)]
pub struct HistoryStore {
    inner: RwLock<HashMap<String, Arc<Mutex<PositionHistory>>>>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for one tourist's history, created on first use. The
    /// returned mutex serializes the read-then-append cycle.
    pub async fn entry(&self, tourist_id: &str) -> Arc<Mutex<PositionHistory>> {
        if let Some(history) = self.inner.read().await.get(tourist_id) {
            return history.clone();
        }

        let mut map = self.inner.write().await;
        map.entry(tourist_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(PositionHistory::new())))
            .clone()
    }

    pub async fn tracked_tourists(&self) -> usize {
        self.inner.read().await.len()
    }
}
