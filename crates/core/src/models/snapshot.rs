use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::holding::Holding;
use super::record::AggregateRecord;

/// Whether the cache has ever held a computed snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Readiness {
    /// No snapshot has ever been produced.
    Cold,
    /// The first refresh cycle is in flight.
    Warming,
    /// At least one snapshot exists. Terminal.
    Warm,
}

impl Readiness {
    pub fn is_warm(self) -> bool {
        self == Readiness::Warm
    }
}

impl std::fmt::Display for Readiness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Readiness::Cold => write!(f, "COLD"),
            Readiness::Warming => write!(f, "WARMING"),
            Readiness::Warm => write!(f, "WARM"),
        }
    }
}

/// One complete, immutable computed view of all holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    /// One record per configured holding, in configuration order.
    pub records: Vec<AggregateRecord>,

    /// Completion time of the cycle that built this snapshot.
    /// `None` only for the cold placeholder.
    pub captured_at: Option<DateTime<Utc>>,

    /// Strictly increasing per committed snapshot; 0 is the placeholder.
    pub generation: u64,
}

impl PortfolioSnapshot {
    pub fn new(records: Vec<AggregateRecord>, captured_at: DateTime<Utc>, generation: u64) -> Self {
        Self {
            records,
            captured_at: Some(captured_at),
            generation,
        }
    }

    /// Every holding present, every computed field unavailable.
    pub fn placeholder(holdings: &[Holding]) -> Self {
        Self {
            records: holdings.iter().map(AggregateRecord::placeholder).collect(),
            captured_at: None,
            generation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Time elapsed since capture, if this is a real snapshot.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.captured_at
            .map(|at| (now - at).to_std().unwrap_or(Duration::ZERO))
    }
}

/// What a reader gets from the cache: a snapshot plus its readiness tag.
#[derive(Debug, Clone)]
pub struct CacheView {
    pub snapshot: Arc<PortfolioSnapshot>,
    pub readiness: Readiness,
}

impl CacheView {
    /// True when the snapshot is older than `threshold`.
    /// A placeholder is never stale; it is reported through readiness instead.
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.snapshot
            .age(now)
            .is_some_and(|age| age > threshold)
    }
}
