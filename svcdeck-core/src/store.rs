use std::sync::atomic::{AtomicU64, Ordering};

use crate::model::{Service, SystemStats};

/// Monotonic request number attached to every outstanding read.
pub type Seq = u64;

/// Hands out increasing sequence numbers for one kind of read.
///
/// Numbers start at 1 so that 0 can mean "nothing applied yet".
#[derive(Debug)]
pub struct SeqSource {
    next: AtomicU64,
}

impl SeqSource {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    pub fn next(&self) -> Seq {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for SeqSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Sequence sources for every kind of read the dashboard issues.
#[derive(Debug, Default)]
pub struct RequestSeqs {
    pub stats: SeqSource,
    pub services: SeqSource,
    pub logs: SeqSource,
}

/// One independently replaced field of the snapshot.
#[derive(Clone, Debug)]
struct Slice<T> {
    value: T,
    applied: Seq,
}

impl<T> Slice<T> {
    fn new(value: T) -> Self {
        Self { value, applied: 0 }
    }

    /// Overwrite the value if `seq` is newer than anything applied so far.
    fn replace(&mut self, seq: Seq, value: T) -> bool {
        if seq <= self.applied {
            return false;
        }
        self.value = value;
        self.applied = seq;
        true
    }
}

/// Last accepted services list and system stats.
///
/// Each field is replaced wholesale and independently; there is no merge
/// against the previous value and no transaction across the two fields.
#[derive(Clone, Debug)]
pub struct ServiceStore {
    services: Slice<Vec<Service>>,
    stats: Slice<Option<SystemStats>>,
}

impl ServiceStore {
    pub fn new() -> Self {
        Self {
            services: Slice::new(Vec::new()),
            stats: Slice::new(None),
        }
    }

    /// Returns false when the response is older than the one already applied.
    pub fn replace_services(&mut self, seq: Seq, services: Vec<Service>) -> bool {
        self.services.replace(seq, services)
    }

    pub fn replace_stats(&mut self, seq: Seq, stats: SystemStats) -> bool {
        self.stats.replace(seq, Some(stats))
    }

    pub fn services(&self) -> &[Service] {
        &self.services.value
    }

    pub fn stats(&self) -> Option<&SystemStats> {
        self.stats.value.as_ref()
    }

    pub fn services_seq(&self) -> Seq {
        self.services.applied
    }

    pub fn stats_seq(&self) -> Seq {
        self.stats.applied
    }
}

impl Default for ServiceStore {
    fn default() -> Self {
        Self::new()
    }
}
