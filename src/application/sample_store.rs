// Sample store - Live and historical sample buffers
use crate::domain::measurement::Sample;
use crate::domain::selection::ViewMode;
use crate::infrastructure::config::DedupKey;
use std::collections::{HashMap, HashSet, VecDeque};

/// Append the samples of `incoming` whose key is not already in `existing`.
///
/// Order is `existing` followed by the new samples in arrival order. Only
/// `existing` is consulted, so samples sharing a key inside one poll are all kept.
/// Runs in O(n + m) and is idempotent for a repeated `incoming`.
pub fn merge_live(existing: &[Sample], incoming: &[Sample], key: DedupKey) -> Vec<Sample> {
    let seen: HashSet<(&str, Option<&str>)> =
        existing.iter().map(|s| dedup_key(s, key)).collect();

    let mut merged = Vec::with_capacity(existing.len() + incoming.len());
    merged.extend_from_slice(existing);
    merged.extend(
        incoming
            .iter()
            .filter(|s| !seen.contains(&dedup_key(s, key)))
            .cloned(),
    );
    merged
}

fn dedup_key(sample: &Sample, key: DedupKey) -> (&str, Option<&str>) {
    match key {
        DedupKey::Timestamp => (sample.timestamp.as_str(), None),
        DedupKey::TimestampAndServer => (sample.timestamp.as_str(), Some(sample.servidor.as_str())),
    }
}

type OwnedKey = (String, Option<String>);

fn owned_key(sample: &Sample, key: DedupKey) -> OwnedKey {
    let (timestamp, server) = dedup_key(sample, key);
    (timestamp.to_string(), server.map(str::to_string))
}

#[derive(Debug, Clone)]
pub struct SampleStore {
    live: VecDeque<Sample>,
    /// Keys of the samples in `live`, with how many samples carry each one.
    live_keys: HashMap<OwnedKey, usize>,
    historical: VecDeque<Sample>,
    dedup: DedupKey,
    max_live: usize,
}

impl SampleStore {
    pub fn new(dedup: DedupKey, max_live: usize) -> Self {
        Self {
            live: VecDeque::new(),
            live_keys: HashMap::new(),
            historical: VecDeque::new(),
            dedup,
            max_live: max_live.max(1),
        }
    }

    /// Merge a live poll in place; returns how many samples were new.
    ///
    /// Same result as [`merge_live`], then the oldest samples are evicted once the
    /// buffer holds more than `max_live`.
    pub fn merge_live(&mut self, incoming: &[Sample]) -> usize {
        let fresh: Vec<&Sample> = incoming
            .iter()
            .filter(|s| !self.live_keys.contains_key(&owned_key(s, self.dedup)))
            .collect();
        let added = fresh.len();

        for sample in fresh {
            *self.live_keys.entry(owned_key(sample, self.dedup)).or_default() += 1;
            self.live.push_back(sample.clone());
        }

        while self.live.len() > self.max_live {
            if let Some(evicted) = self.live.pop_front() {
                self.forget(&evicted);
            }
        }
        added
    }

    fn forget(&mut self, sample: &Sample) {
        let key = owned_key(sample, self.dedup);
        if let Some(count) = self.live_keys.get_mut(&key) {
            *count -= 1;
            if *count == 0 {
                self.live_keys.remove(&key);
            }
        }
    }

    /// Replace the historical buffer and drop any live samples.
    pub fn replace_historical(&mut self, records: Vec<Sample>) {
        self.historical = records.into();
        self.clear_live();
    }

    /// Drop historical samples when going back to live polling.
    pub fn enter_live(&mut self) {
        self.historical.clear();
    }

    pub fn clear_live(&mut self) {
        self.live.clear();
        self.live_keys.clear();
    }

    pub fn live(&self) -> &VecDeque<Sample> {
        &self.live
    }

    /// The buffer feeding the chart in `mode`; never a mix of both.
    pub fn active(&self, mode: ViewMode) -> &VecDeque<Sample> {
        match mode {
            ViewMode::Live => &self.live,
            ViewMode::Historical => &self.historical,
        }
    }
}
