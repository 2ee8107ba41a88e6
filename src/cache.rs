use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use canonical::{extract, CanonicalFeatures, ExtractConfig, ParseError};
use dashmap::DashMap;
use ingest::SourceUnit;

use crate::MetricsSpan;

type Slot = Arc<Mutex<Option<Arc<CanonicalFeatures>>>>;

/// Per-run memo of extracted features, keyed by origin.
///
/// Features are built at most once per origin and shared by reference with
/// every comparison that needs them. Failed extractions are not cached.
///
/// Each origin owns its own build slot. The map shard is locked only long
/// enough to fetch the slot, so a slow parse blocks requests for that origin
/// alone.
#[derive(Debug, Default)]
pub struct FeatureCache {
    entries: DashMap<String, Slot>,
    builds: AtomicUsize,
}

impl FeatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached features for `unit`, extracting them on first request.
    pub fn get_or_extract(
        &self,
        unit: &SourceUnit,
        cfg: &ExtractConfig,
    ) -> Result<Arc<CanonicalFeatures>, ParseError> {
        let slot = self.slot(unit.origin());
        let mut built = lock(&slot);
        if let Some(hit) = built.as_ref() {
            return Ok(Arc::clone(hit));
        }

        let span = MetricsSpan::start();
        let result = extract(unit, cfg);
        if let Some(span) = span {
            span.record_extract(result.as_ref().map(|_| ()).map_err(Clone::clone));
        }
        let features = Arc::new(result?);
        self.builds.fetch_add(1, Ordering::Relaxed);
        *built = Some(Arc::clone(&features));
        Ok(features)
    }

    pub fn get(&self, origin: &str) -> Option<Arc<CanonicalFeatures>> {
        let slot = self.entries.get(origin).map(|entry| Arc::clone(entry.value()))?;
        let built = lock(&slot);
        built.clone()
    }

    /// Number of origins with built features.
    pub fn len(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| lock(entry.value()).is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of extractions performed, as opposed to cache hits.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    fn slot(&self, origin: &str) -> Slot {
        if let Some(slot) = self.entries.get(origin) {
            return Arc::clone(slot.value());
        }
        Arc::clone(self.entries.entry(origin.to_string()).or_default().value())
    }
}

fn lock(slot: &Mutex<Option<Arc<CanonicalFeatures>>>) -> MutexGuard<'_, Option<Arc<CanonicalFeatures>>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
