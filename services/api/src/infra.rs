use impact_sim::simulation::{
    InterventionSelection, ModelStrictness, SimulationResult, SimulationService,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) service: Arc<SimulationService>,
    pub(crate) cache: Arc<SimulationCache>,
}

type CacheSlot = Arc<Mutex<Option<SimulationResult>>>;

/// Results keyed by request fingerprint. Concurrent requests for the same key wait on
/// the entry lock, so each fingerprint is computed at most once while it is cached.
pub(crate) struct SimulationCache {
    capacity: usize,
    entries: Mutex<HashMap<String, CacheSlot>>,
}

impl SimulationCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().expect("cache mutex poisoned").len()
    }

    /// Returns the result and whether it came from the cache. Errors are never stored.
    pub(crate) fn get_or_compute<E>(
        &self,
        key: String,
        compute: impl FnOnce() -> Result<SimulationResult, E>,
    ) -> Result<(SimulationResult, bool), E> {
        let Some(slot) = self.slot(key) else {
            return compute().map(|result| (result, false));
        };

        let mut guard = slot.lock().expect("cache entry mutex poisoned");
        if let Some(result) = guard.as_ref() {
            return Ok((result.clone(), true));
        }

        let result = compute()?;
        *guard = Some(result.clone());
        Ok((result, false))
    }

    fn slot(&self, key: String) -> Option<CacheSlot> {
        if self.capacity == 0 {
            return None;
        }

        let mut entries = self.entries.lock().expect("cache mutex poisoned");
        if let Some(slot) = entries.get(&key).cloned() {
            return Some(slot);
        }
        if entries.len() >= self.capacity {
            return None;
        }

        let slot = CacheSlot::default();
        entries.insert(key, Arc::clone(&slot));
        Some(slot)
    }
}

/// Parses `id=intensity` pairs given on the command line.
pub(crate) fn parse_intervention(raw: &str) -> Result<InterventionSelection, String> {
    let (id, intensity) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected ID=INTENSITY, got '{raw}'"))?;

    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing intervention id in '{raw}'"));
    }

    let intensity = intensity
        .trim()
        .parse::<i64>()
        .map_err(|err| format!("invalid intensity in '{raw}' ({err})"))?;

    Ok(InterventionSelection::new(id, intensity))
}

pub(crate) fn parse_strictness(raw: &str) -> Result<ModelStrictness, String> {
    ModelStrictness::parse(raw)
        .ok_or_else(|| format!("unknown strictness '{raw}' (conservative, standard, aggressive)"))
}
