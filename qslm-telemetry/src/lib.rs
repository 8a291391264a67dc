//! Lightweight telemetry facade for the learning matrix binaries. The goal
//! is structured counters, latency series, and score series without external
//! exporters, so tests can assert instrumentation behavior directly.

use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
    time::SystemTime,
};
use thiserror::Error;

#[cfg(any(
    all(feature = "dev", feature = "test"),
    all(feature = "dev", feature = "prod"),
    all(feature = "test", feature = "prod")
))]
compile_error!("Only one of the `dev`, `test`, or `prod` features may be enabled for qslm-telemetry.");

#[cfg(feature = "test")]
const DEFAULT_FLUSH_MS: u64 = 500;
#[cfg(feature = "prod")]
const DEFAULT_FLUSH_MS: u64 = 5_000;
#[cfg(not(any(feature = "test", feature = "prod")))]
const DEFAULT_FLUSH_MS: u64 = 1_000;

fn default_flush_interval_ms() -> u64 {
    DEFAULT_FLUSH_MS
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct TelemetryConfig {
    /// Endpoint where telemetry would be shipped (not used in the in-process impl).
    pub endpoint: String,
    /// Flush cadence in milliseconds.
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,
    /// Global labels appended to every snapshot.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl TelemetryConfig {
    pub fn sample(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_owned(),
            flush_interval_ms: default_flush_interval_ms(),
            labels: BTreeMap::from([("component".into(), "learning-matrix".into())]),
        }
    }
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("counter overflow for metric {0}")]
    CounterOverflow(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TelemetrySnapshot {
    pub timestamp: SystemTime,
    pub labels: BTreeMap<String, String>,
    pub counters: BTreeMap<String, u64>,
    pub latencies_ms: BTreeMap<String, Vec<u64>>,
    pub scores: BTreeMap<String, Vec<f64>>,
}

#[derive(Default)]
struct TelemetryState {
    counters: BTreeMap<String, u64>,
    latencies_ms: BTreeMap<String, Vec<u64>>,
    scores: BTreeMap<String, Vec<f64>>,
}

#[derive(Clone)]
pub struct TelemetryHandle {
    config: TelemetryConfig,
    state: Arc<Mutex<TelemetryState>>,
}

impl TelemetryHandle {
    pub fn from_config(config: TelemetryConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(TelemetryState::default())),
        }
    }

    pub fn record_counter(&self, name: &str, delta: u64) -> Result<(), TelemetryError> {
        let mut guard = self.state.lock().unwrap();
        let entry = guard.counters.entry(name.to_owned()).or_default();
        *entry = entry
            .checked_add(delta)
            .ok_or_else(|| TelemetryError::CounterOverflow(name.to_owned()))?;
        Ok(())
    }

    pub fn record_latency_ms(&self, name: &str, value: u64) {
        let mut guard = self.state.lock().unwrap();
        guard
            .latencies_ms
            .entry(name.to_owned())
            .or_default()
            .push(value);
    }

    /// Record a bounded series value, e.g. a mastery percentage or an
    /// attention score.
    pub fn record_score(&self, name: &str, value: f64) {
        let mut guard = self.state.lock().unwrap();
        guard.scores.entry(name.to_owned()).or_default().push(value);
    }

    pub fn flush(&self) -> TelemetrySnapshot {
        let mut guard = self.state.lock().unwrap();
        let snapshot = TelemetrySnapshot {
            timestamp: SystemTime::now(),
            labels: self.config.labels.clone(),
            counters: guard.counters.clone(),
            latencies_ms: guard.latencies_ms.clone(),
            scores: guard.scores.clone(),
        };
        guard.counters.clear();
        guard.latencies_ms.clear();
        guard.scores.clear();
        snapshot
    }

    pub fn flush_interval(&self) -> u64 {
        self.config.flush_interval_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle() -> TelemetryHandle {
        TelemetryHandle::from_config(TelemetryConfig::sample("http://localhost:4318"))
    }

    #[test]
    fn records_counters_latencies_and_scores() {
        let handle = handle();
        handle.record_counter("learn.completed", 1).unwrap();
        handle.record_counter("learn.completed", 2).unwrap();
        handle.record_latency_ms("pipeline", 42);
        handle.record_score("mastery.pct", 87.5);
        let snapshot = handle.flush();
        assert_eq!(snapshot.counters["learn.completed"], 3);
        assert_eq!(snapshot.latencies_ms["pipeline"], vec![42]);
        assert_eq!(snapshot.scores["mastery.pct"], vec![87.5]);
    }

    #[test]
    fn detects_counter_overflow() {
        let handle = handle();
        handle.record_counter("learn.completed", u64::MAX).unwrap();
        let err = handle.record_counter("learn.completed", 1).unwrap_err();
        assert!(matches!(err, TelemetryError::CounterOverflow(_)));
    }

    #[test]
    fn flush_clears_state() {
        let handle = handle();
        handle.record_counter("learn.completed", 1).unwrap();
        handle.record_score("mastery.pct", 10.0);
        handle.flush();
        let second = handle.flush();
        assert!(second.counters.is_empty());
        assert!(second.scores.is_empty());
    }
}
