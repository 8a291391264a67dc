use crate::explain::{fallback_explanation, ExplanationProvider, ExplanationRequest};
use crate::stats::SessionStats;
use crate::types::{chain_digest, genesis_digest, LearnRequest, LearningRecord};
use anyhow::{bail, Context};
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use qslm_engine::{EngineConfig, LearningEngine};
use qslm_telemetry::{TelemetryConfig, TelemetryHandle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    pub engine: EngineConfig,
    pub telemetry_endpoint: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            telemetry_endpoint: "http://localhost:4318".to_string(),
        }
    }
}

/// History and chain head move together so append order always matches
/// digest order.
struct HistoryState {
    records: Vec<Arc<LearningRecord>>,
    head: blake3::Hash,
}

/// Orchestrates learn cycles around the stateless engine.
///
/// Owns everything the core does not: request validation, the explanation
/// provider, the append-ordered record history with its digest chain, the
/// per-concept index, stats, and telemetry. Concurrent learns only serialize
/// on the history append.
pub struct LearningSession {
    engine: LearningEngine,
    explainer: Arc<dyn ExplanationProvider>,
    telemetry: TelemetryHandle,
    stats: Mutex<SessionStats>,
    history: Mutex<HistoryState>,
    latest: DashMap<String, Arc<LearningRecord>>,
}

impl LearningSession {
    pub fn new(cfg: SessionConfig, explainer: Arc<dyn ExplanationProvider>) -> Self {
        let telemetry =
            TelemetryHandle::from_config(TelemetryConfig::sample(&cfg.telemetry_endpoint));
        Self {
            engine: LearningEngine::new(cfg.engine),
            explainer,
            telemetry,
            stats: Mutex::new(SessionStats::default()),
            history: Mutex::new(HistoryState {
                records: Vec::new(),
                head: genesis_digest(),
            }),
            latest: DashMap::new(),
        }
    }

    pub fn telemetry(&self) -> &TelemetryHandle {
        &self.telemetry
    }

    pub fn stats(&self) -> SessionStats {
        self.stats.lock().clone()
    }

    /// Run one full learning cycle and append the resulting record.
    ///
    /// The explanation call is the only await point; a provider failure is
    /// logged and replaced with fallback text, leaving the record valid.
    pub async fn learn(&self, request: LearnRequest) -> anyhow::Result<Arc<LearningRecord>> {
        let concept = request.concept.trim();
        if concept.is_empty() {
            self.stats.lock().requests.rejected += 1;
            self.telemetry
                .record_counter("learn.rejected", 1)
                .context("telemetry")?;
            bail!("concept is required");
        }

        let has_signal = request
            .channels
            .as_ref()
            .map_or(false, |channels| !channels.is_empty());

        let pipeline_started = Instant::now();
        let outcome = match self
            .engine
            .learn(concept, request.channels.as_deref(), request.seed)
        {
            Ok(outcome) => outcome,
            Err(err) => {
                self.stats.lock().requests.rejected += 1;
                self.telemetry
                    .record_counter("learn.rejected", 1)
                    .context("telemetry")?;
                return Err(err).context("quantum pipeline");
            }
        };
        let pipeline_ms = pipeline_started.elapsed().as_millis() as u64;

        let explain_started = Instant::now();
        let explanation = match self
            .explainer
            .explain(ExplanationRequest {
                concept,
                mastery: outcome.mastery,
                signal: &outcome.signal,
            })
            .await
        {
            Ok(text) => text,
            Err(err) => {
                warn!(concept, error = %err, "explanation provider failed, using fallback");
                self.stats.lock().requests.fallback_explanations += 1;
                self.telemetry
                    .record_counter("explain.fallback", 1)
                    .context("telemetry")?;
                fallback_explanation(concept)
            }
        };
        let explain_ms = explain_started.elapsed().as_millis() as u64;

        let record = {
            let mut state = self.history.lock();
            let mut record = LearningRecord {
                concept: concept.to_owned(),
                embedding: outcome.embedding,
                circuit: outcome.circuit,
                distribution: outcome.distribution,
                mastery: outcome.mastery,
                signal: outcome.signal,
                explanation,
                recorded_at: Utc::now(),
                prev_digest: state.head.to_hex().to_string(),
                digest: String::new(),
            };
            let payload = record.digest_payload().context("serialize record body")?;
            let digest = chain_digest(&state.head, &payload);
            record.digest = digest.to_hex().to_string();

            let record = Arc::new(record);
            state.records.push(record.clone());
            state.head = digest;
            record
        };

        {
            let mut stats = self.stats.lock();
            stats.requests.completed += 1;
            stats.mastery_pct.record_scaled(record.mastery.percent(), 100.0);
            stats.pipeline_latency_ms.record(pipeline_ms.max(1));
            stats.explain_latency_ms.record(explain_ms.max(1));
            if has_signal {
                stats.signal.with_signal += 1;
                stats.attention.record_scaled(record.signal.attention, 1_000.0);
                if record.signal.optimal {
                    stats.signal.optimal += 1;
                }
            }
        }

        self.telemetry
            .record_counter("learn.completed", 1)
            .context("telemetry")?;
        self.telemetry.record_latency_ms("latency.pipeline_ms", pipeline_ms);
        self.telemetry.record_latency_ms("latency.explain_ms", explain_ms);
        self.telemetry.record_score("mastery.pct", record.mastery.percent());
        if has_signal {
            self.telemetry
                .record_score("signal.attention", record.signal.attention);
        }

        self.latest.insert(record.concept.clone(), record.clone());
        info!(
            concept,
            mastery_pct = record.mastery.percent(),
            outcomes = record.distribution.support(),
            depth = record.circuit.depth(),
            "learn cycle completed"
        );

        Ok(record)
    }

    /// Accumulated records in append order.
    pub fn history(&self) -> Vec<Arc<LearningRecord>> {
        self.history.lock().records.clone()
    }

    /// Drop the accumulated history and per-concept index and restart the
    /// digest chain. Operational counters survive; the engine is stateless
    /// and unaffected.
    pub fn reset(&self) -> anyhow::Result<()> {
        {
            let mut state = self.history.lock();
            state.records.clear();
            state.head = genesis_digest();
        }
        self.latest.clear();
        self.telemetry
            .record_counter("session.reset", 1)
            .context("telemetry")?;
        info!("session history cleared");
        Ok(())
    }

    /// Operator-facing summary: latest mastery per concept plus request and
    /// score aggregates.
    pub fn snapshot_kv(&self) -> BTreeMap<String, String> {
        let mut kv: BTreeMap<String, String> = self
            .latest
            .iter()
            .map(|entry| {
                (
                    format!("mastery|{}", entry.key()),
                    format!("{:.2}", entry.value().mastery.percent()),
                )
            })
            .collect();

        let stats = self.stats.lock();
        kv.insert(
            "requests|completed".into(),
            stats.requests.completed.to_string(),
        );
        kv.insert(
            "requests|rejected".into(),
            stats.requests.rejected.to_string(),
        );
        kv.insert(
            "requests|rejection_rate".into(),
            format!("{:.4}", stats.requests.rejection_rate()),
        );
        if stats.mastery_pct.count() > 0 {
            kv.insert(
                "mastery|p50".into(),
                format!("{:.2}", stats.mastery_pct.p50() as f64 / 100.0),
            );
            kv.insert(
                "mastery|p90".into(),
                format!("{:.2}", stats.mastery_pct.p90() as f64 / 100.0),
            );
        }
        if stats.signal.with_signal > 0 {
            kv.insert(
                "signal|optimal_rate".into(),
                format!("{:.4}", stats.signal.optimal_rate()),
            );
        }
        kv
    }
}
