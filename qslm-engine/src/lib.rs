//! Quantum self-learning matrix core.
//!
//! This crate turns a concept string into a small quantum register, executes
//! it on an exact state-vector simulator, and derives a mastery score from
//! the measurement distribution, optionally modulated by synthetic
//! brain-activity signals. The pipeline is pure and synchronous: each
//! `learn` call builds a fresh embedding → circuit → distribution chain with
//! no shared mutable state, so concurrent calls need no locking. Transport,
//! history bookkeeping, and explanation text live in the orchestrator crate.

pub mod circuit;
pub mod embedding;
pub mod error;
pub mod scoring;
pub mod signal;
pub mod simulator;

use serde::{Deserialize, Serialize};

pub use crate::circuit::CircuitSpec;
pub use crate::embedding::ConceptEmbedding;
pub use crate::error::EngineError;
pub use crate::scoring::MasteryScore;
pub use crate::signal::{SignalSummary, SIGNAL_CHANNELS};
pub use crate::simulator::OutcomeDistribution;

fn default_qubits() -> usize {
    8
}

fn default_shots() -> u64 {
    1_024
}

fn default_signal_full_scale_uv() -> f64 {
    100.0
}

fn default_attention_threshold() -> f64 {
    0.7
}

fn default_relaxation_threshold() -> f64 {
    0.5
}

/// Tunable constants of the pipeline.
///
/// The register width and shot budget are fixed in production but exposed
/// here so tests can shrink the register without touching component
/// internals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Register width; embedding length and bitstring length must match.
    #[serde(default = "default_qubits")]
    pub qubits: usize,
    /// Measurement draws per learn cycle.
    #[serde(default = "default_shots")]
    pub shots: u64,
    /// Full-scale microvolt reading; samples normalize against this.
    #[serde(default = "default_signal_full_scale_uv")]
    pub signal_full_scale_uv: f64,
    /// Attention score at or above which the learner counts as focused.
    #[serde(default = "default_attention_threshold")]
    pub attention_threshold: f64,
    /// Relaxation score at or above which the learner counts as calm.
    #[serde(default = "default_relaxation_threshold")]
    pub relaxation_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            qubits: default_qubits(),
            shots: default_shots(),
            signal_full_scale_uv: default_signal_full_scale_uv(),
            attention_threshold: default_attention_threshold(),
            relaxation_threshold: default_relaxation_threshold(),
        }
    }
}

/// Everything one learn cycle produces, minus the explanation text the
/// orchestrator attaches afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearningOutcome {
    pub concept: String,
    pub embedding: ConceptEmbedding,
    pub circuit: CircuitSpec,
    pub distribution: OutcomeDistribution,
    pub mastery: MasteryScore,
    pub signal: SignalSummary,
}

/// Stateless pipeline entry point.
#[derive(Clone, Debug, Default)]
pub struct LearningEngine {
    cfg: EngineConfig,
}

impl LearningEngine {
    pub fn new(cfg: EngineConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// Run one full learn cycle.
    ///
    /// `concept` is expected to be non-empty (the caller validates requests
    /// before they reach the core). Signal channels, when present, must be
    /// exactly [`SIGNAL_CHANNELS`] sequences of one shared length; their
    /// summary raises the entangling depth for focused learners. A fixed
    /// `seed` makes the whole cycle reproducible.
    pub fn learn(
        &self,
        concept: &str,
        channels: Option<&[Vec<f64>]>,
        seed: Option<u64>,
    ) -> Result<LearningOutcome, EngineError> {
        let summary = match channels {
            Some(channels) => signal::summarize(channels, &self.cfg)?,
            None => SignalSummary::neutral(),
        };
        let depth = signal::depth_for(&summary);

        let embedding = embedding::embed(concept, self.cfg.qubits);
        let spec = circuit::build(&embedding, depth, self.cfg.qubits)?;
        let distribution = simulator::simulate(&spec, self.cfg.shots, seed)?;
        let mastery = scoring::score(&distribution);

        Ok(LearningOutcome {
            concept: concept.to_owned(),
            embedding,
            circuit: spec,
            distribution,
            mastery,
            signal: summary,
        })
    }
}
