use chrono::{DateTime, Utc};
use qslm_engine::{CircuitSpec, ConceptEmbedding, MasteryScore, OutcomeDistribution, SignalSummary};
use serde::{Deserialize, Serialize};

/// One learning request as submitted by a caller.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LearnRequest {
    pub concept: String,
    /// Raw signal channels, when an acquisition source is attached.
    #[serde(default)]
    pub channels: Option<Vec<Vec<f64>>>,
    /// Fixed sampling seed for reproducible runs.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl LearnRequest {
    pub fn concept_only(concept: impl Into<String>) -> Self {
        Self {
            concept: concept.into(),
            channels: None,
            seed: None,
        }
    }
}

/// The immutable aggregate one learn cycle leaves behind.
///
/// Records are never mutated in place; the session appends them to history
/// and links them with BLAKE3 digests so tampering with any record breaks
/// every digest after it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LearningRecord {
    pub concept: String,
    pub embedding: ConceptEmbedding,
    pub circuit: CircuitSpec,
    pub distribution: OutcomeDistribution,
    pub mastery: MasteryScore,
    pub signal: SignalSummary,
    pub explanation: String,
    pub recorded_at: DateTime<Utc>,
    /// Hex digest of the previous record in the chain (the genesis digest
    /// for the first record).
    pub prev_digest: String,
    /// BLAKE3(prev_digest bytes ‖ canonical JSON of the body fields).
    pub digest: String,
}

/// Body fields covered by a record's digest, in one canonical shape.
#[derive(Serialize)]
struct DigestBody<'a> {
    concept: &'a str,
    embedding: &'a ConceptEmbedding,
    circuit: &'a CircuitSpec,
    distribution: &'a OutcomeDistribution,
    mastery: &'a MasteryScore,
    signal: &'a SignalSummary,
    explanation: &'a str,
    recorded_at: &'a DateTime<Utc>,
}

impl LearningRecord {
    pub(crate) fn digest_payload(&self) -> anyhow::Result<Vec<u8>> {
        let body = DigestBody {
            concept: &self.concept,
            embedding: &self.embedding,
            circuit: &self.circuit,
            distribution: &self.distribution,
            mastery: &self.mastery,
            signal: &self.signal,
            explanation: &self.explanation,
            recorded_at: &self.recorded_at,
        };
        Ok(serde_json::to_vec(&body)?)
    }
}

/// Digest every chain starts from.
pub fn genesis_digest() -> blake3::Hash {
    blake3::hash(b"qslm:genesis")
}

pub(crate) fn chain_digest(prev: &blake3::Hash, payload: &[u8]) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(prev.as_bytes());
    hasher.update(payload);
    hasher.finalize()
}

/// Recompute the digest chain over an append-ordered history slice.
///
/// Returns the index of the first record whose stored digests do not match
/// the recomputation, or `Ok(())` when the chain is intact.
pub fn verify_chain(records: &[impl AsRef<LearningRecord>]) -> Result<(), usize> {
    let mut prev = genesis_digest();
    for (index, record) in records.iter().enumerate() {
        let record = record.as_ref();
        if record.prev_digest != prev.to_hex().to_string() {
            return Err(index);
        }
        let payload = record.digest_payload().map_err(|_| index)?;
        prev = chain_digest(&prev, &payload);
        if record.digest != prev.to_hex().to_string() {
            return Err(index);
        }
    }
    Ok(())
}
