use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};

/// Fixed-length vector of reals in [0, 1), one per qubit.
///
/// Produced deterministically from the concept string: the same concept
/// always yields the same embedding, so downstream circuits are stable
/// across sessions. Immutable once built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConceptEmbedding(Vec<f64>);

impl ConceptEmbedding {
    /// Wrap raw components. Callers are expected to keep values in [0, 1].
    pub fn from_components(components: Vec<f64>) -> Self {
        Self(components)
    }

    pub fn components(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Map a concept string onto a `width`-component embedding.
///
/// A SHA3-256 digest of the concept seeds a ChaCha20 stream and one uniform
/// float is drawn per component. A production deployment would swap this for
/// a real semantic embedding model; the circuit builder only depends on the
/// value range, not on semantic meaning.
pub fn embed(concept: &str, width: usize) -> ConceptEmbedding {
    let digest: [u8; 32] = Sha3_256::digest(concept.as_bytes()).into();
    let mut rng = ChaCha20Rng::from_seed(digest);
    ConceptEmbedding((0..width).map(|_| rng.gen::<f64>()).collect())
}
