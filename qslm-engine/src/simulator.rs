use crate::circuit::CircuitSpec;
use crate::error::EngineError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Tolerated drift of the probability sum away from 1 before sampling.
const PROBABILITY_TOLERANCE: f64 = 1e-9;

/// Empirical measurement counts over bitstrings for a fixed shot budget.
///
/// Keys are rendered with qubit 0 as the leftmost character; outcomes never
/// observed are absent. Counts always sum to `shots`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDistribution {
    width: usize,
    shots: u64,
    counts: BTreeMap<String, u64>,
}

impl OutcomeDistribution {
    /// Rebuild a distribution from raw counts; `shots` is derived from their
    /// sum. Intended for deserialization paths and tests.
    pub fn from_counts(width: usize, counts: BTreeMap<String, u64>) -> Self {
        let shots = counts.values().sum();
        Self {
            width,
            shots,
            counts,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn shots(&self) -> u64 {
        self.shots
    }

    pub fn counts(&self) -> &BTreeMap<String, u64> {
        &self.counts
    }

    /// Number of distinct outcomes actually observed.
    pub fn support(&self) -> usize {
        self.counts.len()
    }

    /// Observed probability of a single bitstring.
    pub fn probability(&self, bitstring: &str) -> f64 {
        if self.shots == 0 {
            return 0.0;
        }
        self.counts.get(bitstring).copied().unwrap_or(0) as f64 / self.shots as f64
    }
}

/// Draw `shots` measurements from the circuit's exact final distribution.
///
/// The final state is computed as a full state vector (2^width amplitudes);
/// RY rotations with real angles and CNOT permutations keep every amplitude
/// real, so no complex arithmetic is needed. Sampling is inverse-CDF over
/// the squared amplitudes: seeded with `seed` for reproducible runs, or from
/// OS entropy when absent.
pub fn simulate(
    spec: &CircuitSpec,
    shots: u64,
    seed: Option<u64>,
) -> Result<OutcomeDistribution, EngineError> {
    if shots == 0 {
        return Err(EngineError::ZeroShots);
    }

    let probabilities = final_probabilities(spec)?;
    let mut cdf = Vec::with_capacity(probabilities.len());
    let mut acc = 0.0;
    for p in &probabilities {
        acc += p;
        cdf.push(acc);
    }

    let mut rng = match seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };

    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for _ in 0..shots {
        let draw = rng.gen::<f64>() * acc;
        let index = cdf.partition_point(|&c| c <= draw).min(cdf.len() - 1);
        *counts.entry(render_bitstring(index, spec.width())).or_insert(0) += 1;
    }

    let total: u64 = counts.values().sum();
    if total != shots {
        return Err(EngineError::ShotMismatch {
            got: total,
            want: shots,
        });
    }

    Ok(OutcomeDistribution {
        width: spec.width(),
        shots,
        counts,
    })
}

/// Exact measurement probabilities of the circuit's final state.
fn final_probabilities(spec: &CircuitSpec) -> Result<Vec<f64>, EngineError> {
    let dim = 1usize << spec.width();
    let mut amplitudes = vec![0.0f64; dim];
    amplitudes[0] = 1.0;

    for (qubit, &theta) in spec.rotations().iter().enumerate() {
        apply_ry(&mut amplitudes, qubit, theta);
    }
    for _ in 0..spec.depth() {
        for (control, target) in spec.entangling_pairs() {
            apply_cnot(&mut amplitudes, control, target);
        }
    }

    let probabilities: Vec<f64> = amplitudes.iter().map(|a| a * a).collect();
    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
        return Err(EngineError::ProbabilityLeak { sum });
    }
    Ok(probabilities)
}

/// RY(theta) on one qubit: mixes each |…0…⟩/|…1…⟩ amplitude pair.
fn apply_ry(amplitudes: &mut [f64], qubit: usize, theta: f64) {
    let (sin, cos) = (theta / 2.0).sin_cos();
    let mask = 1usize << qubit;
    for base in 0..amplitudes.len() {
        if base & mask != 0 {
            continue;
        }
        let flipped = base | mask;
        let a0 = amplitudes[base];
        let a1 = amplitudes[flipped];
        amplitudes[base] = cos * a0 - sin * a1;
        amplitudes[flipped] = sin * a0 + cos * a1;
    }
}

/// CNOT as a basis permutation: flips `target` wherever `control` is set.
fn apply_cnot(amplitudes: &mut [f64], control: usize, target: usize) {
    let control_mask = 1usize << control;
    let target_mask = 1usize << target;
    for base in 0..amplitudes.len() {
        if base & control_mask != 0 && base & target_mask == 0 {
            amplitudes.swap(base, base | target_mask);
        }
    }
}

/// Render a basis-state index with qubit 0 as the leftmost character.
fn render_bitstring(index: usize, width: usize) -> String {
    (0..width)
        .map(|qubit| if index & (1 << qubit) != 0 { '1' } else { '0' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::build;
    use crate::embedding::{embed, ConceptEmbedding};

    #[test]
    fn probabilities_are_normalized() {
        let spec = build(&embed("normalization", 8), 3, 8).unwrap();
        let probabilities = final_probabilities(&spec).unwrap();
        let sum: f64 = probabilities.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum was {sum}");
    }

    #[test]
    fn zero_rotations_stay_in_ground_state() {
        let embedding = ConceptEmbedding::from_components(vec![0.0; 4]);
        let spec = build(&embedding, 1, 4).unwrap();
        let dist = simulate(&spec, 64, Some(1)).unwrap();
        assert_eq!(dist.counts().get("0000"), Some(&64));
        assert_eq!(dist.support(), 1);
    }

    #[test]
    fn full_rotations_collapse_deterministically() {
        // theta = π puts every qubit in |1⟩ before entangling; the CNOT chain
        // then maps the register to a single basis state, so the whole shot
        // budget lands on one key.
        let embedding = ConceptEmbedding::from_components(vec![1.0; 4]);
        let spec = build(&embedding, 1, 4).unwrap();
        let dist = simulate(&spec, 128, Some(7)).unwrap();
        assert_eq!(dist.support(), 1);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let spec = build(&embed("repeatable", 8), 1, 8).unwrap();
        let a = simulate(&spec, 1024, Some(42)).unwrap();
        let b = simulate(&spec, 1024, Some(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn counts_always_sum_to_shots() {
        for shots in [1, 5, 1024] {
            let spec = build(&embed("budget", 8), 2, 8).unwrap();
            let dist = simulate(&spec, shots, Some(9)).unwrap();
            assert_eq!(dist.counts().values().sum::<u64>(), shots);
        }
    }

    #[test]
    fn rejects_zero_shots() {
        let spec = build(&embed("nothing", 8), 1, 8).unwrap();
        assert!(matches!(
            simulate(&spec, 0, None).unwrap_err(),
            EngineError::ZeroShots
        ));
    }

    #[test]
    fn bitstring_orientation_is_qubit_zero_first() {
        assert_eq!(render_bitstring(0b0001, 4), "1000");
        assert_eq!(render_bitstring(0b1000, 4), "0001");
    }
}
