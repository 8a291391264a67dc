use crate::embedding::ConceptEmbedding;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Description of the register the simulator executes: one RY rotation per
/// qubit followed by `depth` repetitions of a linear CNOT chain
/// (qubit i controls qubit i+1).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CircuitSpec {
    width: usize,
    /// Rotation angles in radians, one per qubit, in [0, π].
    rotations: Vec<f64>,
    /// How many times the entangling chain layer repeats.
    depth: u32,
}

impl CircuitSpec {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn rotations(&self) -> &[f64] {
        &self.rotations
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Adjacent (control, target) pairs of one entangling layer.
    pub fn entangling_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.width.saturating_sub(1)).map(|i| (i, i + 1))
    }
}

/// Turn an embedding into a circuit description.
///
/// Each component scales to a rotation angle in [0, π]; the entangling chain
/// repeats `depth` times (signal modulation raises the depth to simulate
/// deeper memory consolidation). A width mismatch is a programming defect in
/// the caller, not a user-facing condition, and is reported rather than
/// coerced.
pub fn build(
    embedding: &ConceptEmbedding,
    depth: u32,
    width: usize,
) -> Result<CircuitSpec, EngineError> {
    if embedding.len() != width {
        return Err(EngineError::EmbeddingWidth {
            got: embedding.len(),
            want: width,
        });
    }
    if depth == 0 {
        return Err(EngineError::ZeroDepth);
    }

    Ok(CircuitSpec {
        width,
        rotations: embedding.components().iter().map(|a| a * PI).collect(),
        depth,
    })
}
