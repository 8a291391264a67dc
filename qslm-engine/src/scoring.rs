use crate::simulator::OutcomeDistribution;
use serde::{Deserialize, Serialize};

/// Mastery percentage in [0, 100], derived from the outcome distribution.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct MasteryScore(f64);

impl MasteryScore {
    pub fn percent(self) -> f64 {
        self.0
    }

    /// Same score on a [0, 1] scale.
    pub fn fraction(self) -> f64 {
        self.0 / 100.0
    }
}

/// Score a distribution by normalized Shannon entropy.
///
/// H = −Σ p·log2(p) over observed outcomes, normalized by the register
/// width (the maximum entropy over 2^width outcomes). A peaked distribution
/// marks a consolidated concept, so mastery = (1 − H/width) · 100: a single
/// occupied bitstring scores 100, a perfectly uniform register scores 0.
pub fn score(dist: &OutcomeDistribution) -> MasteryScore {
    let total = dist.shots() as f64;
    if total <= 0.0 {
        return MasteryScore(0.0);
    }

    let mut entropy = 0.0;
    for &count in dist.counts().values() {
        if count == 0 {
            continue;
        }
        let p = count as f64 / total;
        entropy -= p * p.log2();
    }

    let max_entropy = dist.width() as f64;
    let normalized = if max_entropy > 0.0 {
        (entropy / max_entropy).clamp(0.0, 1.0)
    } else {
        0.0
    };
    MasteryScore(((1.0 - normalized) * 100.0).clamp(0.0, 100.0))
}
