use qslm_engine::SIGNAL_CHANNELS;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Channels 1..3 carry the focus level, channels 4..8 the calm level; the
/// remaining channels are broadband noise. Matches the band layout the
/// summarizer reads.
const FOCUS_CHANNELS: std::ops::Range<usize> = 1..3;
const CALM_CHANNELS: std::ops::Range<usize> = 4..8;

/// Seeded generator of synthetic 8-channel microvolt windows.
///
/// Stands in for a hardware acquisition source: focus and calm levels drift
/// as a bounded random walk between windows, so consecutive reads look like
/// a learner whose state changes gradually. Deterministic per seed.
pub struct SyntheticSignalFeed {
    rng: StdRng,
    focus: f64,
    calm: f64,
}

impl SyntheticSignalFeed {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            focus: 0.6,
            calm: 0.6,
        }
    }

    /// Current focus level in [0, 1].
    pub fn focus(&self) -> f64 {
        self.focus
    }

    /// Produce one window of `samples` readings per channel, in microvolts.
    pub fn next_window(&mut self, samples: usize) -> Vec<Vec<f64>> {
        self.focus = drift(self.focus, self.rng.gen_range(-0.08..=0.08));
        self.calm = drift(self.calm, self.rng.gen_range(-0.08..=0.08));

        (0..SIGNAL_CHANNELS)
            .map(|channel| {
                let level = if FOCUS_CHANNELS.contains(&channel) {
                    self.focus
                } else if CALM_CHANNELS.contains(&channel) {
                    self.calm
                } else {
                    0.5
                };
                (0..samples)
                    .map(|_| {
                        let jitter = self.rng.gen_range(-5.0..=5.0);
                        (level * 100.0 + jitter).clamp(0.0, 100.0)
                    })
                    .collect()
            })
            .collect()
    }
}

fn drift(level: f64, step: f64) -> f64 {
    (level + step).clamp(0.05, 0.95)
}
