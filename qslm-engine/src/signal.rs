use crate::error::EngineError;
use crate::EngineConfig;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Expected number of raw signal channels.
pub const SIGNAL_CHANNELS: usize = 8;

/// High-frequency-band proxy channels driving the attention score.
const ALPHA_CHANNELS: Range<usize> = 1..3;
/// Disjoint low-frequency-band proxy channels driving the relaxation score.
const THETA_CHANNELS: Range<usize> = 4..8;

/// Attention boundaries for the consolidation-depth step function.
const DEEP_ATTENTION: f64 = 0.7;
const STEADY_ATTENTION: f64 = 0.3;

/// Cognitive-state summary derived from raw channel samples.
///
/// Both scores live in [0, 1]. A neutral summary (absent input) always
/// reports zeros and never asserts the optimal flag.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignalSummary {
    pub attention: f64,
    pub relaxation: f64,
    pub optimal: bool,
}

impl SignalSummary {
    pub fn neutral() -> Self {
        Self {
            attention: 0.0,
            relaxation: 0.0,
            optimal: false,
        }
    }
}

/// Reduce raw multi-channel samples to attention/relaxation scores.
///
/// Samples are treated as microvolt readings: normalized by the configured
/// full scale and clamped to [0, 1], then averaged per band. Exactly
/// `SIGNAL_CHANNELS` channels of one shared length are required when input
/// is present; a wrong arity or ragged lengths is malformed input, never
/// silently padded. An empty channel list or zero-length channels count as
/// absent input and yield the neutral summary.
pub fn summarize(channels: &[Vec<f64>], cfg: &EngineConfig) -> Result<SignalSummary, EngineError> {
    if channels.is_empty() {
        return Ok(SignalSummary::neutral());
    }
    if channels.len() != SIGNAL_CHANNELS {
        return Err(EngineError::ChannelCount {
            got: channels.len(),
            want: SIGNAL_CHANNELS,
        });
    }
    let samples = channels[0].len();
    for (index, channel) in channels.iter().enumerate() {
        if channel.len() != samples {
            return Err(EngineError::RaggedChannels {
                channel: index,
                got: channel.len(),
                want: samples,
            });
        }
    }
    if samples == 0 {
        return Ok(SignalSummary::neutral());
    }

    let attention = band_mean(channels, ALPHA_CHANNELS, cfg.signal_full_scale_uv);
    let relaxation = band_mean(channels, THETA_CHANNELS, cfg.signal_full_scale_uv);
    Ok(SignalSummary {
        attention,
        relaxation,
        optimal: attention >= cfg.attention_threshold && relaxation >= cfg.relaxation_threshold,
    })
}

/// Entangling-layer repeat count for a cognitive state.
///
/// Monotone non-decreasing in attention with floor 1: a focused learner gets
/// a deeper consolidation layer, a distracted or absent one gets the plain
/// circuit.
pub fn depth_for(summary: &SignalSummary) -> u32 {
    if summary.attention >= DEEP_ATTENTION {
        3
    } else if summary.attention >= STEADY_ATTENTION {
        2
    } else {
        1
    }
}

fn band_mean(channels: &[Vec<f64>], band: Range<usize>, full_scale: f64) -> f64 {
    let width = band.len() as f64;
    let mean: f64 = channels[band]
        .iter()
        .map(|channel| {
            let n = channel.len() as f64;
            channel
                .iter()
                .map(|&sample| (sample / full_scale).clamp(0.0, 1.0))
                .sum::<f64>()
                / n
        })
        .sum::<f64>()
        / width;
    mean.clamp(0.0, 1.0)
}
