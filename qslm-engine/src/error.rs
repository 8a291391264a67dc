use thiserror::Error;

/// Failure modes of the learning pipeline.
///
/// The signal variants describe malformed caller input; the leak/mismatch
/// variants indicate an internal-consistency defect and are never expected
/// to surface in a correct build.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("embedding carries {got} components, register width is {want}")]
    EmbeddingWidth { got: usize, want: usize },

    #[error("entangling depth must be at least 1")]
    ZeroDepth,

    #[error("shot count must be positive")]
    ZeroShots,

    #[error("signal input must carry exactly {want} channels, got {got}")]
    ChannelCount { got: usize, want: usize },

    #[error(
        "signal channels must share one sample length; channel {channel} has {got} samples, expected {want}"
    )]
    RaggedChannels {
        channel: usize,
        got: usize,
        want: usize,
    },

    #[error("state probabilities sum to {sum} before sampling")]
    ProbabilityLeak { sum: f64 },

    #[error("distribution counts sum to {got} for {want} shots")]
    ShotMismatch { got: u64, want: u64 },
}
