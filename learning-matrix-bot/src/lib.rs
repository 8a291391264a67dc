//! Quantum self-learning matrix orchestrator.
//!
//! This crate wraps the stateless `qslm-engine` pipeline with everything a
//! running deployment needs around it: request validation, an append-ordered
//! hash-chained record history, a pluggable explanation provider, a
//! synthetic signal feed for demos, and session stats/telemetry.

pub mod explain;
pub mod session;
pub mod signal_feed;
pub mod stats;
pub mod types;

pub use crate::session::{LearningSession, SessionConfig};
pub use crate::types::{LearnRequest, LearningRecord};
