use async_trait::async_trait;
use learning_matrix_bot::explain::{
    ExplanationProvider, ExplanationRequest, NoopExplainer, TemplateExplainer,
};
use learning_matrix_bot::types::verify_chain;
use learning_matrix_bot::{LearnRequest, LearningSession, SessionConfig};
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct FailingExplainer;

#[async_trait]
impl ExplanationProvider for FailingExplainer {
    async fn explain(&self, _request: ExplanationRequest<'_>) -> anyhow::Result<String> {
        anyhow::bail!("upstream text service is down")
    }
}

fn session() -> LearningSession {
    LearningSession::new(SessionConfig::default(), Arc::new(TemplateExplainer))
}

fn seeded(concept: &str) -> LearnRequest {
    LearnRequest {
        concept: concept.to_string(),
        channels: None,
        seed: Some(42),
    }
}

#[tokio::test]
async fn learn_appends_a_complete_record() {
    let session = session();
    let record = session.learn(seeded("Photosynthesis")).await.unwrap();

    assert_eq!(record.concept, "Photosynthesis");
    assert_eq!(record.distribution.counts().values().sum::<u64>(), 1_024);
    assert!((0.0..=100.0).contains(&record.mastery.percent()));
    assert!(!record.signal.optimal);
    assert!(!record.explanation.is_empty());

    let history = session.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].digest, record.digest);

    let kv = session.snapshot_kv();
    assert!(kv.contains_key("mastery|Photosynthesis"));
    assert_eq!(kv["requests|completed"], "1");
}

#[tokio::test]
async fn records_chain_and_verify() {
    let session = session();
    session.learn(seeded("Osmosis")).await.unwrap();
    session.learn(seeded("Diffusion")).await.unwrap();
    session.learn(seeded("Entropy")).await.unwrap();

    let history = session.history();
    assert_eq!(history.len(), 3);
    assert_eq!(history[1].prev_digest, history[0].digest);
    assert_eq!(history[2].prev_digest, history[1].digest);
    assert!(verify_chain(&history).is_ok());
}

#[tokio::test]
async fn tampered_history_fails_verification() {
    let session = session();
    session.learn(seeded("Osmosis")).await.unwrap();
    session.learn(seeded("Diffusion")).await.unwrap();

    let mut history = session.history();
    let mut forged = (*history[0]).clone();
    forged.explanation = "revised after the fact".to_string();
    history[0] = Arc::new(forged);

    assert_eq!(verify_chain(&history), Err(0));
}

#[tokio::test]
async fn reset_clears_history_and_restarts_the_chain() {
    let session = session();
    let before = session.learn(seeded("Osmosis")).await.unwrap();
    session.reset().unwrap();
    assert!(session.history().is_empty());
    assert!(!session.snapshot_kv().contains_key("mastery|Osmosis"));

    let after = session.learn(seeded("Osmosis")).await.unwrap();
    // Chain restarts from genesis, so the first record links the same way.
    assert_eq!(after.prev_digest, before.prev_digest);
}

#[tokio::test]
async fn whitespace_concept_is_rejected() {
    let session = session();
    let err = session.learn(seeded("   ")).await.unwrap_err();
    assert!(err.to_string().contains("concept is required"));
    assert!(session.history().is_empty());
    assert_eq!(session.stats().requests.rejected, 1);
}

#[tokio::test]
async fn malformed_signal_rejects_the_request() {
    let session = session();
    let request = LearnRequest {
        concept: "Entropy".to_string(),
        channels: Some(vec![vec![10.0; 16]; 7]),
        seed: Some(42),
    };
    let err = session.learn(request).await.unwrap_err();
    assert!(err.to_string().contains("quantum pipeline"));
    assert!(session.history().is_empty());
}

#[tokio::test]
async fn provider_failure_falls_back_without_losing_the_record() {
    let session = LearningSession::new(SessionConfig::default(), Arc::new(FailingExplainer));
    let record = session.learn(seeded("Photosynthesis")).await.unwrap();
    assert!(record.explanation.contains("could not be generated"));
    assert_eq!(session.history().len(), 1);
    assert_eq!(session.stats().requests.fallback_explanations, 1);

    let snapshot = session.telemetry().flush();
    assert_eq!(snapshot.counters["explain.fallback"], 1);
    assert_eq!(snapshot.counters["learn.completed"], 1);
}

#[tokio::test]
async fn seeded_sessions_measure_identically() {
    let a = LearningSession::new(SessionConfig::default(), Arc::new(NoopExplainer));
    let b = LearningSession::new(SessionConfig::default(), Arc::new(NoopExplainer));
    let ra = a.learn(seeded("Krebs cycle")).await.unwrap();
    let rb = b.learn(seeded("Krebs cycle")).await.unwrap();
    assert_eq!(ra.distribution, rb.distribution);
    assert_eq!(ra.mastery, rb.mastery);
}

#[tokio::test]
async fn optimal_signal_is_counted_and_deepens_the_circuit() {
    let session = session();
    let request = LearnRequest {
        concept: "Focus".to_string(),
        channels: Some(vec![vec![90.0; 32]; 8]),
        seed: Some(42),
    };
    let record = session.learn(request).await.unwrap();
    assert!(record.signal.optimal);
    assert_eq!(record.circuit.depth(), 3);

    let stats = session.stats();
    assert_eq!(stats.signal.with_signal, 1);
    assert_eq!(stats.signal.optimal, 1);
    assert!(session.snapshot_kv().contains_key("signal|optimal_rate"));
}
