use async_trait::async_trait;
use qslm_engine::{MasteryScore, SignalSummary};

/// Context handed to the explanation service for one record.
#[derive(Clone, Copy, Debug)]
pub struct ExplanationRequest<'a> {
    pub concept: &'a str,
    pub mastery: MasteryScore,
    pub signal: &'a SignalSummary,
}

/// Seam for the external text-generation service.
///
/// The session treats this as opaque: a failure is logged and replaced with
/// fallback text, and the learning record stays valid either way.
#[async_trait]
pub trait ExplanationProvider: Send + Sync {
    async fn explain(&self, request: ExplanationRequest<'_>) -> anyhow::Result<String>;
}

/// Offline, deterministic provider.
///
/// Mirrors the production prompt policy — beginner-level explanation, scaled
/// to mastery, shortened when the learner looks distracted — without any
/// network call, so demos and tests run hermetically.
#[derive(Clone, Debug, Default)]
pub struct TemplateExplainer;

impl TemplateExplainer {
    fn mastery_band(mastery: MasteryScore) -> &'static str {
        let pct = mastery.percent();
        if pct >= 75.0 {
            "well consolidated"
        } else if pct >= 40.0 {
            "taking shape"
        } else {
            "still forming"
        }
    }
}

#[async_trait]
impl ExplanationProvider for TemplateExplainer {
    async fn explain(&self, request: ExplanationRequest<'_>) -> anyhow::Result<String> {
        let band = Self::mastery_band(request.mastery);
        let text = if request.signal.optimal {
            format!(
                "\"{}\" is {} at {:.1}% mastery. You are focused and relaxed, so go deep: \
                 work through one rich real-world analogy, then one full example. \
                 Next step: explain the idea aloud in your own words today.",
                request.concept,
                band,
                request.mastery.percent()
            )
        } else {
            format!(
                "\"{}\" is {} at {:.1}% mastery. Keep it short and concrete: \
                 one plain-language sentence, one tiny example. \
                 Next step: revisit the concept after a short break today.",
                request.concept,
                band,
                request.mastery.percent()
            )
        };
        Ok(text)
    }
}

/// Provider that produces no text. Useful when a caller only wants the
/// measurement pipeline.
#[derive(Clone, Debug, Default)]
pub struct NoopExplainer;

#[async_trait]
impl ExplanationProvider for NoopExplainer {
    async fn explain(&self, _request: ExplanationRequest<'_>) -> anyhow::Result<String> {
        Ok(String::new())
    }
}

/// Text the session substitutes when the provider fails.
pub fn fallback_explanation(concept: &str) -> String {
    format!(
        "Explanation for \"{concept}\" could not be generated right now. \
         The measurement below is still valid."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use qslm_engine::{EngineConfig, LearningEngine};

    #[tokio::test]
    async fn template_adapts_to_cognitive_state() {
        let outcome = LearningEngine::new(EngineConfig::default())
            .learn("Photosynthesis", None, Some(42))
            .unwrap();

        let distracted = TemplateExplainer
            .explain(ExplanationRequest {
                concept: &outcome.concept,
                mastery: outcome.mastery,
                signal: &outcome.signal,
            })
            .await
            .unwrap();
        assert!(distracted.contains("short and concrete"));

        let focused = TemplateExplainer
            .explain(ExplanationRequest {
                concept: &outcome.concept,
                mastery: outcome.mastery,
                signal: &qslm_engine::SignalSummary {
                    attention: 0.9,
                    relaxation: 0.8,
                    optimal: true,
                },
            })
            .await
            .unwrap();
        assert!(focused.contains("go deep"));
    }
}
