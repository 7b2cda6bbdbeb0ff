//! AI generation collaborator
//!
//! The workspace hands structured context to an [`InsightGenerator`] and
//! gets structured suggestions back. Nothing returned here is written
//! without a human accepting it.

use foundry_model::{
    Frequency, RiceInputs, RoadmapItemType, Severity, SignalSource, RICE_MAX, RICE_MIN,
};
use serde::{Deserialize, Serialize};

/// Failure inside the generation collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// No generator configured for this workspace
    #[error("no insight generator configured")]
    Unavailable,

    /// Provider call failed
    #[error("provider request failed: {0}")]
    Provider(String),

    /// Provider answered with something that does not fit the schema
    #[error("malformed provider response: {0}")]
    Malformed(String),
}

impl GenerationError {
    /// Whether a retry may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Provider(_))
    }
}

/// Signal text plus whatever metadata is known
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalContext {
    pub raw_text: String,
    pub source: Option<SignalSource>,
    pub customer: Option<String>,
    pub arr: Option<String>,
    pub severity: Option<Severity>,
    pub frequency: Option<Frequency>,
}

/// Verbatim snippet from a signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedQuote {
    pub text: String,
    pub theme: String,
}

/// Draft problem proposed from a signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedProblem {
    pub title: String,
    pub statement: String,
    #[serde(default)]
    pub who_affected: Option<String>,
    pub severity: Option<Severity>,
}

/// Context the PM should add before prioritising
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingMetadata {
    pub field: String,
    pub question: String,
}

/// Overall tone of a signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Frustrated,
    Neutral,
    Positive,
}

/// Insights extracted from one signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub quotes: Vec<ExtractedQuote>,
    pub suggested_problems: Vec<SuggestedProblem>,
    pub missing_metadata: Vec<MissingMetadata>,
    pub customer_sentiment: Sentiment,
}

/// Problem summary given to the scorer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringProblem {
    pub title: String,
    pub statement: String,
    pub severity: Option<Severity>,
}

/// Objective summary given to the scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringObjective {
    pub name: String,
    pub metric: Option<String>,
    pub weight: f64,
}

/// Roadmap item with the problems and objectives it links to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringContext {
    pub title: String,
    pub description: Option<String>,
    pub rationale: Option<String>,
    pub item_type: RoadmapItemType,
    pub problems: Vec<ScoringProblem>,
    pub objectives: Vec<ScoringObjective>,
}

/// One suggested RICE value with its reasoning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionSuggestion {
    pub value: f64,
    pub reasoning: String,
}

impl DimensionSuggestion {
    /// Value rounded and clamped into the RICE input range
    #[must_use]
    pub fn input(&self) -> u8 {
        if self.value.is_nan() {
            return RICE_MIN;
        }
        let clamped = self.value.round().clamp(f64::from(RICE_MIN), f64::from(RICE_MAX));
        // clamped to 1..=10, the cast is exact
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = clamped as u8;
        value
    }
}

/// Suggested RICE inputs for a roadmap item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSuggestion {
    pub reach: DimensionSuggestion,
    pub impact: DimensionSuggestion,
    pub confidence: DimensionSuggestion,
    pub effort: DimensionSuggestion,
    pub overall_rationale: String,
    #[serde(default)]
    pub assumptions: Vec<String>,
}

impl ScoreSuggestion {
    /// Inputs ready for [`crate::Workspace::apply_score_suggestion`]
    #[must_use]
    pub fn inputs(&self) -> RiceInputs {
        RiceInputs::new(
            self.reach.input(),
            self.impact.input(),
            self.confidence.input(),
            self.effort.input(),
        )
    }
}

/// Structured-output generation service
#[async_trait::async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Quotes, draft problems, missing metadata and sentiment for a signal
    async fn extract_signal_insights(
        &self,
        context: SignalContext,
    ) -> Result<ExtractionResult, GenerationError>;

    /// RICE suggestion for a roadmap item
    async fn suggest_scores(&self, context: ScoringContext)
        -> Result<ScoreSuggestion, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim(value: f64) -> DimensionSuggestion {
        DimensionSuggestion {
            value,
            reasoning: String::new(),
        }
    }

    #[test]
    fn suggestion_values_are_clamped() {
        assert_eq!(dim(0.0).input(), 1);
        assert_eq!(dim(4.4).input(), 4);
        assert_eq!(dim(4.5).input(), 5);
        assert_eq!(dim(42.0).input(), 10);
        assert_eq!(dim(f64::NAN).input(), 1);
    }

    #[test]
    fn extraction_reads_camel_case() {
        let json = r#"{
            "quotes": [{"text": "exports time out", "theme": "reliability"}],
            "suggestedProblems": [{"title": "Export", "statement": "When admins export...", "severity": "high"}],
            "missingMetadata": [],
            "customerSentiment": "frustrated"
        }"#;
        let result: ExtractionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.suggested_problems[0].severity, Some(Severity::High));
        assert_eq!(result.suggested_problems[0].who_affected, None);
        assert_eq!(result.customer_sentiment, Sentiment::Frustrated);
    }
}
