//! Structured signal capture
//!
//! Five capture templates render into a signal's raw text. Blocks are
//! separated by a blank line; empty inputs are omitted and all inputs are
//! trimmed.

use crate::vocab::SignalSource;
use serde::{Deserialize, Serialize};

const BLOCK_SEPARATOR: &str = "\n\n";

/// One quote in a conversation capture
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerQuote {
    pub speaker: String,
    pub quote: String,
}

/// Calls, chats, interviews, tickets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationFields {
    pub context: String,
    pub quotes: Vec<SpeakerQuote>,
    pub summary: String,
}

/// Metric anomalies and drop-offs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFields {
    pub metric: String,
    pub current_value: String,
    pub expected: String,
    pub context: String,
}

/// NPS, surveys, feature requests
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackFields {
    pub verbatim: String,
    pub feedback_type: String,
    pub score: String,
    pub context: String,
}

/// Market moves, win/loss
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitiveFields {
    pub competitor: String,
    pub event: String,
    pub details: String,
    pub source_info: String,
}

/// Team observations, research
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalFields {
    pub observation: String,
    pub origin: String,
    pub who_reported: String,
}

/// Structured capture, one variant per template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "fields", rename_all = "lowercase")]
pub enum StructuredSignal {
    Conversation(ConversationFields),
    Data(DataFields),
    Feedback(FeedbackFields),
    Competitive(CompetitiveFields),
    Internal(InternalFields),
}

impl StructuredSignal {
    /// Source recorded for signals captured with this template
    #[must_use]
    pub fn default_source(&self) -> Option<SignalSource> {
        match self {
            Self::Conversation(_) => None,
            _ => Some(SignalSource::Other),
        }
    }

    /// Render raw text
    #[must_use]
    pub fn compose(&self) -> String {
        let blocks = match self {
            Self::Conversation(f) => compose_conversation(f),
            Self::Data(f) => compose_data(f),
            Self::Feedback(f) => compose_feedback(f),
            Self::Competitive(f) => compose_competitive(f),
            Self::Internal(f) => compose_internal(f),
        };
        blocks.join(BLOCK_SEPARATOR)
    }

    /// First missing required field, as a user-facing message
    #[must_use]
    pub fn validate(&self) -> Option<&'static str> {
        match self {
            Self::Conversation(f) => {
                let has_quote = f.quotes.iter().any(|q| !q.quote.trim().is_empty());
                (!has_quote).then_some("Add at least one quote")
            }
            Self::Data(f) => f
                .metric
                .trim()
                .is_empty()
                .then_some("Metric name is required"),
            Self::Feedback(f) => f
                .verbatim
                .trim()
                .is_empty()
                .then_some("Paste the feedback text"),
            Self::Competitive(f) => {
                if f.competitor.trim().is_empty() {
                    Some("Competitor name is required")
                } else if f.details.trim().is_empty() {
                    Some("Details are required")
                } else {
                    None
                }
            }
            Self::Internal(f) => f
                .observation
                .trim()
                .is_empty()
                .then_some("Observation is required"),
        }
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn compose_conversation(f: &ConversationFields) -> Vec<String> {
    let mut blocks = Vec::new();
    if let Some(context) = non_empty(&f.context) {
        blocks.push(format!("[Context: {context}]"));
    }
    for q in &f.quotes {
        if let Some(quote) = non_empty(&q.quote) {
            let speaker = non_empty(&q.speaker).unwrap_or("Unknown");
            blocks.push(format!("\"{quote}\" — {speaker}"));
        }
    }
    if let Some(summary) = non_empty(&f.summary) {
        blocks.push(format!("[Takeaway: {summary}]"));
    }
    blocks
}

fn compose_data(f: &DataFields) -> Vec<String> {
    let mut blocks = Vec::new();
    if let Some(metric) = non_empty(&f.metric) {
        let mut line = format!("Metric: {metric}");
        if let Some(current) = non_empty(&f.current_value) {
            line.push_str(&format!("\nCurrent: {current}"));
            if let Some(expected) = non_empty(&f.expected) {
                line.push_str(&format!(" (expected: {expected})"));
            }
        }
        blocks.push(line);
    }
    if let Some(context) = non_empty(&f.context) {
        blocks.push(context.to_string());
    }
    blocks
}

fn compose_feedback(f: &FeedbackFields) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut header = Vec::new();
    if !f.feedback_type.is_empty() {
        header.push(f.feedback_type.clone());
    }
    if let Some(score) = non_empty(&f.score) {
        header.push(format!("Score: {score}"));
    }
    if !header.is_empty() {
        blocks.push(format!("[Feedback: {}]", header.join(", ")));
    }
    if let Some(verbatim) = non_empty(&f.verbatim) {
        blocks.push(format!("\"{verbatim}\""));
    }
    if let Some(context) = non_empty(&f.context) {
        blocks.push(format!("[Context: {context}]"));
    }
    blocks
}

fn compose_competitive(f: &CompetitiveFields) -> Vec<String> {
    let mut blocks = Vec::new();
    if let Some(competitor) = non_empty(&f.competitor) {
        let mut line = format!("Competitor: {competitor}");
        if !f.event.is_empty() {
            line.push_str(&format!("\nSignal type: {}", f.event));
        }
        blocks.push(line);
    }
    if let Some(details) = non_empty(&f.details) {
        blocks.push(details.to_string());
    }
    if let Some(source) = non_empty(&f.source_info) {
        blocks.push(format!("[Source: {source}]"));
    }
    blocks
}

fn compose_internal(f: &InternalFields) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut meta = Vec::new();
    if let Some(origin) = non_empty(&f.origin) {
        meta.push(format!("[Origin: {origin}]"));
    }
    if let Some(who) = non_empty(&f.who_reported) {
        meta.push(format!("[Reported by: {who}]"));
    }
    if !meta.is_empty() {
        blocks.push(meta.join("\n"));
    }
    if let Some(observation) = non_empty(&f.observation) {
        blocks.push(observation.to_string());
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_renders_quotes_with_speakers() {
        let signal = StructuredSignal::Conversation(ConversationFields {
            context: " QBR with Acme ".into(),
            quotes: vec![
                SpeakerQuote {
                    speaker: "CTO".into(),
                    quote: "Exports keep timing out".into(),
                },
                SpeakerQuote {
                    speaker: String::new(),
                    quote: "We export nightly".into(),
                },
                SpeakerQuote::default(),
            ],
            summary: "Export reliability".into(),
        });
        assert_eq!(
            signal.compose(),
            "[Context: QBR with Acme]\n\n\"Exports keep timing out\" — CTO\n\n\"We export nightly\" — Unknown\n\n[Takeaway: Export reliability]"
        );
        assert_eq!(signal.validate(), None);
        assert_eq!(signal.default_source(), None);
    }

    #[test]
    fn conversation_requires_a_quote() {
        let signal = StructuredSignal::Conversation(ConversationFields {
            quotes: vec![SpeakerQuote {
                speaker: "PM".into(),
                quote: "   ".into(),
            }],
            ..ConversationFields::default()
        });
        assert_eq!(signal.validate(), Some("Add at least one quote"));
    }

    #[test]
    fn data_expected_only_follows_current() {
        let with_current = StructuredSignal::Data(DataFields {
            metric: "Activation".into(),
            current_value: "31%".into(),
            expected: "45%".into(),
            context: String::new(),
        });
        assert_eq!(
            with_current.compose(),
            "Metric: Activation\nCurrent: 31% (expected: 45%)"
        );

        let without_current = StructuredSignal::Data(DataFields {
            metric: "Activation".into(),
            expected: "45%".into(),
            context: "Since March".into(),
            ..DataFields::default()
        });
        assert_eq!(without_current.compose(), "Metric: Activation\n\nSince March");
        assert_eq!(without_current.default_source(), Some(SignalSource::Other));
    }

    #[test]
    fn feedback_header_joins_type_and_score() {
        let signal = StructuredSignal::Feedback(FeedbackFields {
            verbatim: "Love it but search is slow".into(),
            feedback_type: "NPS".into(),
            score: "7".into(),
            context: String::new(),
        });
        assert_eq!(
            signal.compose(),
            "[Feedback: NPS, Score: 7]\n\n\"Love it but search is slow\""
        );
    }

    #[test]
    fn competitive_validation_order() {
        let mut fields = CompetitiveFields::default();
        assert_eq!(
            StructuredSignal::Competitive(fields.clone()).validate(),
            Some("Competitor name is required")
        );
        fields.competitor = "Rival".into();
        assert_eq!(
            StructuredSignal::Competitive(fields.clone()).validate(),
            Some("Details are required")
        );
        fields.details = "Launched bulk export".into();
        fields.event = "launch".into();
        let signal = StructuredSignal::Competitive(fields);
        assert_eq!(signal.validate(), None);
        assert_eq!(
            signal.compose(),
            "Competitor: Rival\nSignal type: launch\n\nLaunched bulk export"
        );
    }

    #[test]
    fn internal_meta_shares_one_block() {
        let signal = StructuredSignal::Internal(InternalFields {
            observation: "Support macros mention export".into(),
            origin: "Support".into(),
            who_reported: "Dana".into(),
        });
        assert_eq!(
            signal.compose(),
            "[Origin: Support]\n[Reported by: Dana]\n\nSupport macros mention export"
        );
    }
}
