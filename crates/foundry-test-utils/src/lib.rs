//! Testing utilities for the Foundry workspace
//!
//! Shared fixtures: a [`Scenario`] builder for seeded stores and a
//! [`ScriptedGenerator`] standing in for the AI collaborator.

#![allow(missing_docs)]

use foundry_core::{
    DimensionSuggestion, ExtractedQuote, ExtractionResult, GenerationError, InsightGenerator,
    ScoreSuggestion, ScoringContext, Sentiment, SignalContext, SuggestedProblem, Workspace,
};
use foundry_model::{
    Dataset, Objective, Problem, ProblemStatus, RoadmapItem, RoadmapItemObjective,
    RoadmapItemProblem, RoadmapItemType, RoadmapStatus, Signal, SignalProblem,
};
use foundry_store::MemoryStore;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Seed data built with readable ids
///
/// Link ids are derived from their ends (`rip-{item}-{problem}`,
/// `rio-{item}-{objective}`, `sp-{signal}-{problem}`).
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    dataset: Dataset,
}

impl Scenario {
    pub fn new() -> Self {
        Self::default()
    }

    fn item(mut self, id: &str, item_type: RoadmapItemType, parent: Option<&str>) -> Self {
        let mut item = RoadmapItem::new(format!("{item_type} {id}"), item_type).with_id(id);
        item.parent_id = parent.map(Into::into);
        self.dataset.roadmap_items.push(item);
        self
    }

    pub fn initiative(self, id: &str) -> Self {
        self.item(id, RoadmapItemType::Initiative, None)
    }

    pub fn epic(self, id: &str, parent: Option<&str>) -> Self {
        self.item(id, RoadmapItemType::Epic, parent)
    }

    pub fn feature(self, id: &str, parent: Option<&str>) -> Self {
        self.item(id, RoadmapItemType::Feature, parent)
    }

    /// Set a seeded item's status directly, bypassing the gate
    pub fn with_status(mut self, id: &str, status: RoadmapStatus) -> Self {
        let item = self
            .dataset
            .roadmap_items
            .iter_mut()
            .find(|i| i.id.as_str() == id)
            .unwrap_or_else(|| panic!("no seeded roadmap item '{id}'"));
        item.status = status;
        self
    }

    pub fn committed(self, id: &str) -> Self {
        self.with_status(id, RoadmapStatus::Committed)
    }

    pub fn problem(mut self, id: &str, status: ProblemStatus) -> Self {
        let problem = Problem::new(format!("Problem {id}"), format!("Statement for {id}"))
            .with_id(id)
            .with_status(status);
        self.dataset.problems.push(problem);
        self
    }

    pub fn accepted_problem(self, id: &str) -> Self {
        self.problem(id, ProblemStatus::Accepted)
    }

    pub fn objective(mut self, id: &str) -> Self {
        self.dataset
            .objectives
            .push(Objective::new(format!("Objective {id}")).with_id(id));
        self
    }

    pub fn signal(mut self, id: &str, text: &str) -> Self {
        self.dataset.signals.push(Signal::new(text).with_id(id));
        self
    }

    /// Link an item to a problem
    pub fn justify(mut self, item: &str, problem: &str) -> Self {
        let mut link = RoadmapItemProblem::new(item.into(), problem.into());
        link.id = format!("rip-{item}-{problem}").into();
        self.dataset.roadmap_item_problems.push(link);
        self
    }

    /// Link an item to an objective
    pub fn align(mut self, item: &str, objective: &str) -> Self {
        let mut link = RoadmapItemObjective::new(item.into(), objective.into(), None);
        link.id = format!("rio-{item}-{objective}").into();
        self.dataset.roadmap_item_objectives.push(link);
        self
    }

    /// Link a signal to a problem
    pub fn evidence(mut self, signal: &str, problem: &str, quote: Option<&str>) -> Self {
        let mut link = SignalProblem::new(signal.into(), problem.into(), quote.map(Into::into));
        link.id = format!("sp-{signal}-{problem}").into();
        self.dataset.signal_problems.push(link);
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn into_dataset(self) -> Dataset {
        self.dataset
    }

    /// Seeded in-memory store
    ///
    /// # Panics
    /// A link references an id the scenario never seeded.
    pub fn store(self) -> MemoryStore {
        MemoryStore::from_dataset(self.dataset).expect("scenario references unseeded ids")
    }

    /// Workspace over the seeded store, without a generator
    pub fn workspace(self) -> Workspace<MemoryStore> {
        Workspace::new(self.store())
    }

    /// Workspace over the seeded store with a scripted generator
    pub fn workspace_with(self, generator: Arc<ScriptedGenerator>) -> Workspace<MemoryStore> {
        Workspace::new(self.store()).with_generator(generator)
    }
}

/// Generator fake that replays queued responses and records its inputs
///
/// An empty queue answers with [`GenerationError::Provider`].
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    extractions: Mutex<VecDeque<Result<ExtractionResult, GenerationError>>>,
    suggestions: Mutex<VecDeque<Result<ScoreSuggestion, GenerationError>>>,
    signal_contexts: Mutex<Vec<SignalContext>>,
    scoring_contexts: Mutex<Vec<ScoringContext>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extraction(self, result: ExtractionResult) -> Self {
        self.extractions.lock().push_back(Ok(result));
        self
    }

    pub fn with_suggestion(self, suggestion: ScoreSuggestion) -> Self {
        self.suggestions.lock().push_back(Ok(suggestion));
        self
    }

    pub fn with_extraction_error(self, error: GenerationError) -> Self {
        self.extractions.lock().push_back(Err(error));
        self
    }

    pub fn signal_contexts(&self) -> Vec<SignalContext> {
        self.signal_contexts.lock().clone()
    }

    pub fn scoring_contexts(&self) -> Vec<ScoringContext> {
        self.scoring_contexts.lock().clone()
    }
}

#[async_trait::async_trait]
impl InsightGenerator for ScriptedGenerator {
    async fn extract_signal_insights(
        &self,
        context: SignalContext,
    ) -> Result<ExtractionResult, GenerationError> {
        self.signal_contexts.lock().push(context);
        self.extractions
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Provider("no scripted extraction".into())))
    }

    async fn suggest_scores(
        &self,
        context: ScoringContext,
    ) -> Result<ScoreSuggestion, GenerationError> {
        self.scoring_contexts.lock().push(context);
        self.suggestions
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Provider("no scripted suggestion".into())))
    }
}

/// Extraction proposing one problem per `(title, quote)` pair
pub fn extraction(problems: &[(&str, &str)]) -> ExtractionResult {
    ExtractionResult {
        quotes: problems
            .iter()
            .map(|(_, quote)| ExtractedQuote {
                text: (*quote).to_string(),
                theme: "general".to_string(),
            })
            .collect(),
        suggested_problems: problems
            .iter()
            .map(|(title, _)| SuggestedProblem {
                title: (*title).to_string(),
                statement: format!("Users report: {title}"),
                who_affected: None,
                severity: None,
            })
            .collect(),
        missing_metadata: Vec::new(),
        customer_sentiment: Sentiment::Neutral,
    }
}

/// Score suggestion with raw dimension values
pub fn suggestion(reach: f64, impact: f64, confidence: f64, effort: f64) -> ScoreSuggestion {
    let dim = |value: f64| DimensionSuggestion {
        value,
        reasoning: format!("scripted {value}"),
    };
    ScoreSuggestion {
        reach: dim(reach),
        impact: dim(impact),
        confidence: dim(confidence),
        effort: dim(effort),
        overall_rationale: "scripted".to_string(),
        assumptions: Vec::new(),
    }
}
