//! AI suggestion flows
//!
//! The generator only proposes. Problems, links and scores are written when
//! a human accepts a suggestion through one of the `accept_*` or
//! [`Workspace::apply_score_suggestion`] calls.

use super::{non_blank, Workspace};
use crate::ai::{
    ExtractionResult, ScoreSuggestion, ScoringContext, ScoringObjective, ScoringProblem,
    SignalContext, SuggestedProblem,
};
use crate::error::{FoundryError, Result};
use foundry_model::{EntityId, EntityKind, Problem, Signal, SignalPatch, SignalStatus};
use foundry_store::{EntityStore, StoreExt};
use tracing::{debug, info};

impl<S: EntityStore> Workspace<S> {
    /// Extract quotes, draft problems and missing metadata from a signal
    ///
    /// # Errors
    /// [`FoundryError::NotFound`] for an unknown signal, or generation
    /// failed.
    pub async fn analyze_signal(&self, signal_id: &EntityId) -> Result<ExtractionResult> {
        let signal: Signal = self.require(EntityKind::Signal, signal_id).await?;
        let generator = self.generator()?;
        let context = SignalContext {
            raw_text: signal.raw_text,
            source: signal.source,
            customer: signal.customer,
            arr: signal.arr,
            severity: signal.severity,
            frequency: signal.frequency,
        };
        let result = generator.extract_signal_insights(context).await?;
        info!(
            signal = %signal_id,
            quotes = result.quotes.len(),
            problems = result.suggested_problems.len(),
            sentiment = ?result.customer_sentiment,
            "signal analyzed"
        );
        Ok(result)
    }

    /// Turn one suggestion into a draft problem backed by the signal
    ///
    /// The signal is marked `processed`.
    ///
    /// # Errors
    /// [`FoundryError::NotFound`] for an unknown signal, or a store write
    /// failed.
    pub async fn accept_suggested_problem(
        &self,
        signal_id: &EntityId,
        suggestion: &SuggestedProblem,
        quote: Option<String>,
    ) -> Result<Problem> {
        self.require::<Signal>(EntityKind::Signal, signal_id).await?;
        let problem = self.accept_one(signal_id, suggestion, quote).await?;
        self.update_signal(signal_id, SignalPatch::status(SignalStatus::Processed))
            .await?;
        Ok(problem)
    }

    /// Accept every suggestion from one analysis
    ///
    /// Suggestion `i` is linked with `quotes[i]`, falling back to the first
    /// quote, or none when there are no quotes.
    ///
    /// # Errors
    /// [`FoundryError::NotFound`] for an unknown signal, or a store write
    /// failed. Problems accepted before the failure are kept.
    pub async fn accept_all_suggested_problems(
        &self,
        signal_id: &EntityId,
        suggestions: &[SuggestedProblem],
        quotes: &[String],
    ) -> Result<Vec<Problem>> {
        self.require::<Signal>(EntityKind::Signal, signal_id).await?;
        let mut problems = Vec::with_capacity(suggestions.len());
        for (i, suggestion) in suggestions.iter().enumerate() {
            let quote = quotes.get(i).or_else(|| quotes.first()).cloned();
            problems.push(self.accept_one(signal_id, suggestion, quote).await?);
        }
        self.update_signal(signal_id, SignalPatch::status(SignalStatus::Processed))
            .await?;
        info!(signal = %signal_id, accepted = problems.len(), "suggested problems accepted");
        Ok(problems)
    }

    async fn accept_one(
        &self,
        signal_id: &EntityId,
        suggestion: &SuggestedProblem,
        quote: Option<String>,
    ) -> Result<Problem> {
        let mut problem = Problem::new(&suggestion.title, &suggestion.statement);
        problem.who_affected.clone_from(&suggestion.who_affected);
        problem.severity = suggestion.severity;
        let problem = self.create_problem(problem).await?;
        self.link_signal_to_problem(&problem.id, signal_id, non_blank(quote))
            .await?;
        Ok(problem)
    }

    /// Suggest RICE inputs for a roadmap item
    ///
    /// Nothing is written; see [`Workspace::apply_score_suggestion`].
    ///
    /// # Errors
    /// [`FoundryError::NotFound`] for an unknown item, or generation failed.
    pub async fn suggest_item_score(&self, item_id: &EntityId) -> Result<ScoreSuggestion> {
        let loaded = self
            .store
            .roadmap_item_with_links(item_id)
            .await?
            .ok_or_else(|| FoundryError::not_found(EntityKind::RoadmapItem, item_id))?;
        let generator = self.generator()?;

        let context = ScoringContext {
            title: loaded.item.title,
            description: loaded.item.description,
            rationale: loaded.item.rationale,
            item_type: loaded.item.item_type,
            problems: loaded
                .problems
                .into_iter()
                .map(|linked| ScoringProblem {
                    title: linked.problem.title,
                    statement: linked.problem.statement,
                    severity: linked.problem.severity,
                })
                .collect(),
            objectives: loaded
                .objectives
                .into_iter()
                .map(|linked| ScoringObjective {
                    name: linked.objective.name,
                    metric: linked.objective.metric,
                    weight: linked.objective.weight,
                })
                .collect(),
        };
        debug!(
            item = %item_id,
            problems = context.problems.len(),
            objectives = context.objectives.len(),
            "requesting score suggestion"
        );
        Ok(generator.suggest_scores(context).await?)
    }
}
