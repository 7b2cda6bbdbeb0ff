//! Signal capture and triage

use super::Workspace;
use crate::error::{FoundryError, Result};
use foundry_model::{
    EntityId, EntityKind, Patch, Signal, SignalPatch, SignalStatus, StructuredSignal,
};
use foundry_store::{EntityStore, Filter, StoreExt};
use tracing::info;

impl<S: EntityStore> Workspace<S> {
    /// Capture a signal; always starts as `new`
    ///
    /// # Errors
    /// The store rejected the insert.
    pub async fn create_signal(&self, mut signal: Signal) -> Result<Signal> {
        signal.status = SignalStatus::New;
        let signal = self.insert(signal).await?;
        info!(signal = %signal.id, source = ?signal.source, "signal captured");
        Ok(signal)
    }

    /// Capture a signal from a structured template
    ///
    /// The template's text becomes `raw_text`; `source` falls back to the
    /// template default when `base` has none.
    ///
    /// # Errors
    /// [`FoundryError::InvalidInput`] when a required template field is
    /// empty, otherwise store errors.
    pub async fn compose_signal(&self, input: &StructuredSignal, base: Signal) -> Result<Signal> {
        if let Some(message) = input.validate() {
            return Err(FoundryError::InvalidInput(message.to_string()));
        }
        let source = base.source.or_else(|| input.default_source());
        let signal = Signal {
            raw_text: input.compose(),
            source,
            ..base
        };
        self.create_signal(signal).await
    }

    /// All signals, newest first
    ///
    /// # Errors
    /// Store read failed.
    pub async fn list_signals(&self) -> Result<Vec<Signal>> {
        let mut signals = self
            .store
            .find_as::<Signal>(EntityKind::Signal, &Filter::All)
            .await?;
        signals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(signals)
    }

    /// Single signal
    ///
    /// # Errors
    /// Store read failed.
    pub async fn signal(&self, id: &EntityId) -> Result<Option<Signal>> {
        Ok(self.store.get::<Signal>(EntityKind::Signal, id).await?)
    }

    /// Partial update; a missing id is a no-op
    ///
    /// # Errors
    /// Store write failed.
    pub async fn update_signal(&self, id: &EntityId, patch: SignalPatch) -> Result<()> {
        self.store
            .update(EntityKind::Signal, id, Patch::Signal(patch))
            .await?;
        Ok(())
    }

    /// Delete a signal and its problem links
    ///
    /// # Errors
    /// Store write failed.
    pub async fn delete_signal(&self, id: &EntityId) -> Result<()> {
        self.store.delete(EntityKind::Signal, id).await?;
        info!(signal = %id, "signal deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundry_model::signal_compose::DataFields;
    use foundry_model::SignalSource;
    use foundry_store::MemoryStore;

    fn workspace() -> Workspace<MemoryStore> {
        Workspace::new(MemoryStore::new())
    }

    #[tokio::test]
    async fn created_signals_start_new() {
        let ws = workspace();
        let mut signal = Signal::new("exports time out");
        signal.status = SignalStatus::Discarded;
        let stored = ws.create_signal(signal).await.unwrap();
        assert_eq!(stored.status, SignalStatus::New);
    }

    #[tokio::test]
    async fn composed_signal_uses_template_text_and_source() {
        let ws = workspace();
        let input = StructuredSignal::Data(DataFields {
            metric: "Weekly exports".into(),
            current_value: "120".into(),
            ..DataFields::default()
        });
        let stored = ws
            .compose_signal(&input, Signal::new(String::new()))
            .await
            .unwrap();
        assert_eq!(stored.raw_text, "Metric: Weekly exports\nCurrent: 120");
        assert_eq!(stored.source, Some(SignalSource::Other));

        let explicit = ws
            .compose_signal(&input, Signal::new(String::new()).with_source(SignalSource::Slack))
            .await
            .unwrap();
        assert_eq!(explicit.source, Some(SignalSource::Slack));
    }

    #[tokio::test]
    async fn invalid_template_is_rejected_before_insert() {
        let ws = workspace();
        let input = StructuredSignal::Data(DataFields::default());
        let err = ws
            .compose_signal(&input, Signal::new(String::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, FoundryError::InvalidInput(ref m) if m == "Metric name is required"));
        assert!(ws.list_signals().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn signals_list_newest_first() {
        let ws = workspace();
        let mut older = Signal::new("older").with_id("s-old");
        older.created_at -= chrono::Duration::hours(1);
        ws.create_signal(older).await.unwrap();
        ws.create_signal(Signal::new("newer").with_id("s-new"))
            .await
            .unwrap();

        let ids: Vec<_> = ws
            .list_signals()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id.to_string())
            .collect();
        assert_eq!(ids, ["s-new", "s-old"]);
    }
}
