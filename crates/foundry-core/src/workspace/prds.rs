//! PRD documents

use super::Workspace;
use crate::error::Result;
use foundry_model::{EntityId, EntityKind, Patch, Prd, PrdPatch, PrdSection, PrdStatus};
use foundry_store::{EntityStore, Filter, StoreExt};
use tracing::{debug, info};

impl<S: EntityStore> Workspace<S> {
    /// Create a PRD; always starts as `draft`
    ///
    /// # Errors
    /// The roadmap item does not exist, or the store rejected the insert.
    pub async fn create_prd(&self, mut prd: Prd) -> Result<Prd> {
        prd.status = PrdStatus::Draft;
        let prd = self.insert(prd).await?;
        info!(prd = %prd.id, item = ?prd.roadmap_item_id.as_ref().map(EntityId::as_str), "prd created");
        Ok(prd)
    }

    /// All PRDs, newest first
    ///
    /// # Errors
    /// Store read failed.
    pub async fn list_prds(&self) -> Result<Vec<Prd>> {
        let mut prds = self.store.find_as::<Prd>(EntityKind::Prd, &Filter::All).await?;
        prds.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(prds)
    }

    /// Single PRD
    ///
    /// # Errors
    /// Store read failed.
    pub async fn prd(&self, id: &EntityId) -> Result<Option<Prd>> {
        Ok(self.store.get::<Prd>(EntityKind::Prd, id).await?)
    }

    /// Partial update
    ///
    /// # Errors
    /// Store write failed.
    pub async fn update_prd(&self, id: &EntityId, patch: PrdPatch) -> Result<()> {
        self.store.update(EntityKind::Prd, id, Patch::Prd(patch)).await?;
        Ok(())
    }

    /// Replace one section's text
    ///
    /// # Errors
    /// Store write failed.
    pub async fn update_prd_section(
        &self,
        id: &EntityId,
        section: PrdSection,
        content: impl Into<String> + Send,
    ) -> Result<()> {
        let mut patch = PrdPatch::default();
        *section_slot(&mut patch, section) = Some(Some(content.into()));
        self.update_prd(id, patch).await?;
        debug!(prd = %id, ?section, "prd section updated");
        Ok(())
    }

    /// Delete a PRD
    ///
    /// # Errors
    /// Store write failed.
    pub async fn delete_prd(&self, id: &EntityId) -> Result<()> {
        self.store.delete(EntityKind::Prd, id).await?;
        info!(prd = %id, "prd deleted");
        Ok(())
    }
}

fn section_slot(patch: &mut PrdPatch, section: PrdSection) -> &mut Option<Option<String>> {
    match section {
        PrdSection::Summary => &mut patch.summary,
        PrdSection::ProblemStatement => &mut patch.problem_statement,
        PrdSection::Objectives => &mut patch.objectives,
        PrdSection::UserStories => &mut patch.user_stories,
        PrdSection::DesignAssetLink => &mut patch.design_asset_link,
        PrdSection::OpenQuestions => &mut patch.open_questions,
        PrdSection::AcceptanceCriteria => &mut patch.acceptance_criteria,
        PrdSection::Evidence => &mut patch.evidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundry_model::{RoadmapItem, RoadmapItemType};
    use foundry_store::MemoryStore;

    #[tokio::test]
    async fn sections_update_independently() {
        let ws = Workspace::new(MemoryStore::new());
        let mut prd = Prd::new("Export v2").with_id("d1");
        prd.status = PrdStatus::Ready;
        let stored = ws.create_prd(prd).await.unwrap();
        assert_eq!(stored.status, PrdStatus::Draft);

        ws.update_prd_section(&"d1".into(), PrdSection::Summary, "Faster exports")
            .await
            .unwrap();
        ws.update_prd_section(&"d1".into(), PrdSection::Evidence, "12 tickets")
            .await
            .unwrap();

        let mut stored = ws.prd(&"d1".into()).await.unwrap().unwrap();
        assert_eq!(stored.summary.as_deref(), Some("Faster exports"));
        assert_eq!(stored.section_mut(PrdSection::Evidence).as_deref(), Some("12 tickets"));
        assert_eq!(stored.open_questions, None);
    }

    #[tokio::test]
    async fn deleting_item_detaches_prd() {
        let ws = Workspace::new(MemoryStore::new());
        ws.create_roadmap_item(RoadmapItem::new("Export", RoadmapItemType::Feature).with_id("f1"))
            .await
            .unwrap();
        ws.create_prd(Prd::new("Export v2").with_id("d1").for_item("f1"))
            .await
            .unwrap();

        ws.delete_roadmap_item(&"f1".into()).await.unwrap();
        let stored = ws.prd(&"d1".into()).await.unwrap().unwrap();
        assert_eq!(stored.roadmap_item_id, None);
    }
}
