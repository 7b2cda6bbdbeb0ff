use foundry_model::{
    EntityKind, Objective, Patch, Problem, ProblemPatch, ProblemStatus, RoadmapItem,
    RoadmapItemObjective, RoadmapItemProblem, RoadmapItemType, Signal, SignalProblem,
};
use foundry_store::{EntityStore, FileStore, Filter, StoreExt};

#[tokio::test]
async fn missing_file_opens_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("nested/foundry.json")).await.unwrap();
    assert!(store.snapshot().is_empty());
    assert!(!store.path().exists());
}

#[tokio::test]
async fn writes_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foundry.json");

    {
        let store = FileStore::open(&path).await.unwrap();
        store.insert(Problem::new("Export", "Exports time out").with_id("p1").into()).await.unwrap();
        store
            .insert(RoadmapItem::new("Export v2", RoadmapItemType::Initiative).with_id("i1").into())
            .await
            .unwrap();
        store
            .insert(RoadmapItemProblem::new("i1".into(), "p1".into()).into())
            .await
            .unwrap();
        store
            .update(
                EntityKind::Problem,
                &"p1".into(),
                Patch::Problem(ProblemPatch::status(ProblemStatus::Accepted)),
            )
            .await
            .unwrap();
    }

    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    let reopened = FileStore::open(&path).await.unwrap();
    let problem = reopened
        .get::<Problem>(EntityKind::Problem, &"p1".into())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(problem.status, ProblemStatus::Accepted);
    let links = reopened
        .find(EntityKind::RoadmapItemProblem, &Filter::RoadmapItem("i1".into()))
        .await
        .unwrap();
    assert_eq!(links.len(), 1);
}

#[tokio::test]
async fn corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foundry.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = FileStore::open(&path).await.unwrap_err();
    assert!(matches!(err, foundry_store::StoreError::Serialization(_)));
}

#[tokio::test]
async fn delete_cascade_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("foundry.json");
    let store = FileStore::open(&path).await.unwrap();
    store.insert(Signal::new("CSV export fails").with_id("s1").into()).await.unwrap();
    store.insert(Problem::new("Export", "fails").with_id("p1").into()).await.unwrap();
    store
        .insert(SignalProblem::new("s1".into(), "p1".into(), None).into())
        .await
        .unwrap();
    store.delete(EntityKind::Signal, &"s1".into()).await.unwrap();

    let reopened = FileStore::open(&path).await.unwrap();
    let dataset = reopened.load_dataset().await.unwrap();
    assert!(dataset.signals.is_empty());
    assert!(dataset.signal_problems.is_empty());
    assert_eq!(dataset.problems.len(), 1);
}

#[tokio::test]
async fn failed_write_leaves_memory_and_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ws.json");
    let temp = dir.path().join("ws.json.tmp");
    let store = FileStore::open(&path).await.unwrap();
    store.insert(Problem::new("Export", "fails").with_id("p1").into()).await.unwrap();

    // a directory in the temp file's place makes every write fail
    std::fs::create_dir(&temp).unwrap();

    let err = store
        .insert(Signal::new("CSV export fails").with_id("s1").into())
        .await
        .unwrap_err();
    assert!(err.is_retryable());
    assert!(store.find(EntityKind::Signal, &Filter::All).await.unwrap().is_empty());

    store
        .update(
            EntityKind::Problem,
            &"p1".into(),
            Patch::Problem(ProblemPatch::status(ProblemStatus::Accepted)),
        )
        .await
        .unwrap_err();
    store.delete(EntityKind::Problem, &"p1".into()).await.unwrap_err();
    let problem = store
        .get::<Problem>(EntityKind::Problem, &"p1".into())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(problem.status, ProblemStatus::Draft);

    std::fs::remove_dir(&temp).unwrap();
    store
        .insert(Signal::new("CSV export fails").with_id("s1").into())
        .await
        .unwrap();

    let dataset = FileStore::open(&path).await.unwrap().load_dataset().await.unwrap();
    assert_eq!(dataset.signals.len(), 1);
    assert_eq!(dataset.problems.len(), 1);
    assert_eq!(dataset.problems[0].status, ProblemStatus::Draft);
}

#[tokio::test]
async fn eager_loading_follows_links() {
    let store = foundry_store::MemoryStore::new();
    store.insert(Objective::new("Grow enterprise").with_id("o1").into()).await.unwrap();
    store.insert(Problem::new("Export", "fails").with_id("p1").into()).await.unwrap();
    store
        .insert(RoadmapItem::new("Platform", RoadmapItemType::Initiative).with_id("n").into())
        .await
        .unwrap();
    store
        .insert(
            RoadmapItem::new("Exports", RoadmapItemType::Epic)
                .with_id("e")
                .with_parent("n")
                .into(),
        )
        .await
        .unwrap();
    store
        .insert(
            RoadmapItem::new("CSV", RoadmapItemType::Feature)
                .with_id("f")
                .with_parent("e")
                .into(),
        )
        .await
        .unwrap();
    store
        .insert(RoadmapItemProblem::new("n".into(), "p1".into()).into())
        .await
        .unwrap();
    store
        .insert(RoadmapItemObjective::new("n".into(), "o1".into(), Some(8)).into())
        .await
        .unwrap();

    let epic = store.roadmap_item_with_links(&"e".into()).await.unwrap().unwrap();
    assert_eq!(epic.parent.map(|p| p.id), Some("n".into()));
    assert_eq!(epic.children.len(), 1);
    assert!(epic.problems.is_empty());

    let initiative = store.roadmap_item_with_links(&"n".into()).await.unwrap().unwrap();
    assert_eq!(initiative.problems[0].problem.title, "Export");
    assert_eq!(initiative.objectives[0].objective.name, "Grow enterprise");

    let problem = store.problem_with_links(&"p1".into()).await.unwrap().unwrap();
    assert_eq!(problem.roadmap_items.len(), 1);

    let feature = store
        .get::<RoadmapItem>(EntityKind::RoadmapItem, &"f".into())
        .await
        .unwrap()
        .unwrap();
    let lineage = store.hierarchy_for(feature).await.unwrap();
    let ids: Vec<_> = lineage.roadmap_items.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["f", "e", "n"]);
    assert_eq!(lineage.problems.len(), 1);
    assert_eq!(lineage.roadmap_item_objectives.len(), 1);
}

#[tokio::test]
async fn hierarchy_walk_stops_on_cycles() {
    let store = foundry_store::MemoryStore::new();
    store
        .insert(
            RoadmapItem::new("A", RoadmapItemType::Epic)
                .with_id("a")
                .with_parent("b")
                .into(),
        )
        .await
        .unwrap();
    store
        .insert(
            RoadmapItem::new("B", RoadmapItemType::Epic)
                .with_id("b")
                .with_parent("a")
                .into(),
        )
        .await
        .unwrap();
    let a = store
        .get::<RoadmapItem>(EntityKind::RoadmapItem, &"a".into())
        .await
        .unwrap()
        .unwrap();
    let lineage = store.hierarchy_for(a).await.unwrap();
    assert_eq!(lineage.roadmap_items.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn dataset_loads_never_see_links_without_their_signal() {
    let store = std::sync::Arc::new(foundry_store::MemoryStore::new());
    store.insert(Problem::new("Export", "fails").with_id("p1").into()).await.unwrap();

    let writer = {
        let store = std::sync::Arc::clone(&store);
        tokio::spawn(async move {
            for n in 0..200 {
                let signal = format!("s{n}");
                store
                    .insert(Signal::new("export report").with_id(signal.as_str()).into())
                    .await
                    .unwrap();
                store
                    .insert(SignalProblem::new(signal.as_str().into(), "p1".into(), None).into())
                    .await
                    .unwrap();
            }
        })
    };

    while !writer.is_finished() {
        let dataset = store.load_dataset().await.unwrap();
        for link in &dataset.signal_problems {
            assert!(
                dataset.signals.iter().any(|s| s.id == link.signal_id),
                "link to {} without its signal",
                link.signal_id
            );
        }
        tokio::task::yield_now().await;
    }
    writer.await.unwrap();
    assert_eq!(store.load_dataset().await.unwrap().signal_problems.len(), 200);
}
