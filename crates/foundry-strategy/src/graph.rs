//! Graph Builder
//!
//! Projects a whole [`Dataset`] into typed nodes and edges and flags every
//! node whose status claims more than its links support.
//!
//! # Shape
//!
//! - Node ids are `{type}-{entity id}`; nodes come out objectives first,
//!   then roadmap items, problems, signals, each in store order.
//! - `contains` edges are only emitted when the parent is present.
//! - Orphan flags use the same predicates as the status gate.

use crate::index::JustificationIndex;
use foundry_model::{
    Dataset, EffortSize, EntityId, Frequency, RoadmapItemObjective, RoadmapItemProblem,
    RoadmapItemType, Severity, SignalProblem, SignalSource,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Kind of graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Objective,
    Initiative,
    Epic,
    Feature,
    Problem,
    Signal,
}

impl NodeType {
    /// Wire spelling, also the node id prefix
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Objective => "objective",
            Self::Initiative => "initiative",
            Self::Epic => "epic",
            Self::Feature => "feature",
            Self::Problem => "problem",
            Self::Signal => "signal",
        }
    }

    /// Node id for an entity of this type
    #[must_use]
    pub fn node_id(&self, entity_id: &EntityId) -> String {
        format!("{}-{}", self.as_str(), entity_id)
    }
}

impl From<RoadmapItemType> for NodeType {
    fn from(value: RoadmapItemType) -> Self {
        match value {
            RoadmapItemType::Initiative => Self::Initiative,
            RoadmapItemType::Epic => Self::Epic,
            RoadmapItemType::Feature => Self::Feature,
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of graph edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Roadmap item → objective
    AlignsTo,
    /// Child roadmap item → parent roadmap item
    Contains,
    /// Roadmap item → problem
    JustifiedBy,
    /// Problem → signal
    DerivedFrom,
}

/// Type-specific node details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeMeta {
    #[serde(rename_all = "camelCase")]
    Objective {
        weight: f64,
        timeframe: Option<String>,
        metric: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    RoadmapItem {
        score: Option<f64>,
        effort_size: Option<EffortSize>,
        target_month: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Problem {
        severity: Option<Severity>,
        frequency: Option<Frequency>,
    },
    #[serde(rename_all = "camelCase")]
    Signal {
        source: Option<SignalSource>,
        customer: Option<String>,
        arr: Option<String>,
    },
}

/// One entity in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub entity_id: EntityId,
    pub label: String,
    pub status: Option<String>,
    pub is_orphan: bool,
    pub meta: NodeMeta,
}

/// One relationship in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

/// Full graph projection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphSnapshot {
    /// Node by graph id
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Nodes currently flagged as orphans
    pub fn orphans(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(|n| n.is_orphan)
    }

    /// Edges of one type
    pub fn edges_of(&self, edge_type: EdgeType) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.edge_type == edge_type)
    }
}

fn group_by<'a, L, F>(links: &'a [L], key: F) -> HashMap<&'a EntityId, Vec<&'a L>>
where
    F: Fn(&'a L) -> &'a EntityId,
{
    let mut grouped: HashMap<&EntityId, Vec<&L>> = HashMap::new();
    for link in links {
        grouped.entry(key(link)).or_default().push(link);
    }
    grouped
}

/// Builds a [`GraphSnapshot`] from a dataset
///
/// Usage:
/// ```rust,ignore
/// let snapshot = GraphBuilder::new(&dataset).build();
/// let orphans = snapshot.orphans().count();
/// ```
#[derive(Debug)]
pub struct GraphBuilder<'a> {
    dataset: &'a Dataset,
    index: JustificationIndex,
}

impl<'a> GraphBuilder<'a> {
    /// Index `dataset` for building
    #[must_use]
    pub fn new(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            index: JustificationIndex::build(dataset),
        }
    }

    /// The shared justification index
    #[inline]
    #[must_use]
    pub fn index(&self) -> &JustificationIndex {
        &self.index
    }

    /// Produce nodes and edges
    #[must_use]
    pub fn build(&self) -> GraphSnapshot {
        let data = self.dataset;
        let mut nodes = Vec::with_capacity(
            data.objectives.len() + data.roadmap_items.len() + data.problems.len() + data.signals.len(),
        );
        let mut edges = Vec::new();

        for objective in &data.objectives {
            nodes.push(GraphNode {
                id: NodeType::Objective.node_id(&objective.id),
                node_type: NodeType::Objective,
                entity_id: objective.id.clone(),
                label: objective.name.clone(),
                status: None,
                is_orphan: false,
                meta: NodeMeta::Objective {
                    weight: objective.weight,
                    timeframe: objective.timeframe.clone(),
                    metric: objective.metric.clone(),
                },
            });
        }

        let objective_links: HashMap<&EntityId, Vec<&RoadmapItemObjective>> =
            group_by(&data.roadmap_item_objectives, |l| &l.roadmap_item_id);
        let problem_links: HashMap<&EntityId, Vec<&RoadmapItemProblem>> =
            group_by(&data.roadmap_item_problems, |l| &l.roadmap_item_id);

        for item in &data.roadmap_items {
            let node_type = NodeType::from(item.item_type);
            let node_id = node_type.node_id(&item.id);

            for link in objective_links.get(&item.id).into_iter().flatten() {
                edges.push(GraphEdge {
                    id: format!("edge-alignsto-{}", link.id),
                    source: node_id.clone(),
                    target: NodeType::Objective.node_id(&link.objective_id),
                    edge_type: EdgeType::AlignsTo,
                });
            }

            if let Some(parent_id) = &item.parent_id {
                if let Some(parent) = self.index.entry(parent_id) {
                    edges.push(GraphEdge {
                        id: format!("edge-contains-{}", item.id),
                        source: node_id.clone(),
                        target: NodeType::from(parent.item_type).node_id(parent_id),
                        edge_type: EdgeType::Contains,
                    });
                }
            }

            for link in problem_links.get(&item.id).into_iter().flatten() {
                edges.push(GraphEdge {
                    id: format!("edge-justifiedby-{}", link.id),
                    source: node_id.clone(),
                    target: NodeType::Problem.node_id(&link.problem_id),
                    edge_type: EdgeType::JustifiedBy,
                });
            }

            nodes.push(GraphNode {
                id: node_id,
                node_type,
                entity_id: item.id.clone(),
                label: item.title.clone(),
                status: Some(item.status.to_string()),
                is_orphan: self.index.is_orphan_item(item),
                meta: NodeMeta::RoadmapItem {
                    score: item.score,
                    effort_size: item.effort_size,
                    target_month: item.target_month.clone(),
                },
            });
        }

        let signal_links: HashMap<&EntityId, Vec<&SignalProblem>> =
            group_by(&data.signal_problems, |l| &l.problem_id);

        for problem in &data.problems {
            let node_id = NodeType::Problem.node_id(&problem.id);
            for link in signal_links.get(&problem.id).into_iter().flatten() {
                edges.push(GraphEdge {
                    id: format!("edge-derivedfrom-{}", link.id),
                    source: node_id.clone(),
                    target: NodeType::Signal.node_id(&link.signal_id),
                    edge_type: EdgeType::DerivedFrom,
                });
            }
            nodes.push(GraphNode {
                id: node_id,
                node_type: NodeType::Problem,
                entity_id: problem.id.clone(),
                label: problem.title.clone(),
                status: Some(problem.status.to_string()),
                is_orphan: self.index.is_orphan_problem(&problem.id, problem.status),
                meta: NodeMeta::Problem {
                    severity: problem.severity,
                    frequency: problem.frequency,
                },
            });
        }

        for signal in &data.signals {
            nodes.push(GraphNode {
                id: NodeType::Signal.node_id(&signal.id),
                node_type: NodeType::Signal,
                entity_id: signal.id.clone(),
                label: signal.label(),
                status: Some(signal.status.to_string()),
                is_orphan: false,
                meta: NodeMeta::Signal {
                    source: signal.source,
                    customer: signal.customer.clone(),
                    arr: signal.arr.clone(),
                },
            });
        }

        GraphSnapshot { nodes, edges }
    }
}

/// Build the graph for `dataset`
#[must_use]
pub fn build_graph(dataset: &Dataset) -> GraphSnapshot {
    GraphBuilder::new(dataset).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundry_model::{Objective, Problem, RoadmapItem, Signal};
    use pretty_assertions::assert_eq;

    #[test]
    fn node_ids_and_order() {
        let dataset = Dataset::new()
            .with(Signal::new("raw").with_id("s"))
            .with(Problem::new("P", "s").with_id("p"))
            .with(RoadmapItem::new("E", RoadmapItemType::Epic).with_id("e"))
            .with(Objective::new("O").with_id("o"));
        let snapshot = build_graph(&dataset);
        let ids: Vec<_> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["objective-o", "epic-e", "problem-p", "signal-s"]);
        assert_eq!(snapshot.node("objective-o").unwrap().status, None);
        assert_eq!(snapshot.node("signal-s").unwrap().label, "Signal");
    }

    #[test]
    fn contains_edge_requires_present_parent() {
        let dataset = Dataset::new()
            .with(RoadmapItem::new("N", RoadmapItemType::Initiative).with_id("n"))
            .with(RoadmapItem::new("E", RoadmapItemType::Epic).with_id("e").with_parent("n"))
            .with(RoadmapItem::new("F", RoadmapItemType::Feature).with_id("f").with_parent("gone"));
        let snapshot = build_graph(&dataset);
        let contains: Vec<_> = snapshot.edges_of(EdgeType::Contains).collect();
        assert_eq!(contains.len(), 1);
        assert_eq!(contains[0].id, "edge-contains-e");
        assert_eq!(contains[0].source, "epic-e");
        assert_eq!(contains[0].target, "initiative-n");
    }

    #[test]
    fn serializes_in_camel_case() {
        let dataset = Dataset::new().with(Objective::new("Grow").with_id("o").with_metric("ARR"));
        let json = serde_json::to_value(build_graph(&dataset)).unwrap();
        let node = &json["nodes"][0];
        assert_eq!(node["type"], "objective");
        assert_eq!(node["entityId"], "o");
        assert_eq!(node["isOrphan"], false);
        assert_eq!(node["meta"]["metric"], "ARR");
        assert_eq!(node["meta"]["weight"], 1.0);
    }

    #[test]
    fn roadmap_meta_uses_camel_case_fields() {
        let mut item = RoadmapItem::new("F", RoadmapItemType::Feature).with_id("f");
        item.target_month = Some("2025-03".into());
        item.effort_size = Some(EffortSize::M);
        let json = serde_json::to_value(build_graph(&Dataset::new().with(item))).unwrap();
        let meta = &json["nodes"][0]["meta"];
        assert_eq!(meta["targetMonth"], "2025-03");
        assert_eq!(meta["effortSize"], "M");
        assert!(meta["score"].is_null());
    }
}
