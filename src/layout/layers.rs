use std::collections::HashMap;

use serde::Serialize;

use crate::ir::{EdgeKind, FilteredGraph, NodeKind};

pub const LAYER_COUNT: usize = 4;

/// Fixed layer index per node kind. Unclassified nodes share the table layer.
pub fn layer_of(kind: NodeKind) -> usize {
    match kind {
        NodeKind::OriginSystem => 0,
        NodeKind::OriginTable => 1,
        NodeKind::CanonicalEntity => 2,
        NodeKind::Consumer => 3,
        NodeKind::Unclassified => 1,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "anomaly", rename_all = "kebab-case")]
pub enum LayerAnomaly {
    /// Type string not recognized, placed on the default layer.
    UnclassifiedNode { id: String },
    /// Origin-table with no owning system to filter or color by.
    OrphanTable { id: String },
    /// Hierarchy edge whose endpoints are not on adjacent layers.
    SkippedLayer { source: String, target: String },
    /// Hierarchy edge to a node that names a different parent.
    ForeignParent {
        source: String,
        target: String,
        parent: String,
    },
    /// Edge pointing right-to-left.
    BackwardEdge { source: String, target: String },
}

/// Per-layer counts and conflicts. Diagnostic only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerReport {
    pub counts: [usize; LAYER_COUNT],
    pub anomalies: Vec<LayerAnomaly>,
}

impl LayerReport {
    pub fn from_graph(graph: &FilteredGraph) -> Self {
        let mut report = Self::default();
        let mut layers: HashMap<&str, usize> = HashMap::new();
        let mut parents: HashMap<&str, &str> = HashMap::new();

        for node in &graph.nodes {
            let layer = layer_of(node.kind);
            report.counts[layer] += 1;
            layers.insert(node.id.as_str(), layer);
            if let Some(parent) = node.parent_id.as_deref() {
                parents.insert(node.id.as_str(), parent);
            }
            match node.kind {
                NodeKind::Unclassified => report
                    .anomalies
                    .push(LayerAnomaly::UnclassifiedNode { id: node.id.clone() }),
                NodeKind::OriginTable if node.owner_system.is_none() => report
                    .anomalies
                    .push(LayerAnomaly::OrphanTable { id: node.id.clone() }),
                _ => {}
            }
        }

        for edge in &graph.edges {
            let (Some(&from), Some(&to)) = (
                layers.get(edge.source.as_str()),
                layers.get(edge.target.as_str()),
            ) else {
                continue;
            };
            if to < from {
                report.anomalies.push(LayerAnomaly::BackwardEdge {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                });
            }
            if edge.kind != EdgeKind::Hierarchy {
                continue;
            }
            if to != from + 1 {
                report.anomalies.push(LayerAnomaly::SkippedLayer {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                });
            }
            if let Some(&parent) = parents.get(edge.target.as_str())
                && parent != edge.source
            {
                report.anomalies.push(LayerAnomaly::ForeignParent {
                    source: edge.source.clone(),
                    target: edge.target.clone(),
                    parent: parent.to_string(),
                });
            }
        }
        report
    }

    pub fn populated_layers(&self) -> usize {
        self.counts.iter().filter(|count| **count > 0).count()
    }

    pub fn log(&self) {
        tracing::debug!(counts = ?self.counts, "layer assignment");
        for anomaly in &self.anomalies {
            tracing::warn!(?anomaly, "layer anomaly");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasTable;
    use crate::filter::{Selection, filter_graph};
    use crate::ir::Snapshot;

    #[test]
    fn fixed_layer_table() {
        assert_eq!(layer_of(NodeKind::OriginSystem), 0);
        assert_eq!(layer_of(NodeKind::OriginTable), 1);
        assert_eq!(layer_of(NodeKind::CanonicalEntity), 2);
        assert_eq!(layer_of(NodeKind::Consumer), 3);
        assert_eq!(layer_of(NodeKind::Unclassified), 1);
    }

    #[test]
    fn report_counts_and_flags_without_failing() {
        let mut s = Snapshot::new();
        s.push_node("crm", "CRM", "origin-system", None, None);
        s.push_node("crm.a", "a", "origin-table", Some("crm"), Some("crm"));
        s.push_node("loose", "loose", "origin-table", None, None);
        s.push_node("mystery", "??", "dashboard", None, None);
        s.push_node("acct", "Account", "canonical-entity", None, None);
        s.push_edge("crm", "crm.a", "hierarchy", None);
        s.push_edge("crm", "acct", "hierarchy", None);
        s.push_edge("acct", "crm.a", "dataflow", None);
        let graph = filter_graph(&s, &Selection::all(), &AliasTable::default());
        let report = LayerReport::from_graph(&graph);

        assert_eq!(report.counts, [1, 3, 1, 0]);
        assert_eq!(report.populated_layers(), 3);
        assert!(report.anomalies.contains(&LayerAnomaly::UnclassifiedNode { id: "mystery".into() }));
        assert!(report.anomalies.contains(&LayerAnomaly::OrphanTable { id: "loose".into() }));
        assert!(report.anomalies.contains(&LayerAnomaly::SkippedLayer {
            source: "crm".into(),
            target: "acct".into()
        }));
        assert!(report.anomalies.contains(&LayerAnomaly::BackwardEdge {
            source: "acct".into(),
            target: "crm.a".into()
        }));
    }
}
