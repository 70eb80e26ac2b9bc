//! Derives the working node/edge set from a raw snapshot and a selection.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::alias::{AliasTable, fold_name};
use crate::ir::{Edge, EdgeKind, FilteredGraph, Node, NodeKind, RawNode, Snapshot};

/// Selected origin-systems and consumers. An empty set selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    #[serde(default)]
    pub systems: BTreeSet<String>,
    #[serde(default)]
    pub consumers: BTreeSet<String>,
}

impl Selection {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_systems<I, S>(mut self, systems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.systems = systems.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_consumers<I, S>(mut self, consumers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.consumers = consumers.into_iter().map(Into::into).collect();
        self
    }
}

struct SystemIndex {
    aliases: AliasTable,
    slots: BTreeMap<String, usize>,
}

impl SystemIndex {
    /// Keys systems by their canonical id and teaches the alias table each
    /// system's label. A label that is itself a known alias (`PostgreSQL`)
    /// also redirects its canonical target, unless that target is another
    /// system's key. Duplicate ids keep their first occurrence, matching
    /// the node pass.
    fn build(snapshot: &Snapshot, base: &AliasTable) -> Self {
        let mut aliases = base.clone();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut systems: Vec<(String, Option<&str>)> = Vec::new();
        for node in &snapshot.nodes {
            if !seen.insert(node.id.as_str()) || node.kind() != NodeKind::OriginSystem {
                continue;
            }
            systems.push((aliases.canonicalize(&node.id), node.label.as_deref()));
        }

        let mut slots = BTreeMap::new();
        for (key, _) in &systems {
            let next = slots.len();
            slots.entry(key.clone()).or_insert(next);
        }

        for (key, label) in &systems {
            let Some(label) = label else {
                continue;
            };
            if slots.contains_key(&fold_name(label).replace(' ', "_")) {
                continue;
            }
            let target = aliases.canonicalize(label);
            aliases.register(label, key);
            if target != *key && !slots.contains_key(&target) {
                aliases.register(&target, key);
            }
        }
        Self { aliases, slots }
    }

    fn owner_key(&self, node: &RawNode) -> Option<String> {
        let raw = node
            .owner_system_id
            .as_deref()
            .or(node.parent_id.as_deref())?;
        Some(self.aliases.canonicalize(raw))
    }
}

/// Filters `snapshot` down to the nodes and edges visible under `selection`.
///
/// Origin-tables survive only when their canonical owning system is
/// selected; consumers only when the consumer filter is inactive or names
/// them. Every other node is structural and always kept. Edges survive when
/// both endpoints do.
pub fn filter_graph(snapshot: &Snapshot, selection: &Selection, aliases: &AliasTable) -> FilteredGraph {
    let index = SystemIndex::build(snapshot, aliases);

    let selected_systems: Option<BTreeSet<String>> = if selection.systems.is_empty() {
        None
    } else {
        Some(
            selection
                .systems
                .iter()
                .map(|raw| index.aliases.canonicalize(raw))
                .collect(),
        )
    };
    let selected_consumers: Option<&BTreeSet<String>> = if selection.consumers.is_empty() {
        None
    } else {
        Some(&selection.consumers)
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut nodes = Vec::new();
    for raw in &snapshot.nodes {
        if !seen.insert(raw.id.as_str()) {
            tracing::warn!(id = %raw.id, "duplicate node id in snapshot, keeping first occurrence");
            continue;
        }
        let kind = raw.kind();
        let owner = match kind {
            NodeKind::OriginSystem => Some(index.aliases.canonicalize(&raw.id)),
            NodeKind::OriginTable => index.owner_key(raw),
            NodeKind::CanonicalEntity | NodeKind::Consumer | NodeKind::Unclassified => None,
        };
        let keep = match kind {
            NodeKind::OriginSystem | NodeKind::CanonicalEntity | NodeKind::Unclassified => true,
            NodeKind::Consumer => selected_consumers.is_none_or(|set| set.contains(&raw.id)),
            NodeKind::OriginTable => match (&selected_systems, &owner) {
                (None, _) => true,
                (Some(set), Some(key)) => set.contains(key),
                (Some(_), None) => false,
            },
        };
        if !keep {
            continue;
        }
        let palette_slot = owner.as_ref().and_then(|key| index.slots.get(key).copied());
        nodes.push(Node {
            id: raw.id.clone(),
            label: raw.display_label().to_string(),
            kind,
            owner_system: owner,
            parent_id: raw.parent_id.clone(),
            palette_slot,
        });
    }

    let kept: HashSet<&str> = nodes.iter().map(|node| node.id.as_str()).collect();
    let mut edges = Vec::new();
    for raw in &snapshot.edges {
        if raw.source == raw.target {
            tracing::trace!(source = %raw.source, "dropping self-loop edge");
            continue;
        }
        if !kept.contains(raw.source.as_str()) || !kept.contains(raw.target.as_str()) {
            tracing::trace!(source = %raw.source, target = %raw.target, "dropping edge with filtered endpoint");
            continue;
        }
        if let Some(token) = raw.kind.as_deref() {
            if EdgeKind::from_token(token).is_none() {
                tracing::warn!(source = %raw.source, target = %raw.target, kind = token, "unknown edge kind, treating as dataflow");
            }
        }
        edges.push(Edge {
            source: raw.source.clone(),
            target: raw.target.clone(),
            kind: raw.edge_kind(),
            weight: raw.effective_weight(),
            field_mappings: raw.field_mappings.clone(),
            label: raw.label.clone(),
        });
    }

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        systems = ?selected_systems,
        "filtered snapshot"
    );
    FilteredGraph { nodes, edges }
}

impl FilteredGraph {
    /// Re-expresses the working set as a snapshot, owners already canonical.
    pub fn to_snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();
        for node in &self.nodes {
            snapshot.nodes.push(RawNode {
                id: node.id.clone(),
                label: Some(node.label.clone()),
                node_type: node.kind.as_str().to_string(),
                owner_system_id: match node.kind {
                    NodeKind::OriginTable => node.owner_system.clone(),
                    _ => None,
                },
                parent_id: node.parent_id.clone(),
            });
        }
        for edge in &self.edges {
            snapshot.edges.push(crate::ir::RawEdge {
                source: edge.source.clone(),
                target: edge.target.clone(),
                kind: Some(
                    match edge.kind {
                        EdgeKind::Hierarchy => "hierarchy",
                        EdgeKind::Dataflow => "dataflow",
                    }
                    .to_string(),
                ),
                weight: Some(edge.weight),
                field_mappings: edge.field_mappings.clone(),
                label: edge.label.clone(),
            });
        }
        snapshot
    }
}
