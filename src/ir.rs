use serde::{Deserialize, Serialize};

use crate::error::LineageError;

/// Pipeline role of a node. Drives layer, color, filtering and labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    OriginSystem,
    OriginTable,
    CanonicalEntity,
    Consumer,
    /// A type string no stage recognizes. Kept, placed on the table layer,
    /// and reported by validation.
    Unclassified,
}

impl NodeKind {
    pub fn from_token(token: &str) -> Self {
        let normalized: String = token
            .trim()
            .chars()
            .map(|ch| match ch {
                '_' | ' ' => '-',
                other => other.to_ascii_lowercase(),
            })
            .collect();
        match normalized.as_str() {
            "origin-system" | "source-system" | "system" | "source" => Self::OriginSystem,
            "origin-table" | "source-table" | "table" | "collection" => Self::OriginTable,
            "canonical-entity" | "canonical" | "entity" | "unified-entity" => {
                Self::CanonicalEntity
            }
            "consumer" | "agent" => Self::Consumer,
            _ => Self::Unclassified,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OriginSystem => "origin-system",
            Self::OriginTable => "origin-table",
            Self::CanonicalEntity => "canonical-entity",
            Self::Consumer => "consumer",
            Self::Unclassified => "unclassified",
        }
    }

    /// Origin-table nodes are too dense to label.
    pub fn is_labeled(self) -> bool {
        match self {
            Self::OriginSystem | Self::CanonicalEntity | Self::Consumer => true,
            Self::OriginTable | Self::Unclassified => false,
        }
    }

    pub fn is_origin(self) -> bool {
        matches!(self, Self::OriginSystem | Self::OriginTable)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Hierarchy,
    Dataflow,
}

impl EdgeKind {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "hierarchy" | "contains" | "parent" => Some(Self::Hierarchy),
            "dataflow" | "data-flow" | "data_flow" | "mapping" | "flow" => Some(Self::Dataflow),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub source_field: String,
    pub target_field: String,
    #[serde(default)]
    pub confidence: f32,
}

/// Node as reported by the data service, type still a raw string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNode {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub owner_system_id: Option<String>,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl RawNode {
    pub fn kind(&self) -> NodeKind {
        NodeKind::from_token(&self.node_type)
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEdge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub field_mappings: Vec<FieldMapping>,
    #[serde(default)]
    pub label: Option<String>,
}

impl RawEdge {
    pub fn edge_kind(&self) -> EdgeKind {
        self.kind
            .as_deref()
            .and_then(EdgeKind::from_token)
            .unwrap_or(EdgeKind::Dataflow)
    }

    pub fn effective_weight(&self) -> f32 {
        match self.weight {
            Some(w) if w.is_finite() => w.max(0.0),
            Some(_) => 0.0,
            None => 1.0,
        }
    }
}

/// Raw graph snapshot as delivered by the data collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(input: &str) -> Result<Self, LineageError> {
        serde_json::from_str(input).map_err(LineageError::Snapshot)
    }

    pub fn push_node(
        &mut self,
        id: &str,
        label: &str,
        node_type: &str,
        owner: Option<&str>,
        parent: Option<&str>,
    ) {
        self.nodes.push(RawNode {
            id: id.to_string(),
            label: Some(label.to_string()),
            node_type: node_type.to_string(),
            owner_system_id: owner.map(str::to_string),
            parent_id: parent.map(str::to_string),
        });
    }

    pub fn push_edge(&mut self, source: &str, target: &str, kind: &str, weight: Option<f32>) {
        self.edges.push(RawEdge {
            source: source.to_string(),
            target: target.to_string(),
            kind: Some(kind.to_string()),
            weight,
            field_mappings: Vec::new(),
            label: None,
        });
    }
}

/// Node of the filtered working set. Holds no reference into the snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    /// Canonical owning-system key (alias-normalized).
    pub owner_system: Option<String>,
    pub parent_id: Option<String>,
    /// Stable palette slot of the owning origin-system, assigned from the
    /// system's position in the unfiltered snapshot.
    pub palette_slot: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub weight: f32,
    pub field_mappings: Vec<FieldMapping>,
    pub label: Option<String>,
}

impl Edge {
    pub fn key(&self) -> String {
        edge_key(&self.source, &self.target)
    }
}

pub fn edge_key(source: &str, target: &str) -> String {
    format!("{source}-{target}")
}

/// Working node/edge subset derived from a snapshot and a selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl FilteredGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }
}
