use serde::{Deserialize, Serialize};

use crate::ir::{EdgeKind, FieldMapping, NodeKind};

use super::layers::LayerReport;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// Negative and non-finite dimensions collapse to zero.
    pub fn new(width: f32, height: f32) -> Self {
        let clean = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            width: clean(width),
            height: clean(height),
        }
    }
}

/// Axis-aligned rectangle, `(x0, y0)` top-left and `(x1, y1)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn center_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    pub fn contains(&self, other: &Rect) -> bool {
        self.x0 <= other.x0 && self.y0 <= other.y0 && self.x1 >= other.x1 && self.y1 >= other.y1
    }

    pub fn overlaps_vertically(&self, other: &Rect) -> bool {
        self.y0 < other.y1 && other.y0 < self.y1
    }

    pub fn translate_y(&mut self, dy: f32) {
        self.y0 += dy;
        self.y1 += dy;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub layer: usize,
    pub rect: Rect,
    /// Aggregated incident edge weight.
    pub value: f32,
    pub palette_slot: Option<usize>,
    pub fill: String,
    pub stroke: String,
    pub fill_opacity: f32,
}

/// Color family of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeTint {
    /// Structural containment, desaturated.
    Hierarchy,
    /// Hierarchy edge leaving an origin-system.
    TopLevel,
    /// Dataflow tinted by its owning origin-system's palette slot.
    System(usize),
    /// Dataflow ending at a consumer.
    Consumer,
    /// No identifiable origin.
    Neutral,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeLayout {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub weight: f32,
    pub width: f32,
    /// Start, control 1, control 2, end of the cubic curve.
    pub points: [(f32, f32); 4],
    pub path: String,
    pub tint: EdgeTint,
    pub color: String,
    pub opacity: f32,
    pub label: Option<String>,
    pub field_mappings: Vec<FieldMapping>,
}

impl EdgeLayout {
    pub fn key(&self) -> String {
        crate::ir::edge_key(&self.source, &self.target)
    }
}

/// Pill-shaped node label. Rebuilt on every pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub node_id: String,
    pub text: String,
    pub text_width: f32,
    pub rect: Rect,
    /// Right-edge vertical midpoint of the labeled node.
    pub anchor: (f32, f32),
    pub border: String,
}

/// One full layout pass, treated as immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub container: Size,
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub labels: Vec<LabelLayout>,
    pub viewport: Rect,
    pub report: LayerReport,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&EdgeLayout> {
        self.edges
            .iter()
            .find(|edge| edge.source == source && edge.target == target)
    }
}

/// Placeholder shown when the filtered graph has no nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct EmptyLayout {
    pub container: Size,
    pub viewport: Rect,
    pub message: String,
    pub text_x: f32,
    pub text_y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutOutcome {
    Ready(Layout),
    Empty(EmptyLayout),
}

impl LayoutOutcome {
    pub fn viewport(&self) -> Rect {
        match self {
            Self::Ready(layout) => layout.viewport,
            Self::Empty(empty) => empty.viewport,
        }
    }

    pub fn as_ready(&self) -> Option<&Layout> {
        match self {
            Self::Ready(layout) => Some(layout),
            Self::Empty(_) => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }
}
