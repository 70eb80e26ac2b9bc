use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::ir::{Edge, EdgeKind, FilteredGraph, NodeKind};
use crate::theme::Theme;

use super::{EdgeLayout, EdgeTint, NodeLayout};

/// Routes every edge whose endpoints were laid out. Edges naming a missing
/// node are dropped without complaint.
pub(crate) fn route_edges(
    graph: &FilteredGraph,
    nodes: &[NodeLayout],
    theme: &Theme,
    config: &LayoutConfig,
) -> Vec<EdgeLayout> {
    let by_id: HashMap<&str, &NodeLayout> =
        nodes.iter().map(|node| (node.id.as_str(), node)).collect();
    let mut edges = Vec::with_capacity(graph.edges.len());
    for edge in &graph.edges {
        let (Some(source), Some(target)) = (
            by_id.get(edge.source.as_str()),
            by_id.get(edge.target.as_str()),
        ) else {
            tracing::trace!(source = %edge.source, target = %edge.target, "edge endpoint not laid out");
            continue;
        };
        edges.push(route_edge(edge, source, target, theme, config));
    }
    edges
}

fn route_edge(
    edge: &Edge,
    source: &NodeLayout,
    target: &NodeLayout,
    theme: &Theme,
    config: &LayoutConfig,
) -> EdgeLayout {
    let start = (source.rect.x1, source.rect.center_y());
    let end = (target.rect.x0, target.rect.center_y());
    let points = horizontal_curve(start, end);
    let tint = edge_tint(edge.kind, source, target);
    EdgeLayout {
        source: edge.source.clone(),
        target: edge.target.clone(),
        kind: edge.kind,
        weight: edge.weight,
        width: edge_width(edge.weight, config),
        points,
        path: curve_path(&points),
        tint,
        color: theme.edge_color(tint),
        opacity: base_opacity(edge.kind, source.kind, config),
        label: edge.label.clone(),
        field_mappings: edge.field_mappings.clone(),
    }
}

/// Cubic curve leaving and entering horizontally, controls at mid-x.
fn horizontal_curve(start: (f32, f32), end: (f32, f32)) -> [(f32, f32); 4] {
    let mid_x = (start.0 + end.0) / 2.0;
    [start, (mid_x, start.1), (mid_x, end.1), end]
}

fn curve_path(points: &[(f32, f32); 4]) -> String {
    let [p0, p1, p2, p3] = points;
    format!(
        "M{:.2},{:.2}C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
        p0.0, p0.1, p1.0, p1.1, p2.0, p2.1, p3.0, p3.1
    )
}

/// Weight times scale, bounded by the configured range. Never panics: a
/// non-finite bound or width collapses onto the other bound.
pub(crate) fn edge_width(weight: f32, config: &LayoutConfig) -> f32 {
    let min = if config.edge_min_width.is_finite() {
        config.edge_min_width.max(0.0)
    } else {
        0.0
    };
    let max = if config.edge_max_width.is_finite() {
        config.edge_max_width.max(min)
    } else {
        min
    };
    let width = weight * config.edge_width_scale;
    if !width.is_finite() {
        return min;
    }
    width.max(min).min(max)
}

pub(crate) fn edge_tint(kind: EdgeKind, source: &NodeLayout, target: &NodeLayout) -> EdgeTint {
    match kind {
        EdgeKind::Hierarchy => match source.kind {
            NodeKind::OriginSystem => EdgeTint::TopLevel,
            _ => EdgeTint::Hierarchy,
        },
        EdgeKind::Dataflow => {
            if target.kind == NodeKind::Consumer {
                return EdgeTint::Consumer;
            }
            match (source.kind, source.palette_slot) {
                (NodeKind::OriginSystem | NodeKind::OriginTable, Some(slot)) => {
                    EdgeTint::System(slot)
                }
                _ => EdgeTint::Neutral,
            }
        }
    }
}

fn base_opacity(kind: EdgeKind, source: NodeKind, config: &LayoutConfig) -> f32 {
    let opacity = &config.edge_opacity;
    if source.is_origin() {
        return opacity.origin;
    }
    match kind {
        EdgeKind::Hierarchy => opacity.structural,
        EdgeKind::Dataflow => opacity.flow,
    }
}
