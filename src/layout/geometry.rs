use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::ir::{FilteredGraph, NodeKind};
use crate::theme::Theme;

use super::layers::{LAYER_COUNT, layer_of};
use super::{NodeLayout, Rect, Size};

/// Drawable area derived from the container size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Frame {
    pub top: f32,
    pub span: f32,
    pub column_padding: f32,
}

impl Frame {
    pub fn new(container: Size, config: &LayoutConfig) -> Self {
        let top = config.margin_top;
        let span = (container.height - config.margin_top - config.margin_bottom).max(0.0);
        let columns = LAYER_COUNT as f32;
        let usable = container.width - config.label_reserve - columns * config.node_width;
        let column_padding = (usable / (columns - 1.0)).max(config.min_column_padding);
        Self {
            top,
            span,
            column_padding,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.span
    }

    pub fn column_x(&self, column: usize, config: &LayoutConfig) -> f32 {
        column as f32 * (config.node_width + self.column_padding)
    }
}

/// Stacks nodes per layer, top to bottom, height proportional to the sum of
/// incident edge weights.
///
/// One vertical scale is shared by all layers (the tightest layer decides),
/// so equal weights get equal heights across columns. Heights are floored
/// at `min_node_height`; a floored layer may run past the frame but never
/// overlaps itself.
pub(crate) fn compute_node_geometry(
    graph: &FilteredGraph,
    frame: &Frame,
    config: &LayoutConfig,
    theme: &Theme,
) -> Vec<NodeLayout> {
    let mut values: HashMap<&str, f32> = HashMap::new();
    for edge in &graph.edges {
        *values.entry(edge.source.as_str()).or_default() += edge.weight;
        *values.entry(edge.target.as_str()).or_default() += edge.weight;
    }
    let value_of = |id: &str| values.get(id).copied().unwrap_or(0.0);

    let mut layers: Vec<Vec<usize>> = vec![Vec::new(); LAYER_COUNT];
    for (idx, node) in graph.nodes.iter().enumerate() {
        layers[layer_of(node.kind)].push(idx);
    }

    // Tables line up behind their owning system, in system order.
    let system_rank: HashMap<&str, usize> = layers[0]
        .iter()
        .enumerate()
        .filter_map(|(rank, &idx)| {
            graph.nodes[idx]
                .owner_system
                .as_deref()
                .map(|key| (key, rank))
        })
        .collect();
    layers[1].sort_by_key(|&idx| {
        let node = &graph.nodes[idx];
        let rank = match node.kind {
            NodeKind::OriginTable => node
                .owner_system
                .as_deref()
                .and_then(|key| system_rank.get(key).copied())
                .unwrap_or(usize::MAX),
            _ => usize::MAX,
        };
        (rank, idx)
    });

    let mut scale = f32::INFINITY;
    for members in layers.iter().filter(|members| !members.is_empty()) {
        let total: f32 = members
            .iter()
            .map(|&idx| value_of(&graph.nodes[idx].id))
            .sum();
        if total <= 0.0 {
            continue;
        }
        let room = frame.span - (members.len() as f32 - 1.0) * config.node_padding;
        scale = scale.min(room / total);
    }
    let scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };

    let mut nodes = Vec::with_capacity(graph.nodes.len());
    for (layer, members) in layers.iter().enumerate() {
        let x0 = frame.column_x(layer, config);
        let mut y = frame.top;
        for &idx in members {
            let node = &graph.nodes[idx];
            let value = value_of(&node.id);
            let height = (value * scale).max(config.min_node_height);
            let (fill, stroke, fill_opacity) = theme.node_paint(node.kind, node.palette_slot);
            nodes.push(NodeLayout {
                id: node.id.clone(),
                label: node.label.clone(),
                kind: node.kind,
                layer,
                rect: Rect::new(x0, y, x0 + config.node_width, y + height),
                value,
                palette_slot: node.palette_slot,
                fill,
                stroke,
                fill_opacity,
            });
            y += height + config.node_padding;
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasTable;
    use crate::filter::{Selection, filter_graph};
    use crate::ir::Snapshot;

    fn graph() -> FilteredGraph {
        let mut s = Snapshot::new();
        s.push_node("b", "B", "origin-system", None, None);
        s.push_node("a", "A", "origin-system", None, None);
        s.push_node("a.t1", "t1", "origin-table", Some("a"), Some("a"));
        s.push_node("b.t1", "t1", "origin-table", Some("b"), Some("b"));
        s.push_node("e", "E", "canonical-entity", None, None);
        s.push_edge("a", "a.t1", "hierarchy", None);
        s.push_edge("b", "b.t1", "hierarchy", None);
        s.push_edge("a.t1", "e", "dataflow", Some(3.0));
        s.push_edge("b.t1", "e", "dataflow", Some(1.0));
        filter_graph(&s, &Selection::all(), &AliasTable::default())
    }

    #[test]
    fn columns_use_fixed_pitch() {
        let config = LayoutConfig::default();
        let frame = Frame::new(Size::new(1000.0, 500.0), &config);
        let nodes = compute_node_geometry(&graph(), &frame, &config, &Theme::light());
        for node in &nodes {
            let expected = node.layer as f32 * (config.node_width + frame.column_padding);
            assert_eq!(node.rect.x0, expected);
            assert_eq!(node.rect.width(), config.node_width);
        }
    }

    #[test]
    fn tables_follow_system_order() {
        let config = LayoutConfig::default();
        let frame = Frame::new(Size::new(1000.0, 500.0), &config);
        let nodes = compute_node_geometry(&graph(), &frame, &config, &Theme::light());
        let tables: Vec<&str> = nodes
            .iter()
            .filter(|n| n.layer == 1)
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(tables, vec!["b.t1", "a.t1"]);
    }

    #[test]
    fn height_tracks_incident_weight() {
        let config = LayoutConfig::default();
        let frame = Frame::new(Size::new(1000.0, 500.0), &config);
        let nodes = compute_node_geometry(&graph(), &frame, &config, &Theme::light());
        let by_id = |id: &str| nodes.iter().find(|n| n.id == id).unwrap();
        assert_eq!(by_id("a.t1").value, 4.0);
        assert_eq!(by_id("b.t1").value, 2.0);
        assert!(by_id("a.t1").rect.height() > by_id("b.t1").rect.height());
        assert!((by_id("a.t1").rect.height() - 2.0 * by_id("b.t1").rect.height()).abs() < 1e-3);
    }

    #[test]
    fn tiny_container_clamps_to_minimum_height() {
        let config = LayoutConfig::default();
        let frame = Frame::new(Size::new(100.0, 10.0), &config);
        let nodes = compute_node_geometry(&graph(), &frame, &config, &Theme::light());
        assert!(nodes.iter().all(|n| n.rect.height() >= config.min_node_height));
        assert!(frame.column_padding >= config.min_column_padding);
    }
}
