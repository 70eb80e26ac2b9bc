//! Layered layout of the filtered lineage graph.
//!
//! Every stimulus (new snapshot, selection change, resize) runs the whole
//! pipeline from scratch: stack nodes per layer, refine sparse columns,
//! route edges from the final rectangles, place labels, bound the result.
//! There is no incremental path. Graphs are tens of nodes, so a full pass
//! always fits in a frame and the output depends only on its inputs.

mod bounds;
mod empty;
mod geometry;
pub(crate) mod label_placement;
pub(crate) mod layers;
mod refine;
mod routing;
mod text;
pub(crate) mod types;

pub use layers::{LAYER_COUNT, LayerAnomaly, LayerReport, layer_of};
pub use types::*;

use bounds::compute_viewport;
use empty::compute_empty_layout;
use geometry::{Frame, compute_node_geometry};
use label_placement::place_labels;
use refine::refine_columns;
use routing::route_edges;

use crate::config::LayoutConfig;
use crate::ir::FilteredGraph;
use crate::text_metrics::TextMeasure;
use crate::theme::Theme;

pub fn compute_layout(
    graph: &FilteredGraph,
    container: Size,
    theme: &Theme,
    config: &LayoutConfig,
    measurer: &dyn TextMeasure,
) -> LayoutOutcome {
    if graph.is_empty() {
        tracing::debug!("no nodes after filtering, using empty placeholder");
        return LayoutOutcome::Empty(compute_empty_layout(container, config));
    }

    let report = LayerReport::from_graph(graph);
    report.log();

    let frame = Frame::new(container, config);
    let mut nodes = compute_node_geometry(graph, &frame, config, theme);
    refine_columns(&mut nodes, &frame, config);
    let edges = route_edges(graph, &nodes, theme, config);
    let labels = place_labels(&nodes, theme, config, measurer);

    let Some(viewport) = compute_viewport(&nodes, &labels, &config.viewport_padding) else {
        return LayoutOutcome::Empty(compute_empty_layout(container, config));
    };

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        labels = labels.len(),
        width = viewport.width(),
        height = viewport.height(),
        "layout pass complete"
    );

    LayoutOutcome::Ready(Layout {
        container,
        nodes,
        edges,
        labels,
        viewport,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasTable;
    use crate::filter::{Selection, filter_graph};
    use crate::ir::{NodeKind, Snapshot};
    use crate::text_metrics::FixedWidthMetrics;

    fn snapshot() -> Snapshot {
        let mut s = Snapshot::new();
        s.push_node("crm", "CRM", "origin-system", None, None);
        s.push_node("crm.accounts", "accounts", "origin-table", Some("crm"), Some("crm"));
        s.push_node("crm.contacts", "contacts", "origin-table", Some("crm"), Some("crm"));
        s.push_node("customer", "Customer (unified)", "canonical-entity", None, None);
        s.push_node("contact", "Contact (unified)", "canonical-entity", None, None);
        s.push_node("agent", "Churn Agent", "consumer", None, None);
        s.push_edge("crm", "crm.accounts", "hierarchy", None);
        s.push_edge("crm", "crm.contacts", "hierarchy", None);
        s.push_edge("crm.accounts", "customer", "dataflow", Some(5.0));
        s.push_edge("crm.contacts", "contact", "dataflow", Some(2.0));
        s.push_edge("customer", "agent", "dataflow", None);
        s.push_edge("contact", "agent", "dataflow", None);
        s
    }

    fn layout_for(container: Size) -> LayoutOutcome {
        let graph = filter_graph(&snapshot(), &Selection::all(), &AliasTable::default());
        compute_layout(
            &graph,
            container,
            &Theme::light(),
            &LayoutConfig::default(),
            &FixedWidthMetrics::default(),
        )
    }

    #[test]
    fn empty_graph_yields_placeholder() {
        let outcome = compute_layout(
            &FilteredGraph::default(),
            Size::new(400.0, 300.0),
            &Theme::light(),
            &LayoutConfig::default(),
            &FixedWidthMetrics::default(),
        );
        assert!(outcome.is_empty());
    }

    #[test]
    fn same_layer_nodes_do_not_overlap() {
        let outcome = layout_for(Size::new(900.0, 420.0));
        let layout = outcome.as_ready().unwrap();
        for a in &layout.nodes {
            for b in &layout.nodes {
                if a.id != b.id && a.layer == b.layer {
                    assert!(!a.rect.overlaps_vertically(&b.rect), "{} / {}", a.id, b.id);
                }
            }
        }
    }

    #[test]
    fn viewport_contains_nodes_and_labels() {
        let outcome = layout_for(Size::new(640.0, 300.0));
        let layout = outcome.as_ready().unwrap();
        for node in &layout.nodes {
            assert!(layout.viewport.contains(&node.rect));
        }
        for label in &layout.labels {
            assert!(layout.viewport.contains(&label.rect));
        }
    }

    #[test]
    fn edges_start_and_end_on_refined_rectangles() {
        let outcome = layout_for(Size::new(900.0, 420.0));
        let layout = outcome.as_ready().unwrap();
        for edge in &layout.edges {
            let source = layout.node(&edge.source).unwrap();
            let target = layout.node(&edge.target).unwrap();
            assert_eq!(edge.points[0], (source.rect.x1, source.rect.center_y()));
            assert_eq!(edge.points[3], (target.rect.x0, target.rect.center_y()));
        }
    }

    #[test]
    fn repeated_passes_are_identical() {
        let a = layout_for(Size::new(900.0, 420.0));
        let b = layout_for(Size::new(900.0, 420.0));
        assert_eq!(a, b);
    }

    #[test]
    fn layers_map_to_columns() {
        let outcome = layout_for(Size::new(900.0, 420.0));
        let layout = outcome.as_ready().unwrap();
        let x_of = |kind: NodeKind| {
            layout
                .nodes
                .iter()
                .find(|node| node.kind == kind)
                .map(|node| node.rect.x0)
                .unwrap()
        };
        assert!(x_of(NodeKind::OriginSystem) < x_of(NodeKind::OriginTable));
        assert!(x_of(NodeKind::OriginTable) < x_of(NodeKind::CanonicalEntity));
        assert!(x_of(NodeKind::CanonicalEntity) < x_of(NodeKind::Consumer));
        assert_eq!(layout.report.populated_layers(), 4);
    }
}
