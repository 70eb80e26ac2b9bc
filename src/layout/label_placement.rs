// Node label placement and collision avoidance. Pure geometry, no SVG.

use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::text_metrics::TextMeasure;
use crate::theme::Theme;

use super::text::{label_text, measure_label};
use super::{LabelLayout, NodeLayout, Rect};

/// Builds one pill label per labeled node, right of the node and vertically
/// centered on it, then pushes overlapping labels in each column apart.
pub(crate) fn place_labels(
    nodes: &[NodeLayout],
    theme: &Theme,
    config: &LayoutConfig,
    measurer: &dyn TextMeasure,
) -> Vec<LabelLayout> {
    let mut labels: Vec<LabelLayout> = nodes
        .iter()
        .filter(|node| node.kind.is_labeled())
        .map(|node| {
            let text = label_text(node.kind, &node.label);
            let text_width = measure_label(&text, config, measurer);
            let width = text_width + 2.0 * config.label_padding_x;
            let anchor = (node.rect.x1, node.rect.center_y());
            let x0 = anchor.0 + config.label_offset;
            let y0 = anchor.1 - config.label_height / 2.0;
            LabelLayout {
                node_id: node.id.clone(),
                text,
                text_width,
                rect: Rect::new(x0, y0, x0 + width, y0 + config.label_height),
                anchor,
                border: theme.label_border(node.kind, node.palette_slot),
            }
        })
        .collect();
    resolve_label_collisions(&mut labels, config.label_min_gap);
    labels
}

/// Groups labels by rounded left edge and sweeps each column top to bottom,
/// moving any label that starts above `previous.bottom + min_gap` down by
/// the overlap.
pub(crate) fn resolve_label_collisions(labels: &mut [LabelLayout], min_gap: f32) {
    let mut columns: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (idx, label) in labels.iter().enumerate() {
        columns
            .entry(label.rect.x0.round() as i64)
            .or_default()
            .push(idx);
    }
    for members in columns.values_mut() {
        members.sort_by(|&a, &b| {
            labels[a]
                .rect
                .y0
                .total_cmp(&labels[b].rect.y0)
                .then(a.cmp(&b))
        });
        let mut previous_bottom: Option<f32> = None;
        for &idx in members.iter() {
            let rect = &mut labels[idx].rect;
            if let Some(bottom) = previous_bottom {
                let floor = bottom + min_gap;
                if rect.y0 < floor {
                    rect.translate_y(floor - rect.y0);
                }
            }
            previous_bottom = Some(rect.y1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeKind;
    use crate::text_metrics::FixedWidthMetrics;

    fn node(id: &str, kind: NodeKind, x0: f32, y0: f32, height: f32) -> NodeLayout {
        NodeLayout {
            id: id.to_string(),
            label: format!("{id} (unified)"),
            kind,
            layer: crate::layout::layer_of(kind),
            rect: Rect::new(x0, y0, x0 + 10.0, y0 + height),
            value: 1.0,
            palette_slot: Some(0),
            fill: String::new(),
            stroke: String::new(),
            fill_opacity: 1.0,
        }
    }

    #[test]
    fn tables_are_not_labeled() {
        let nodes = vec![
            node("sys", NodeKind::OriginSystem, 0.0, 0.0, 40.0),
            node("tbl", NodeKind::OriginTable, 100.0, 0.0, 40.0),
            node("ent", NodeKind::CanonicalEntity, 200.0, 0.0, 40.0),
        ];
        let labels = place_labels(
            &nodes,
            &Theme::light(),
            &LayoutConfig::default(),
            &FixedWidthMetrics::default(),
        );
        let ids: Vec<&str> = labels.iter().map(|l| l.node_id.as_str()).collect();
        assert_eq!(ids, vec!["sys", "ent"]);
        assert_eq!(labels[1].text, "ent");
        assert_eq!(labels[0].text, "sys (unified)");
    }

    #[test]
    fn label_sits_right_of_node_and_centered() {
        let config = LayoutConfig::default();
        let nodes = vec![node("sys", NodeKind::OriginSystem, 0.0, 100.0, 40.0)];
        let metrics = FixedWidthMetrics::default();
        let labels = place_labels(&nodes, &Theme::light(), &config, &metrics);
        let label = &labels[0];
        assert_eq!(label.anchor, (10.0, 120.0));
        assert_eq!(label.rect.x0, 10.0 + config.label_offset);
        assert_eq!(label.rect.center_y(), 120.0);
        assert_eq!(label.rect.height(), config.label_height);
        assert_eq!(
            label.rect.width(),
            metrics.width("sys (unified)", config.label_font_size) + 2.0 * config.label_padding_x
        );
    }

    #[test]
    fn overlapping_labels_in_a_column_are_pushed_down() {
        let config = LayoutConfig::default();
        let nodes = vec![
            node("a", NodeKind::Consumer, 0.0, 0.0, 6.0),
            node("b", NodeKind::Consumer, 0.0, 8.0, 6.0),
            node("c", NodeKind::Consumer, 0.0, 16.0, 6.0),
        ];
        let labels = place_labels(
            &nodes,
            &Theme::light(),
            &config,
            &FixedWidthMetrics::default(),
        );
        for pair in labels.windows(2) {
            assert!(pair[1].rect.y0 >= pair[0].rect.y1 + config.label_min_gap - 1e-4);
        }
    }

    #[test]
    fn different_columns_do_not_interact() {
        let config = LayoutConfig::default();
        let nodes = vec![
            node("a", NodeKind::OriginSystem, 0.0, 0.0, 6.0),
            node("b", NodeKind::CanonicalEntity, 300.0, 0.0, 6.0),
        ];
        let labels = place_labels(
            &nodes,
            &Theme::light(),
            &config,
            &FixedWidthMetrics::default(),
        );
        assert_eq!(labels[0].rect.y0, labels[1].rect.y0);
    }
}
