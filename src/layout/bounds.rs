use crate::config::ViewportPadding;

use super::{LabelLayout, NodeLayout, Rect};

/// Smallest rectangle holding every node and every full label, grown by the
/// asymmetric viewport padding. Labels routinely extend past the last
/// column, so node extents alone are not enough.
pub(crate) fn compute_viewport(
    nodes: &[NodeLayout],
    labels: &[LabelLayout],
    padding: &ViewportPadding,
) -> Option<Rect> {
    let content = nodes
        .iter()
        .map(|node| node.rect)
        .chain(labels.iter().map(|label| label.rect))
        .reduce(|acc, rect| acc.union(&rect))?;
    Some(Rect::new(
        content.x0 - padding.left,
        content.y0 - padding.top,
        content.x1 + padding.right,
        content.y1 + padding.bottom,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::NodeKind;

    fn node(rect: Rect) -> NodeLayout {
        NodeLayout {
            id: "n".into(),
            label: "n".into(),
            kind: NodeKind::Consumer,
            layer: 3,
            rect,
            value: 1.0,
            palette_slot: None,
            fill: String::new(),
            stroke: String::new(),
            fill_opacity: 1.0,
        }
    }

    fn label(rect: Rect) -> LabelLayout {
        LabelLayout {
            node_id: "n".into(),
            text: "n".into(),
            text_width: rect.width(),
            rect,
            anchor: (rect.x0, rect.center_y()),
            border: String::new(),
        }
    }

    #[test]
    fn labels_extend_the_viewport() {
        let padding = ViewportPadding::default();
        let nodes = vec![node(Rect::new(0.0, 0.0, 10.0, 50.0))];
        let labels = vec![label(Rect::new(18.0, 14.0, 140.0, 36.0))];
        let viewport = compute_viewport(&nodes, &labels, &padding).unwrap();
        assert_eq!(viewport.x1, 140.0 + padding.right);
        assert_eq!(viewport.y1, 50.0 + padding.bottom);
        assert_eq!(viewport.x0, -padding.left);
        assert_eq!(viewport.y0, -padding.top);
    }

    #[test]
    fn bottom_padding_is_tighter() {
        let padding = ViewportPadding::default();
        assert!(padding.bottom < padding.top);
    }

    #[test]
    fn nothing_to_bound() {
        assert!(compute_viewport(&[], &[], &ViewportPadding::default()).is_none());
    }
}
