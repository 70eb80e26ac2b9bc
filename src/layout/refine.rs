use crate::config::{ColumnRule, LayoutConfig};

use super::NodeLayout;
use super::geometry::Frame;
use super::layers::LAYER_COUNT;

/// Re-spaces sparse columns after generic stacking, per the configured
/// column rules. Runs before routing, so edges always see refined rectangles.
pub(crate) fn refine_columns(nodes: &mut [NodeLayout], frame: &Frame, config: &LayoutConfig) {
    let mut moved = 0usize;
    for layer in 0..LAYER_COUNT {
        let members: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, node)| (node.layer == layer).then_some(idx))
            .collect();
        if members.is_empty() {
            continue;
        }
        let targets = match config.column_rules[layer] {
            ColumnRule::Stack => continue,
            ColumnRule::Spread => spread_targets(nodes, &members, frame, config),
            ColumnRule::Center => center_targets(nodes, &members, frame, config),
        };
        let Some(targets) = targets else {
            continue;
        };
        for (&idx, y0) in members.iter().zip(targets) {
            let node = &mut nodes[idx];
            let dy = y0 - node.rect.y0;
            if dy.abs() > f32::EPSILON {
                node.rect.translate_y(dy);
                moved += 1;
            }
        }
    }
    if moved > 0 {
        tracing::debug!(moved, "column refinement moved nodes");
    }
}

/// Even gaps across the full span. Leaves the stack alone when there is a
/// single node or the span cannot fit the nodes with at least the regular
/// padding between them.
fn spread_targets(
    nodes: &[NodeLayout],
    members: &[usize],
    frame: &Frame,
    config: &LayoutConfig,
) -> Option<Vec<f32>> {
    if members.len() < 2 {
        return None;
    }
    let total: f32 = members.iter().map(|&idx| nodes[idx].rect.height()).sum();
    let gap = (frame.span - total) / (members.len() - 1) as f32;
    if gap < config.node_padding {
        return None;
    }
    let mut y = frame.top;
    let mut targets = Vec::with_capacity(members.len());
    for &idx in members {
        targets.push(y);
        y += nodes[idx].rect.height() + gap;
    }
    Some(targets)
}

/// The column as one block with `consumer_spacing` gaps, centered in the
/// span. A block taller than the span starts at the top.
fn center_targets(
    nodes: &[NodeLayout],
    members: &[usize],
    frame: &Frame,
    config: &LayoutConfig,
) -> Option<Vec<f32>> {
    let total: f32 = members.iter().map(|&idx| nodes[idx].rect.height()).sum();
    let block = total + (members.len() - 1) as f32 * config.consumer_spacing;
    let mut y = frame.top + ((frame.span - block) / 2.0).max(0.0);
    let mut targets = Vec::with_capacity(members.len());
    for &idx in members {
        targets.push(y);
        y += nodes[idx].rect.height() + config.consumer_spacing;
    }
    Some(targets)
}
