use crate::layout::{EdgeTint, LayerAnomaly, LayoutOutcome, Rect};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Stable JSON projection of a layout pass.
#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub state: &'static str,
    pub container: [f32; 2],
    pub viewport: Rect,
    pub message: Option<String>,
    pub layer_counts: Vec<usize>,
    pub anomalies: Vec<LayerAnomaly>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub labels: Vec<LabelDump>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub kind: &'static str,
    pub layer: usize,
    pub rect: Rect,
    pub value: f32,
    pub fill: String,
    pub stroke: String,
    pub fill_opacity: f32,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub source: String,
    pub target: String,
    pub kind: crate::ir::EdgeKind,
    pub weight: f32,
    pub width: f32,
    pub path: String,
    pub tint: EdgeTint,
    pub color: String,
    pub opacity: f32,
}

#[derive(Debug, Serialize)]
pub struct LabelDump {
    pub node_id: String,
    pub text: String,
    pub rect: Rect,
    pub anchor: [f32; 2],
    pub border: String,
}

impl LayoutDump {
    pub fn from_outcome(outcome: &LayoutOutcome) -> Self {
        let layout = match outcome {
            LayoutOutcome::Empty(empty) => {
                return LayoutDump {
                    state: "empty",
                    container: [empty.container.width, empty.container.height],
                    viewport: empty.viewport,
                    message: Some(empty.message.clone()),
                    layer_counts: Vec::new(),
                    anomalies: Vec::new(),
                    nodes: Vec::new(),
                    edges: Vec::new(),
                    labels: Vec::new(),
                };
            }
            LayoutOutcome::Ready(layout) => layout,
        };

        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                kind: node.kind.as_str(),
                layer: node.layer,
                rect: node.rect,
                value: node.value,
                fill: node.fill.clone(),
                stroke: node.stroke.clone(),
                fill_opacity: node.fill_opacity,
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                source: edge.source.clone(),
                target: edge.target.clone(),
                kind: edge.kind,
                weight: edge.weight,
                width: edge.width,
                path: edge.path.clone(),
                tint: edge.tint,
                color: edge.color.clone(),
                opacity: edge.opacity,
            })
            .collect();

        let labels = layout
            .labels
            .iter()
            .map(|label| LabelDump {
                node_id: label.node_id.clone(),
                text: label.text.clone(),
                rect: label.rect,
                anchor: [label.anchor.0, label.anchor.1],
                border: label.border.clone(),
            })
            .collect();

        LayoutDump {
            state: "ready",
            container: [layout.container.width, layout.container.height],
            viewport: layout.viewport,
            message: None,
            layer_counts: layout.report.counts.to_vec(),
            anomalies: layout.report.anomalies.clone(),
            nodes,
            edges,
            labels,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

pub fn write_layout_dump(path: &Path, outcome: &LayoutOutcome) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_outcome(outcome);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
