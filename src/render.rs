use crate::config::LayoutConfig;
use crate::interaction::{Emphasis, InteractionView};
use crate::layout::{EdgeLayout, EmptyLayout, Layout, LayoutOutcome, Rect};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Renders a layout outcome to SVG. Pure: the same inputs always produce
/// the same string.
pub fn render_svg(
    outcome: &LayoutOutcome,
    theme: &Theme,
    config: &LayoutConfig,
    view: &InteractionView,
) -> String {
    match outcome {
        LayoutOutcome::Ready(layout) => render_layout(layout, theme, config, view),
        LayoutOutcome::Empty(empty) => render_empty(empty, theme),
    }
}

fn svg_open(svg: &mut String, viewport: &Rect, theme: &Theme) {
    let width = viewport.width();
    let height = viewport.height();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.2}\" height=\"{height:.2}\" viewBox=\"{:.2} {:.2} {width:.2} {height:.2}\">",
        viewport.x0, viewport.y0,
    ));
    svg.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" fill=\"{}\"/>",
        viewport.x0, viewport.y0, theme.background
    ));
}

fn render_empty(empty: &EmptyLayout, theme: &Theme) -> String {
    let mut svg = String::new();
    svg_open(&mut svg, &empty.viewport, theme);
    svg.push_str(&format!(
        "<text class=\"empty-state\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        empty.text_x,
        empty.text_y,
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.muted_text_color,
        escape_xml(&empty.message)
    ));
    svg.push_str("</svg>");
    svg
}

fn render_layout(
    layout: &Layout,
    theme: &Theme,
    config: &LayoutConfig,
    view: &InteractionView,
) -> String {
    let mut svg = String::new();
    svg_open(&mut svg, &layout.viewport, theme);

    svg.push_str("<g class=\"edges\" fill=\"none\">");
    for edge in &layout.edges {
        let (opacity, width) = edge_paint(edge, view, config);
        let class = if view.is_pulsing(edge) {
            "edge pulse"
        } else {
            "edge"
        };
        svg.push_str(&format!(
            "<path class=\"{class}\" data-edge=\"{}\" d=\"{}\" stroke=\"{}\" stroke-width=\"{width:.2}\" stroke-opacity=\"{opacity:.2}\">",
            escape_xml(&edge.key()),
            edge.path,
            edge.color,
        ));
        if let Some(title) = edge_title(edge) {
            svg.push_str(&format!("<title>{}</title>", escape_xml(&title)));
        }
        svg.push_str("</path>");
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"nodes\">");
    for node in &layout.nodes {
        let (opacity, stroke_width) = match view.node_emphasis(&node.id, &layout.edges) {
            Emphasis::Normal => (1.0, 1.0),
            Emphasis::Highlighted => (1.0, 2.0),
            Emphasis::Dimmed => (0.3, 1.0),
        };
        svg.push_str(&format!(
            "<rect class=\"node {}\" data-node=\"{}\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"2\" ry=\"2\" fill=\"{}\" fill-opacity=\"{:.2}\" stroke=\"{}\" stroke-width=\"{stroke_width:.1}\" opacity=\"{opacity:.2}\"><title>{}</title></rect>",
            node.kind.as_str(),
            escape_xml(&node.id),
            node.rect.x0,
            node.rect.y0,
            node.rect.width(),
            node.rect.height(),
            node.fill,
            node.fill_opacity,
            node.stroke,
            escape_xml(&node.label)
        ));
    }
    svg.push_str("</g>");

    svg.push_str("<g class=\"labels\">");
    for label in &layout.labels {
        let rect = &label.rect;
        let radius = rect.height() / 2.0;
        svg.push_str(&format!(
            "<rect class=\"label\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{radius:.2}\" ry=\"{radius:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            rect.x0,
            rect.y0,
            rect.width(),
            rect.height(),
            theme.label_background,
            label.border
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
            rect.x0 + config.label_padding_x,
            rect.center_y(),
            escape_xml(&theme.font_family),
            config.label_font_size,
            theme.label_text_color,
            escape_xml(&label.text)
        ));
    }
    svg.push_str("</g>");

    svg.push_str("</svg>");
    svg
}

/// Stroke opacity and width after hover/pulse emphasis.
fn edge_paint(edge: &EdgeLayout, view: &InteractionView, config: &LayoutConfig) -> (f32, f32) {
    let opacity = &config.edge_opacity;
    match view.edge_emphasis(edge) {
        Emphasis::Normal => (edge.opacity, edge.width),
        Emphasis::Highlighted => (opacity.highlighted.max(edge.opacity), edge.width + 1.0),
        Emphasis::Dimmed => (opacity.dimmed.min(edge.opacity), edge.width),
    }
}

fn edge_title(edge: &EdgeLayout) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(label) = edge.label.as_deref() {
        parts.push(label.to_string());
    }
    if !edge.field_mappings.is_empty() {
        let count = edge.field_mappings.len();
        let mean = edge
            .field_mappings
            .iter()
            .map(|mapping| mapping.confidence)
            .sum::<f32>()
            / count as f32;
        parts.push(format!("{count} field mappings, mean confidence {mean:.2}"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" / "))
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = theme
        .font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "sans-serif".to_string());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
