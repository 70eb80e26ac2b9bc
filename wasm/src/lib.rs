use lineage_flow_renderer::config::{Config, TextMetricsMode};
use lineage_flow_renderer::filter::Selection;
use lineage_flow_renderer::interaction::InteractionView;
use lineage_flow_renderer::layout::Size;
use lineage_flow_renderer::theme::Theme;
use lineage_flow_renderer::{RenderOptions, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LineageRenderOptions {
    width: Option<f32>,
    height: Option<f32>,
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    #[serde(default)]
    systems: Vec<String>,
    #[serde(default)]
    consumers: Vec<String>,
    hover: Option<String>,
}

fn build_render_options(options: LineageRenderOptions) -> RenderOptions {
    let mut config = Config::default();
    // No system fonts in the browser sandbox.
    config.layout.text_metrics = TextMetricsMode::Fixed;

    if let Some(theme) = options.theme.as_deref().and_then(Theme::by_name) {
        config.theme = theme;
    }
    if let Some(font_family) = options.font_family {
        config.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        config.theme.font_size = font_size;
    }

    let size = Size::new(
        options.width.unwrap_or(config.render.width),
        options.height.unwrap_or(config.render.height),
    );
    let view = match options.hover.as_deref() {
        Some(node_id) => InteractionView::hovering(node_id),
        None => InteractionView::none(),
    };

    RenderOptions::from_config(config)
        .with_size(size)
        .with_selection(
            Selection::all()
                .with_systems(options.systems)
                .with_consumers(options.consumers),
        )
        .with_view(view)
}

#[wasm_bindgen]
pub fn render_lineage_svg(
    snapshot_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<LineageRenderOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        LineageRenderOptions::default()
    };

    let render_options = build_render_options(options);
    render_with_options(snapshot_json, render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}

#[cfg(test)]
mod tests {
    use lineage_flow_renderer::render_with_options;

    use crate::{LineageRenderOptions, build_render_options};

    const SNAPSHOT: &str = r#"{
        "nodes": [
            {"id": "hs", "label": "HubSpot", "type": "origin-system"},
            {"id": "hs.deals", "label": "deals", "type": "origin-table", "ownerSystemId": "hs"},
            {"id": "deal", "label": "Deal (unified)", "type": "canonical-entity"},
            {"id": "forecast", "label": "Forecast Agent", "type": "consumer"}
        ],
        "edges": [
            {"source": "hs", "target": "hs.deals", "kind": "hierarchy"},
            {"source": "hs.deals", "target": "deal", "kind": "dataflow", "weight": 3},
            {"source": "deal", "target": "forecast", "kind": "dataflow"}
        ]
    }"#;

    #[test]
    fn renders_snapshot_with_default_options() {
        let svg = render_with_options(
            SNAPSHOT,
            build_render_options(LineageRenderOptions::default()),
        )
        .expect("snapshot should render");

        assert!(svg.contains("<svg"));
        assert!(svg.contains(">HubSpot</text>"));
        assert!(svg.contains(">Deal</text>"));
    }

    #[test]
    fn options_parse_from_host_json() {
        let options: LineageRenderOptions = serde_json::from_str(
            r#"{"width": 640, "height": 360, "theme": "dark", "systems": ["HubSpot CRM"], "hover": "deal"}"#,
        )
        .unwrap();
        let render_options = build_render_options(options);
        assert_eq!(render_options.size.width, 640.0);
        assert_eq!(render_options.config.theme, lineage_flow_renderer::theme::Theme::dark());
        assert_eq!(render_options.view.hovered.as_deref(), Some("deal"));
    }
}
