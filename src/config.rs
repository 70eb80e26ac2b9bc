use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LineageError;
use crate::layout::LAYER_COUNT;
use crate::theme::Theme;

/// How a column is arranged after generic stacking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRule {
    /// Keep the weight-derived top-aligned stack.
    Stack,
    /// With more than one node, distribute nodes evenly over the full span.
    Spread,
    /// Center the column as a block with fixed spacing.
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMetricsMode {
    /// System font glyph advances, falling back to fixed width.
    Font,
    /// Fixed advance per character.
    Fixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeOpacityConfig {
    pub structural: f32,
    pub flow: f32,
    pub origin: f32,
    pub highlighted: f32,
    pub dimmed: f32,
}

impl Default for EdgeOpacityConfig {
    fn default() -> Self {
        Self {
            structural: 0.22,
            flow: 0.35,
            origin: 0.5,
            highlighted: 0.9,
            dimmed: 0.08,
        }
    }
}

/// Extra space around the content bounds. Bottom is kept small so compact
/// renderings stay tight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewportPadding {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for ViewportPadding {
    fn default() -> Self {
        Self {
            top: 16.0,
            right: 16.0,
            bottom: 6.0,
            left: 16.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_padding: f32,
    pub min_node_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub min_column_padding: f32,
    /// Horizontal room kept right of the last column for its labels.
    pub label_reserve: f32,
    pub column_rules: [ColumnRule; LAYER_COUNT],
    pub consumer_spacing: f32,
    pub label_font_size: f32,
    pub label_padding_x: f32,
    pub label_height: f32,
    pub label_offset: f32,
    pub label_min_gap: f32,
    pub edge_width_scale: f32,
    pub edge_min_width: f32,
    pub edge_max_width: f32,
    pub edge_opacity: EdgeOpacityConfig,
    pub viewport_padding: ViewportPadding,
    pub pulse_duration_ms: u64,
    pub text_metrics: TextMetricsMode,
    pub fixed_advance_ratio: f32,
    pub empty_message: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 14.0,
            node_padding: 10.0,
            min_node_height: 6.0,
            margin_top: 24.0,
            margin_bottom: 24.0,
            min_column_padding: 60.0,
            label_reserve: 160.0,
            column_rules: [
                ColumnRule::Stack,
                ColumnRule::Stack,
                ColumnRule::Spread,
                ColumnRule::Center,
            ],
            consumer_spacing: 24.0,
            label_font_size: 12.0,
            label_padding_x: 8.0,
            label_height: 22.0,
            label_offset: 8.0,
            label_min_gap: 4.0,
            edge_width_scale: 2.0,
            edge_min_width: 1.0,
            edge_max_width: 18.0,
            edge_opacity: EdgeOpacityConfig::default(),
            viewport_padding: ViewportPadding::default(),
            pulse_duration_ms: 2000,
            text_metrics: TextMetricsMode::Font,
            fixed_advance_ratio: 0.6,
            empty_message: "No lineage data for the current selection".to_string(),
        }
    }
}

impl LayoutConfig {
    /// Rejects values that would make geometry undefined: non-finite or
    /// negative lengths, opacities outside `0..=1`, an inverted edge width
    /// range.
    pub fn validate(&self) -> Result<(), String> {
        let lengths = [
            ("nodeWidth", self.node_width),
            ("nodePadding", self.node_padding),
            ("minNodeHeight", self.min_node_height),
            ("marginTop", self.margin_top),
            ("marginBottom", self.margin_bottom),
            ("minColumnPadding", self.min_column_padding),
            ("labelReserve", self.label_reserve),
            ("consumerSpacing", self.consumer_spacing),
            ("labelFontSize", self.label_font_size),
            ("labelPaddingX", self.label_padding_x),
            ("labelHeight", self.label_height),
            ("labelOffset", self.label_offset),
            ("labelMinGap", self.label_min_gap),
            ("edgeWidthScale", self.edge_width_scale),
            ("edgeMinWidth", self.edge_min_width),
            ("edgeMaxWidth", self.edge_max_width),
            ("fixedAdvanceRatio", self.fixed_advance_ratio),
            ("viewportPadding.top", self.viewport_padding.top),
            ("viewportPadding.right", self.viewport_padding.right),
            ("viewportPadding.bottom", self.viewport_padding.bottom),
            ("viewportPadding.left", self.viewport_padding.left),
        ];
        for (name, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("layout.{name} must be a finite non-negative number, got {value}"));
            }
        }
        if self.edge_min_width > self.edge_max_width {
            return Err(format!(
                "layout.edgeMinWidth ({}) exceeds layout.edgeMaxWidth ({})",
                self.edge_min_width, self.edge_max_width
            ));
        }
        let opacity = &self.edge_opacity;
        let opacities = [
            ("structural", opacity.structural),
            ("flow", opacity.flow),
            ("origin", opacity.origin),
            ("highlighted", opacity.highlighted),
            ("dimmed", opacity.dimmed),
        ];
        for (name, value) in opacities {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("layout.edgeOpacity.{name} must be within 0..=1, got {value}"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterConfig {
    /// Extra `alias -> canonical system` spellings, merged over the built-ins.
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub filter: FilterConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    text_color: Option<String>,
    system_palette: Option<Vec<String>>,
    canonical_fill: Option<String>,
    consumer_fill: Option<String>,
    hierarchy_tint: Option<String>,
    top_level_tint: Option<String>,
    consumer_tint: Option<String>,
    neutral_tint: Option<String>,
    label_background: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfig>,
    filter: Option<FilterConfig>,
    render: Option<RenderConfig>,
}

/// Loads a JSON or JSON5 config file over the defaults. `None` yields the
/// defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, LineageError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents).map_err(|message| LineageError::Config {
        path: path.to_path_buf(),
        message,
    })
}

pub fn parse_config(contents: &str) -> Result<Config, String> {
    let parsed: ConfigFile = json5::from_str(contents).map_err(|err| err.to_string())?;
    let mut config = Config::default();

    if let Some(name) = parsed.theme.as_deref() {
        match Theme::by_name(name) {
            Some(theme) => config.theme = theme,
            None => tracing::warn!(theme = name, "unknown theme name, keeping default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        let theme = &mut config.theme;
        if let Some(v) = vars.font_family {
            theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            theme.font_size = v;
        }
        if let Some(v) = vars.background {
            theme.background = v;
        }
        if let Some(v) = vars.text_color {
            theme.text_color = v;
        }
        if let Some(v) = vars.system_palette.filter(|palette| !palette.is_empty()) {
            theme.system_palette = v;
        }
        if let Some(v) = vars.canonical_fill {
            theme.canonical_fill = v;
        }
        if let Some(v) = vars.consumer_fill {
            theme.consumer_fill = v;
        }
        if let Some(v) = vars.hierarchy_tint {
            theme.hierarchy_tint = v;
        }
        if let Some(v) = vars.top_level_tint {
            theme.top_level_tint = v;
        }
        if let Some(v) = vars.consumer_tint {
            theme.consumer_tint = v;
        }
        if let Some(v) = vars.neutral_tint {
            theme.neutral_tint = v;
        }
        if let Some(v) = vars.label_background {
            theme.label_background = v;
        }
    }

    if let Some(layout) = parsed.layout {
        layout.validate()?;
        config.layout = layout;
    }
    if let Some(filter) = parsed.filter {
        config.filter = filter;
    }
    if let Some(render) = parsed.render {
        config.render = render;
    }
    Ok(config)
}
