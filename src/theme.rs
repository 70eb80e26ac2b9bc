use serde::{Deserialize, Serialize};

use crate::ir::NodeKind;
use crate::layout::EdgeTint;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub text_color: String,
    pub muted_text_color: String,
    /// One color per origin-system, indexed by palette slot (wraps).
    pub system_palette: Vec<String>,
    pub table_fill_opacity: f32,
    pub canonical_fill: String,
    pub canonical_stroke: String,
    pub consumer_fill: String,
    pub consumer_stroke: String,
    pub unclassified_fill: String,
    pub hierarchy_tint: String,
    pub top_level_tint: String,
    pub consumer_tint: String,
    pub neutral_tint: String,
    pub label_background: String,
    pub label_text_color: String,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            background: "#FFFFFF".to_string(),
            text_color: "#1C2430".to_string(),
            muted_text_color: "#7A8AA6".to_string(),
            system_palette: [
                "#4E79A7", "#F28E2C", "#59A14F", "#E15759", "#76B7B2", "#EDC949", "#AF7AA1",
                "#FF9DA7", "#9C755F",
            ]
            .iter()
            .map(|value| value.to_string())
            .collect(),
            table_fill_opacity: 0.75,
            canonical_fill: "#6D5BD0".to_string(),
            canonical_stroke: "#4B3BA8".to_string(),
            consumer_fill: "#0F9D8A".to_string(),
            consumer_stroke: "#0B7366".to_string(),
            unclassified_fill: "#BAB0AB".to_string(),
            hierarchy_tint: "#B8C2D3".to_string(),
            top_level_tint: "#8C9BB5".to_string(),
            consumer_tint: "#0F9D8A".to_string(),
            neutral_tint: "#A0A7B4".to_string(),
            label_background: "#FFFFFF".to_string(),
            label_text_color: "#1C2430".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: "#10141C".to_string(),
            text_color: "#E6EAF2".to_string(),
            muted_text_color: "#8792A8".to_string(),
            canonical_fill: "#8F7FF0".to_string(),
            canonical_stroke: "#B3A8FF".to_string(),
            consumer_fill: "#2BC4AE".to_string(),
            consumer_stroke: "#6FE0CF".to_string(),
            hierarchy_tint: "#3A4456".to_string(),
            top_level_tint: "#56647F".to_string(),
            consumer_tint: "#2BC4AE".to_string(),
            neutral_tint: "#5D6575".to_string(),
            label_background: "#1A202B".to_string(),
            label_text_color: "#E6EAF2".to_string(),
            ..Self::light()
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" | "default" | "base" => Some(Self::light()),
            "dark" => Some(Self::dark()),
            _ => None,
        }
    }

    pub fn system_color(&self, slot: usize) -> &str {
        if self.system_palette.is_empty() {
            return &self.neutral_tint;
        }
        &self.system_palette[slot % self.system_palette.len()]
    }

    fn owner_color(&self, slot: Option<usize>) -> &str {
        match slot {
            Some(slot) => self.system_color(slot),
            None => &self.neutral_tint,
        }
    }

    /// Fill, stroke and fill opacity for a node of `kind`.
    pub fn node_paint(&self, kind: NodeKind, slot: Option<usize>) -> (String, String, f32) {
        match kind {
            NodeKind::OriginSystem => {
                let color = self.owner_color(slot).to_string();
                (color.clone(), color, 1.0)
            }
            NodeKind::OriginTable => {
                let color = self.owner_color(slot).to_string();
                (color.clone(), color, self.table_fill_opacity)
            }
            NodeKind::CanonicalEntity => {
                (self.canonical_fill.clone(), self.canonical_stroke.clone(), 1.0)
            }
            NodeKind::Consumer => (self.consumer_fill.clone(), self.consumer_stroke.clone(), 1.0),
            NodeKind::Unclassified => (
                self.unclassified_fill.clone(),
                self.neutral_tint.clone(),
                self.table_fill_opacity,
            ),
        }
    }

    /// Label border tint mirrors the node-type palette.
    pub fn label_border(&self, kind: NodeKind, slot: Option<usize>) -> String {
        match kind {
            NodeKind::OriginSystem | NodeKind::OriginTable => self.owner_color(slot).to_string(),
            NodeKind::CanonicalEntity => self.canonical_stroke.clone(),
            NodeKind::Consumer => self.consumer_stroke.clone(),
            NodeKind::Unclassified => self.neutral_tint.clone(),
        }
    }

    pub fn edge_color(&self, tint: EdgeTint) -> String {
        match tint {
            EdgeTint::Hierarchy => self.hierarchy_tint.clone(),
            EdgeTint::TopLevel => self.top_level_tint.clone(),
            EdgeTint::System(slot) => self.system_color(slot).to_string(),
            EdgeTint::Consumer => self.consumer_tint.clone(),
            EdgeTint::Neutral => self.neutral_tint.clone(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_around() {
        let theme = Theme::light();
        let n = theme.system_palette.len();
        assert_eq!(theme.system_color(0), theme.system_color(n));
    }

    #[test]
    fn hierarchy_tints_differ() {
        for theme in [Theme::light(), Theme::dark()] {
            assert_ne!(
                theme.edge_color(EdgeTint::TopLevel),
                theme.edge_color(EdgeTint::Hierarchy)
            );
        }
    }

    #[test]
    fn named_themes_resolve() {
        assert_eq!(Theme::by_name("Dark"), Some(Theme::dark()));
        assert_eq!(Theme::by_name("default"), Some(Theme::light()));
        assert!(Theme::by_name("neon").is_none());
    }
}
