pub mod alias;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod interaction;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod render;
pub mod resize;
pub mod session;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use error::LineageError;

use alias::AliasTable;
use config::{Config, LayoutConfig, TextMetricsMode};
use filter::{Selection, filter_graph};
use interaction::InteractionView;
use ir::Snapshot;
use layout::{LayoutOutcome, Size, compute_layout};
use text_metrics::{FixedWidthMetrics, FontMetrics, TextMeasure};
use theme::Theme;

/// One-shot rendering inputs: everything except the snapshot itself.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    pub config: Config,
    pub size: Size,
    pub selection: Selection,
    pub view: InteractionView,
}

impl RenderOptions {
    pub fn from_config(config: Config) -> Self {
        let size = Size::new(config.render.width, config.render.height);
        Self {
            config,
            size,
            selection: Selection::all(),
            view: InteractionView::none(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.config.theme = theme;
        self
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_view(mut self, view: InteractionView) -> Self {
        self.view = view;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(Config::default())
    }
}

/// Picks the text measurer configured for `layout`.
pub fn measurer_for(theme: &Theme, layout: &LayoutConfig) -> Box<dyn TextMeasure> {
    match layout.text_metrics {
        TextMetricsMode::Font => Box::new(FontMetrics::new(theme.font_family.clone())),
        TextMetricsMode::Fixed => Box::new(FixedWidthMetrics::new(layout.fixed_advance_ratio)),
    }
}

/// Filters and lays out `snapshot` under `options`.
pub fn layout_snapshot(snapshot: &Snapshot, options: &RenderOptions) -> LayoutOutcome {
    let config = &options.config;
    let aliases = AliasTable::new(&config.filter.aliases);
    let graph = filter_graph(snapshot, &options.selection, &aliases);
    let measurer = measurer_for(&config.theme, &config.layout);
    compute_layout(
        &graph,
        options.size,
        &config.theme,
        &config.layout,
        measurer.as_ref(),
    )
}

/// Full pipeline from an in-memory snapshot to SVG.
pub fn render_snapshot(snapshot: &Snapshot, options: &RenderOptions) -> String {
    let outcome = layout_snapshot(snapshot, options);
    render::render_svg(
        &outcome,
        &options.config.theme,
        &options.config.layout,
        &options.view,
    )
}

/// Full pipeline from snapshot JSON to SVG.
pub fn render_with_options(
    snapshot_json: &str,
    options: RenderOptions,
) -> Result<String, LineageError> {
    let snapshot = Snapshot::from_json(snapshot_json)?;
    Ok(render_snapshot(&snapshot, &options))
}
