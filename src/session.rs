//! Long-lived diagram state for a host that feeds snapshots, selections,
//! resizes and events over time.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::alias::AliasTable;
use crate::config::Config;
use crate::error::LineageError;
use crate::filter::{Selection, filter_graph};
use crate::interaction::{DomainEvent, InteractionState, PreviewResponse, PreviewService};
use crate::ir::{FilteredGraph, Snapshot};
use crate::layout::{LayoutOutcome, Size, compute_layout};
use crate::render::render_svg;
use crate::resize::ResizeCoordinator;
use crate::text_metrics::TextMeasure;

/// Read-only lineage backend.
pub trait SnapshotSource {
    fn fetch(&self) -> Result<Snapshot, LineageError>;
}

pub struct DiagramSession {
    config: Config,
    aliases: AliasTable,
    measurer: Box<dyn TextMeasure>,
    snapshot: Snapshot,
    selection: Selection,
    resize: ResizeCoordinator,
    interaction: InteractionState,
    current: Arc<LayoutOutcome>,
    recomputes: usize,
}

impl DiagramSession {
    /// Starts with an empty snapshot; the initial layout is the empty
    /// placeholder for `size`.
    pub fn new(config: Config, measurer: Box<dyn TextMeasure>, size: Size) -> Self {
        let aliases = AliasTable::new(&config.filter.aliases);
        let interaction =
            InteractionState::new(Duration::from_millis(config.layout.pulse_duration_ms));
        let placeholder = compute_layout(
            &FilteredGraph::default(),
            size,
            &config.theme,
            &config.layout,
            measurer.as_ref(),
        );
        Self {
            config,
            aliases,
            measurer,
            snapshot: Snapshot::new(),
            selection: Selection::all(),
            resize: ResizeCoordinator::new(size),
            interaction,
            current: Arc::new(placeholder),
            recomputes: 1,
        }
    }

    pub fn set_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        self.recompute();
    }

    /// Pulls a fresh snapshot. On failure the previous snapshot and layout
    /// stay in place and the error is returned to the caller.
    pub fn refresh(&mut self, source: &dyn SnapshotSource) -> Result<(), LineageError> {
        match source.fetch() {
            Ok(snapshot) => {
                self.set_snapshot(snapshot);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "snapshot refresh failed, keeping previous layout");
                Err(err)
            }
        }
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
        self.recompute();
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Records a container size. Nothing is recomputed until the next frame.
    pub fn observe_resize(&mut self, size: Size) {
        self.resize.observe(size);
    }

    /// Applies the latest observed size, if any changed. Returns the new
    /// layout when a recompute happened.
    pub fn on_animation_frame(&mut self) -> Option<Arc<LayoutOutcome>> {
        self.resize.take_frame()?;
        self.recompute();
        Some(self.layout())
    }

    pub fn container(&self) -> Size {
        self.resize.applied()
    }

    /// The most recently completed layout.
    pub fn layout(&self) -> Arc<LayoutOutcome> {
        Arc::clone(&self.current)
    }

    /// Number of layout passes run so far.
    pub fn recompute_count(&self) -> usize {
        self.recomputes
    }

    pub fn hover(&mut self, node_id: Option<&str>) {
        self.interaction.hover(node_id);
    }

    pub fn apply_event(&mut self, event: &DomainEvent, now: Instant) {
        self.interaction.apply_event(event, now);
    }

    pub fn click(&self, node_id: &str, service: &dyn PreviewService) -> Option<PreviewResponse> {
        self.interaction.click(node_id, service)
    }

    pub fn render_svg(&self, now: Instant) -> String {
        render_svg(
            &self.current,
            &self.config.theme,
            &self.config.layout,
            &self.interaction.view(now),
        )
    }

    fn recompute(&mut self) {
        let graph = filter_graph(&self.snapshot, &self.selection, &self.aliases);
        let outcome = compute_layout(
            &graph,
            self.resize.applied(),
            &self.config.theme,
            &self.config.layout,
            self.measurer.as_ref(),
        );
        self.recomputes += 1;
        self.current = Arc::new(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text_metrics::FixedWidthMetrics;

    fn snapshot() -> Snapshot {
        let mut s = Snapshot::new();
        s.push_node("crm", "CRM", "origin-system", None, None);
        s.push_node("crm.accounts", "accounts", "origin-table", Some("crm"), Some("crm"));
        s.push_node("customer", "Customer", "canonical-entity", None, None);
        s.push_edge("crm", "crm.accounts", "hierarchy", None);
        s.push_edge("crm.accounts", "customer", "dataflow", Some(3.0));
        s
    }

    fn session() -> DiagramSession {
        DiagramSession::new(
            Config::default(),
            Box::new(FixedWidthMetrics::default()),
            Size::new(800.0, 400.0),
        )
    }

    struct Failing;

    impl SnapshotSource for Failing {
        fn fetch(&self) -> Result<Snapshot, LineageError> {
            Err(LineageError::Fetch("backend unavailable".to_string()))
        }
    }

    #[test]
    fn resize_burst_recomputes_once_per_frame() {
        let mut session = session();
        session.set_snapshot(snapshot());
        let before = session.recompute_count();
        for w in [900.0, 1000.0, 1100.0] {
            session.observe_resize(Size::new(w, 400.0));
        }
        assert_eq!(session.recompute_count(), before);
        let layout = session.on_animation_frame().unwrap();
        assert_eq!(session.recompute_count(), before + 1);
        assert_eq!(layout.as_ready().unwrap().container, Size::new(1100.0, 400.0));
        assert!(session.on_animation_frame().is_none());
    }

    #[test]
    fn failed_refresh_keeps_previous_layout() {
        let mut session = session();
        session.set_snapshot(snapshot());
        let before = session.layout();
        assert!(session.refresh(&Failing).is_err());
        assert_eq!(*session.layout(), *before);
    }

    #[test]
    fn selection_change_recomputes() {
        let mut session = session();
        session.set_snapshot(snapshot());
        session.set_selection(Selection::all().with_systems(["salesforce"]));
        assert!(session.layout().as_ready().unwrap().node("crm.accounts").is_none());
    }
}
