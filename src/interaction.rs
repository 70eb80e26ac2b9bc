//! Hover highlighting, event-driven edge pulses and click-to-preview.
//!
//! None of this touches geometry. The renderer reads an [`InteractionView`]
//! snapshot and only adjusts opacity and stroke.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::LineageError;
use crate::ir::edge_key;
use crate::layout::EdgeLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainEventKind {
    #[serde(alias = "source-connected", alias = "sourceConnected")]
    SourceConnected,
    #[serde(alias = "source-removed", alias = "sourceRemoved")]
    SourceRemoved,
    Fault,
    #[serde(alias = "schema-drift", alias = "schemaDrift")]
    SchemaDrift,
    #[serde(other)]
    Other,
}

/// Event from the host shell that should draw attention to one edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    #[serde(rename = "type")]
    pub kind: DomainEventKind,
    pub source_id: String,
    pub target_id: String,
}

impl DomainEvent {
    pub fn edge_key(&self) -> String {
        edge_key(&self.source_id, &self.target_id)
    }
}

/// Read-only lookup service for node previews.
pub trait PreviewService {
    fn preview(&self, node_id: &str) -> Result<serde_json::Value, LineageError>;
}

/// Preview payload, forwarded to the host uninterpreted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResponse {
    pub node_id: String,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Normal,
    Highlighted,
    Dimmed,
}

#[derive(Debug, Clone)]
pub struct InteractionState {
    hovered: Option<String>,
    /// Edge key to pulse deadline.
    pulses: BTreeMap<String, Instant>,
    pulse_duration: Duration,
}

impl InteractionState {
    pub fn new(pulse_duration: Duration) -> Self {
        Self {
            hovered: None,
            pulses: BTreeMap::new(),
            pulse_duration,
        }
    }

    pub fn hover(&mut self, node_id: Option<&str>) {
        self.hovered = node_id.map(str::to_string);
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Starts (or restarts) a pulse on the event's edge. Expired pulses are
    /// dropped here rather than by a cancellable timer.
    pub fn apply_event(&mut self, event: &DomainEvent, now: Instant) {
        self.pulses.retain(|_, deadline| *deadline > now);
        tracing::debug!(kind = ?event.kind, edge = %event.edge_key(), "pulsing edge");
        self.pulses
            .insert(event.edge_key(), now + self.pulse_duration);
    }

    pub fn is_pulsing(&self, key: &str, now: Instant) -> bool {
        self.pulses
            .get(key)
            .is_some_and(|deadline| *deadline > now)
    }

    pub fn view(&self, now: Instant) -> InteractionView {
        InteractionView {
            hovered: self.hovered.clone(),
            pulsing: self
                .pulses
                .iter()
                .filter(|(_, deadline)| **deadline > now)
                .map(|(key, _)| key.clone())
                .collect(),
        }
    }

    /// Requests a preview for `node_id`. Failures are logged and yield
    /// `None`; the diagram is never touched.
    pub fn click(&self, node_id: &str, service: &dyn PreviewService) -> Option<PreviewResponse> {
        match service.preview(node_id) {
            Ok(payload) => Some(PreviewResponse {
                node_id: node_id.to_string(),
                payload,
            }),
            Err(err) => {
                tracing::warn!(node_id, error = %err, "node preview failed");
                None
            }
        }
    }
}

impl Default for InteractionState {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}

/// Frozen interaction state for one paint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionView {
    pub hovered: Option<String>,
    pub pulsing: BTreeSet<String>,
}

impl InteractionView {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn hovering(node_id: &str) -> Self {
        Self {
            hovered: Some(node_id.to_string()),
            pulsing: BTreeSet::new(),
        }
    }

    pub fn is_pulsing(&self, edge: &EdgeLayout) -> bool {
        self.pulsing.contains(&edge.key())
    }

    pub fn edge_emphasis(&self, edge: &EdgeLayout) -> Emphasis {
        if self.is_pulsing(edge) {
            return Emphasis::Highlighted;
        }
        match self.hovered.as_deref() {
            None => Emphasis::Normal,
            Some(id) if edge.source == id || edge.target == id => Emphasis::Highlighted,
            Some(_) => Emphasis::Dimmed,
        }
    }

    /// Hovered node and its direct neighbours stay lit, the rest dim.
    pub fn node_emphasis(&self, node_id: &str, edges: &[EdgeLayout]) -> Emphasis {
        let Some(hovered) = self.hovered.as_deref() else {
            return Emphasis::Normal;
        };
        if hovered == node_id {
            return Emphasis::Highlighted;
        }
        let adjacent = edges.iter().any(|edge| {
            (edge.source == hovered && edge.target == node_id)
                || (edge.target == hovered && edge.source == node_id)
        });
        if adjacent {
            Emphasis::Normal
        } else {
            Emphasis::Dimmed
        }
    }
}
