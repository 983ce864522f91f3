//! Owns the displayed topology between selection events.
//!
//! A new topology always replaces the whole node and edge set. Selecting a
//! task only flips selection flags. Viewport fits are queued as deferred
//! requests for the rendering surface to run once it has painted.

use crate::config::{FitConfig, LayoutConfig};
use crate::flow::{FlowGraph, flow_elements};
use crate::layout::{Rect, TopologyLayout, compute_layout};
use crate::model::TopologyData;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub zoom: f32,
}

impl Viewport {
    pub const IDENTITY: Viewport = Viewport {
        x: 0.0,
        y: 0.0,
        zoom: 1.0,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitRequest {
    /// Generation of the layout the request was queued for.
    pub generation: u64,
    pub due_after: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    Unchanged,
    Moved {
        cleared: bool,
        set: bool,
    },
}

#[derive(Debug)]
pub struct TopologyView {
    layout_config: LayoutConfig,
    fit_config: FitConfig,
    topology: TopologyData,
    layout: TopologyLayout,
    graph: FlowGraph,
    selected: Option<String>,
    generation: u64,
    pending_fits: Vec<FitRequest>,
}

impl TopologyView {
    pub fn new(layout_config: LayoutConfig, fit_config: FitConfig) -> Self {
        Self {
            layout_config,
            fit_config,
            topology: TopologyData::default(),
            layout: TopologyLayout::default(),
            graph: FlowGraph::default(),
            selected: None,
            generation: 0,
            pending_fits: Vec::new(),
        }
    }

    /// Discards the displayed nodes and edges and rebuilds them from
    /// `topology`. The selection resets to the derived pick and a fit
    /// request is queued.
    pub fn replace(&mut self, topology: TopologyData) {
        self.selected = topology.selected_task_id().map(str::to_string);
        self.layout = compute_layout(&topology, &self.layout_config);
        self.graph = flow_elements(&topology, &self.layout, self.selected.as_deref());
        self.topology = topology;
        self.generation += 1;
        self.pending_fits.push(FitRequest {
            generation: self.generation,
            due_after: self.fit_config.delay,
        });
        tracing::debug!(
            generation = self.generation,
            nodes = self.graph.nodes.len(),
            edges = self.graph.edges.len(),
            selected = self.selected.as_deref().unwrap_or(""),
            "replaced topology view"
        );
    }

    /// Moves the selection flag without touching positions.
    pub fn select(&mut self, task_id: Option<&str>) -> SelectionChange {
        if self.selected.as_deref() == task_id {
            return SelectionChange::Unchanged;
        }
        let cleared = match self.selected.take() {
            Some(old) => self
                .graph
                .node_mut(&old)
                .map(|node| node.set_selected(false))
                .unwrap_or(false),
            None => false,
        };
        let set = match task_id {
            Some(id) => self
                .graph
                .node_mut(id)
                .map(|node| node.set_selected(true))
                .unwrap_or(false),
            None => false,
        };
        if task_id.is_some() && !set {
            tracing::warn!(task = task_id.unwrap_or(""), "selected id has no task node");
        }
        self.selected = task_id.map(str::to_string);
        SelectionChange::Moved { cleared, set }
    }

    /// Drains queued fit requests in the order they were made.
    pub fn take_pending_fits(&mut self) -> Vec<FitRequest> {
        std::mem::take(&mut self.pending_fits)
    }

    pub fn fit_view(&self, viewport: Rect) -> Viewport {
        fit_bounds(self.layout.bounds(), viewport, &self.fit_config)
    }

    pub fn topology(&self) -> &TopologyData {
        &self.topology
    }

    pub fn layout(&self) -> &TopologyLayout {
        &self.layout
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Zoom and translation that centre `bounds` inside `viewport`, leaving
/// `padding` (a fraction of the content size) around it.
pub fn fit_bounds(bounds: Option<Rect>, viewport: Rect, config: &FitConfig) -> Viewport {
    let Some(bounds) = bounds else {
        return Viewport::IDENTITY;
    };
    let padded_w = bounds.width * (1.0 + config.padding);
    let padded_h = bounds.height * (1.0 + config.padding);
    let zoom_x = if padded_w > 0.0 { viewport.width / padded_w } else { config.max_zoom };
    let zoom_y = if padded_h > 0.0 { viewport.height / padded_h } else { config.max_zoom };
    let zoom = zoom_x.min(zoom_y).clamp(config.min_zoom, config.max_zoom);

    let center = bounds.center();
    Viewport {
        x: viewport.width / 2.0 - center.x * zoom,
        y: viewport.height / 2.0 - center.y * zoom,
        zoom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChangeRef, Task, TaskStatus};

    fn view() -> TopologyView {
        TopologyView::new(LayoutConfig::default(), FitConfig::default())
    }

    fn topology(running: &str) -> TopologyData {
        let ids = ["T1", "T2", "T3"];
        let step = ids
            .iter()
            .map(|id| {
                let status = if *id == running {
                    TaskStatus::Running
                } else {
                    TaskStatus::Success
                };
                Task::new(*id, status)
            })
            .collect();
        let mut data = TopologyData::with_steps(vec![step]);
        data.predecessors.push(ChangeRef::new("C1", "pre", &["T1"]));
        data
    }

    #[test]
    fn replace_rebuilds_and_queues_fit() {
        let mut view = view();
        view.replace(topology("T2"));
        assert_eq!(view.selected(), Some("T2"));
        assert_eq!(view.graph().nodes.len(), 4);
        assert_eq!(view.graph().selected_ids(), vec!["T2"]);

        let mut smaller = TopologyData::with_steps(vec![vec![Task::new("T9", TaskStatus::Pending)]]);
        smaller.current_change.id = Some("C2".to_string());
        view.replace(smaller);
        assert_eq!(view.graph().nodes.len(), 1);
        assert!(view.graph().node("C1").is_none());
        assert_eq!(view.selected(), Some("T9"));

        let fits = view.take_pending_fits();
        assert_eq!(fits.len(), 2);
        assert_eq!(fits[1].generation, 2);
        assert_eq!(fits[0].due_after, Duration::from_millis(100));
        assert!(view.take_pending_fits().is_empty());
    }

    #[test]
    fn select_moves_only_the_flag() {
        let mut view = view();
        view.replace(topology("T2"));
        let before = view.layout().clone();

        let change = view.select(Some("T3"));
        assert_eq!(change, SelectionChange::Moved { cleared: true, set: true });
        assert_eq!(view.graph().selected_ids(), vec!["T3"]);
        assert_eq!(view.layout(), &before);
        assert_eq!(view.generation(), 1);

        assert_eq!(view.select(Some("T3")), SelectionChange::Unchanged);
    }

    #[test]
    fn selecting_unknown_id_clears_previous() {
        let mut view = view();
        view.replace(topology("T1"));
        let change = view.select(Some("T404"));
        assert_eq!(change, SelectionChange::Moved { cleared: true, set: false });
        assert!(view.graph().selected_ids().is_empty());
    }

    #[test]
    fn fit_of_empty_layout_is_identity() {
        let mut view = view();
        view.replace(TopologyData::new());
        assert_eq!(view.fit_view(Rect::new(0.0, 0.0, 800.0, 600.0)), Viewport::IDENTITY);
    }

    #[test]
    fn fit_centres_and_clamps_zoom() {
        let config = FitConfig::default();
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let fit = fit_bounds(Some(bounds), Rect::new(0.0, 0.0, 1000.0, 1000.0), &config);
        assert_eq!(fit.zoom, 2.0);
        assert_eq!(fit.x, 500.0 - 50.0 * 2.0);
        assert_eq!(fit.y, 500.0 - 25.0 * 2.0);

        let wide = Rect::new(0.0, 0.0, 10_000.0, 100.0);
        let fit = fit_bounds(Some(wide), Rect::new(0.0, 0.0, 1000.0, 1000.0), &config);
        assert_eq!(fit.zoom, 0.5);
    }
}
