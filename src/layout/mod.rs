pub mod routing;
pub(crate) mod types;
pub use routing::*;
pub use types::*;

use crate::config::LayoutConfig;
use crate::model::{ChangeRef, TopologyData};

/// Places every predecessor, task and successor node and lists the edges
/// between them.
///
/// Predecessors stack in a column at `x = 0`, each serial step gets its own
/// column centred on `y = 0`, and successors stack in a column after the
/// last step. Edges come out in a fixed order: predecessor links, then the
/// full bipartite connection between consecutive steps, then successor
/// links. `linksTo` entries are not checked against the task set.
pub fn compute_layout(data: &TopologyData, config: &LayoutConfig) -> TopologyLayout {
    let mut nodes = Vec::new();
    let size = Size {
        width: config.node_width,
        height: config.node_height,
    };

    nodes.extend(change_column(&data.predecessors, 0.0, NodeKind::Predecessor, size, config));

    let region_x = config.node_width + config.group_gap;
    let mut column_x = region_x;
    let mut last_column_x = None;
    for (step_idx, step) in data.steps().iter().enumerate() {
        let count = step.len() as f32;
        let group_height = count * config.node_height + (count - 1.0) * config.task_node_gap;
        let mut y = -(group_height / 2.0) + config.node_height / 2.0;
        for task in step {
            nodes.push(LayoutNode {
                id: task.id.clone(),
                kind: NodeKind::Task,
                label: task.label.clone(),
                position: Point::new(column_x, y),
                size,
                step: Some(step_idx),
            });
            y += config.row_pitch();
        }
        last_column_x = Some(column_x);
        column_x += config.step_pitch();
    }

    let successor_x = match last_column_x {
        Some(x) => x + config.node_width - config.task_group_gap + config.group_gap,
        None => region_x - config.task_group_gap + config.group_gap,
    };
    nodes.extend(change_column(&data.successors, successor_x, NodeKind::Successor, size, config));

    let edges = compute_edges(data);
    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        steps = data.steps().len(),
        "computed topology layout"
    );
    TopologyLayout { nodes, edges }
}

/// Edge list alone, in the same order `compute_layout` emits it.
pub fn compute_edges(data: &TopologyData) -> Vec<LayoutEdge> {
    let mut edges = Vec::new();

    for pred in &data.predecessors {
        for task_id in &pred.links_to {
            edges.push(LayoutEdge::new(&pred.id, task_id, EdgeKind::Inbound));
        }
    }

    for pair in data.steps().windows(2) {
        let (current, next) = (&pair[0], &pair[1]);
        for source in current {
            for target in next {
                edges.push(LayoutEdge::new(&source.id, &target.id, EdgeKind::Serial));
            }
        }
    }

    for succ in &data.successors {
        for task_id in &succ.links_to {
            edges.push(LayoutEdge::new(task_id, &succ.id, EdgeKind::Outbound));
        }
    }

    edges
}

/// `"{id}\n({name})"`, the label of a predecessor or successor node.
pub fn change_label(change: &ChangeRef) -> String {
    format!("{}\n({})", change.id, change.name)
}

fn change_column(
    changes: &[ChangeRef],
    x: f32,
    kind: NodeKind,
    size: Size,
    config: &LayoutConfig,
) -> Vec<LayoutNode> {
    changes
        .iter()
        .enumerate()
        .map(|(idx, change)| LayoutNode {
            id: change.id.clone(),
            kind,
            label: change_label(change),
            position: Point::new(x, idx as f32 * config.row_pitch()),
            size,
            step: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Task, TaskStatus};

    fn tasks(ids: &[&str]) -> Vec<Task> {
        ids.iter().map(|id| Task::new(*id, TaskStatus::Pending)).collect()
    }

    fn edge_pairs(layout: &TopologyLayout) -> Vec<(String, String)> {
        layout
            .edges
            .iter()
            .map(|edge| (edge.source.clone(), edge.target.clone()))
            .collect()
    }

    #[test]
    fn predecessor_and_successor_links_single_step() {
        let mut data = TopologyData::with_steps(vec![tasks(&["T1"])]);
        data.predecessors.push(ChangeRef::new("C1", "pre", &["T1"]));
        data.successors.push(ChangeRef::new("C2", "post", &["T1"]));

        let layout = compute_layout(&data, &LayoutConfig::default());
        assert_eq!(
            edge_pairs(&layout),
            vec![
                ("C1".to_string(), "T1".to_string()),
                ("T1".to_string(), "C2".to_string())
            ]
        );
        assert_eq!(layout.edges[0].kind, EdgeKind::Inbound);
        assert_eq!(layout.edges[1].kind, EdgeKind::Outbound);
    }

    #[test]
    fn fan_out_between_steps() {
        let data = TopologyData::with_steps(vec![tasks(&["T1"]), tasks(&["T2", "T3"])]);
        let layout = compute_layout(&data, &LayoutConfig::default());
        assert_eq!(
            edge_pairs(&layout),
            vec![
                ("T1".to_string(), "T2".to_string()),
                ("T1".to_string(), "T3".to_string())
            ]
        );
        let t2 = layout.node("T2").unwrap();
        let t3 = layout.node("T3").unwrap();
        assert_eq!(t2.position.x, t3.position.x);
        assert_eq!(t2.position.y, -t3.position.y);
    }

    #[test]
    fn single_task_without_neighbours() {
        let data = TopologyData::with_steps(vec![tasks(&["T1"])]);
        let layout = compute_layout(&data, &LayoutConfig::default());
        assert_eq!(layout.nodes.len(), 1);
        assert!(layout.edges.is_empty());
    }

    #[test]
    fn column_coordinates_match_geometry() {
        let mut data = TopologyData::with_steps(vec![tasks(&["T1"]), tasks(&["T2", "T3"])]);
        data.predecessors.push(ChangeRef::new("C1", "a", &["T1"]));
        data.predecessors.push(ChangeRef::new("C2", "b", &["T1"]));
        data.successors.push(ChangeRef::new("C3", "c", &["T2"]));
        let layout = compute_layout(&data, &LayoutConfig::default());

        let c2 = layout.node("C2").unwrap();
        assert_eq!(c2.position, Point::new(0.0, 80.0));
        assert_eq!(c2.label, "C2\n(b)");

        // Region starts at 150 + 100, steps advance by 150 + 30.
        assert_eq!(layout.node("T1").unwrap().position, Point::new(250.0, 0.0));
        assert_eq!(layout.node("T2").unwrap().position, Point::new(430.0, -40.0));
        assert_eq!(layout.node("T3").unwrap().position, Point::new(430.0, 40.0));

        // Last column 430 + 150 - 30 + 100.
        assert_eq!(layout.node("C3").unwrap().position, Point::new(650.0, 0.0));
    }

    #[test]
    fn successors_without_steps_offset_from_region_start() {
        let mut data = TopologyData::new();
        data.successors.push(ChangeRef::new("C9", "late", &[]));
        let layout = compute_layout(&data, &LayoutConfig::default());
        assert_eq!(layout.node("C9").unwrap().position.x, 150.0 + 100.0 - 30.0 + 100.0);
    }

    #[test]
    fn empty_topology_has_no_nodes() {
        let layout = compute_layout(&TopologyData::new(), &LayoutConfig::default());
        assert!(layout.is_empty());
        assert_eq!(layout.bounds(), None);
    }

    #[test]
    fn dangling_link_still_produces_edge() {
        let mut data = TopologyData::with_steps(vec![tasks(&["T1"])]);
        data.predecessors.push(ChangeRef::new("C1", "pre", &["T404"]));
        let layout = compute_layout(&data, &LayoutConfig::default());
        assert_eq!(layout.edges.len(), 1);
        assert_eq!(layout.edges[0].id, "C1-T404");
        assert!(layout.node("T404").is_none());
    }

    #[test]
    fn bounds_cover_all_columns() {
        let mut data = TopologyData::with_steps(vec![tasks(&["T1", "T2", "T3"])]);
        data.predecessors.push(ChangeRef::new("C1", "pre", &["T1"]));
        let layout = compute_layout(&data, &LayoutConfig::default());
        let bounds = layout.bounds().unwrap();
        assert_eq!(bounds.x, 0.0);
        assert_eq!(bounds.y, -80.0);
        assert_eq!(bounds.right(), 400.0);
        assert_eq!(bounds.bottom(), 140.0);
    }
}
