//! Node-graph descriptors for interactive graph surfaces.
//!
//! Each node carries its top-left position and a data payload; task nodes
//! also carry their selection flag so the surface can restyle them without
//! a new layout.

use crate::layout::{LayoutNode, NodeKind, Point, TopologyLayout};
use crate::model::{Contact, TaskStatus, TopologyData};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowNodeType {
    /// Plain box used for predecessor and successor changes.
    Default,
    /// Task card.
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlowNodeData {
    Change {
        #[serde(rename = "type")]
        kind: &'static str,
    },
    Task(TaskNodeData),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskNodeData {
    pub id: String,
    pub status: TaskStatus,
    pub label: String,
    pub name: String,
    pub submitter: Contact,
    pub implementer: Contact,
    pub is_selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: FlowNodeType,
    pub label: String,
    pub position: Point,
    pub data: FlowNodeData,
}

impl FlowNode {
    pub fn is_selected(&self) -> bool {
        matches!(&self.data, FlowNodeData::Task(task) if task.is_selected)
    }

    /// Sets the flag on task nodes; returns false for change nodes.
    pub fn set_selected(&mut self, selected: bool) -> bool {
        match &mut self.data {
            FlowNodeData::Task(task) => {
                task.is_selected = selected;
                true
            }
            FlowNodeData::Change { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub animated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut FlowNode> {
        self.nodes.iter_mut().find(|node| node.id == id)
    }

    pub fn selected_ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|node| node.is_selected())
            .map(|node| node.id.as_str())
            .collect()
    }
}

pub fn flow_elements(
    data: &TopologyData,
    layout: &TopologyLayout,
    selected: Option<&str>,
) -> FlowGraph {
    let nodes = layout
        .nodes
        .iter()
        .map(|node| flow_node(data, node, selected))
        .collect();
    let edges = layout
        .edges
        .iter()
        .map(|edge| FlowEdge {
            id: format!("e-{}-{}", edge.source, edge.target),
            source: edge.source.clone(),
            target: edge.target.clone(),
            animated: true,
        })
        .collect();
    FlowGraph { nodes, edges }
}

fn flow_node(data: &TopologyData, node: &LayoutNode, selected: Option<&str>) -> FlowNode {
    let task = match node.kind {
        NodeKind::Task => data.task(&node.id),
        NodeKind::Predecessor | NodeKind::Successor => None,
    };
    let (node_type, payload) = match task {
        Some(task) => (
            FlowNodeType::Custom,
            FlowNodeData::Task(TaskNodeData {
                id: task.id.clone(),
                status: task.status,
                label: task.label.clone(),
                name: task.name.clone(),
                submitter: task.submitter.clone(),
                implementer: task.implementer.clone(),
                is_selected: selected == Some(task.id.as_str()),
            }),
        ),
        None => (FlowNodeType::Default, FlowNodeData::Change { kind: "change" }),
    };
    FlowNode {
        id: node.id.clone(),
        node_type,
        label: node.label.clone(),
        position: node.position,
        data: payload,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::layout::compute_layout;
    use crate::model::{ChangeRef, Task};

    fn sample() -> TopologyData {
        let mut data = TopologyData::with_steps(vec![
            vec![Task::new("T1", TaskStatus::Success)],
            vec![
                Task::new("T2", TaskStatus::Failed),
                Task::new("T3", TaskStatus::Pending),
            ],
        ]);
        data.predecessors.push(ChangeRef::new("C1", "approval", &["T1"]));
        data
    }

    #[test]
    fn builds_descriptors_in_layout_order() {
        let data = sample();
        let layout = compute_layout(&data, &LayoutConfig::default());
        let graph = flow_elements(&data, &layout, data.selected_task_id());

        let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["C1", "T1", "T2", "T3"]);
        assert_eq!(graph.nodes[0].node_type, FlowNodeType::Default);
        assert_eq!(graph.nodes[1].node_type, FlowNodeType::Custom);
        assert_eq!(graph.selected_ids(), vec!["T2"]);

        let edge_ids: Vec<&str> = graph.edges.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edge_ids, vec!["e-C1-T1", "e-T1-T2", "e-T1-T3"]);
        assert!(graph.edges.iter().all(|e| e.animated));
    }

    #[test]
    fn serializes_for_graph_surface() {
        let data = sample();
        let layout = compute_layout(&data, &LayoutConfig::default());
        let graph = flow_elements(&data, &layout, Some("T3"));
        let json = serde_json::to_value(&graph).unwrap();

        assert_eq!(json["nodes"][0]["type"], "default");
        assert_eq!(json["nodes"][0]["data"]["type"], "change");
        assert_eq!(json["nodes"][0]["label"], "C1\n(approval)");
        assert_eq!(json["nodes"][3]["data"]["isSelected"], true);
        assert_eq!(json["nodes"][3]["data"]["status"], "PENDING");
        assert_eq!(json["nodes"][1]["position"]["x"], 250.0);
    }

    #[test]
    fn change_nodes_ignore_selection() {
        let data = sample();
        let layout = compute_layout(&data, &LayoutConfig::default());
        let mut graph = flow_elements(&data, &layout, Some("C1"));
        assert!(graph.selected_ids().is_empty());
        assert!(!graph.node_mut("C1").unwrap().set_selected(true));
    }
}
