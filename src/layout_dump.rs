use crate::layout::{EdgeKind, NodeKind, TopologyLayout};
use crate::model::TopologyData;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub change_id: Option<String>,
    pub selected: Option<String>,
    pub bounds: Option<[f32; 4]>,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub dangling_links: Vec<[String; 2]>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub id: String,
    pub kind: NodeKind,
    pub step: Option<usize>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub label_lines: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EdgeDump {
    pub id: String,
    pub kind: EdgeKind,
    pub source: String,
    pub target: String,
}

impl LayoutDump {
    pub fn from_layout(layout: &TopologyLayout, data: &TopologyData) -> Self {
        let nodes = layout
            .nodes
            .iter()
            .map(|node| NodeDump {
                id: node.id.clone(),
                kind: node.kind,
                step: node.step,
                x: node.position.x,
                y: node.position.y,
                width: node.size.width,
                height: node.size.height,
                label_lines: node.label.lines().map(str::to_string).collect(),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                id: edge.id.clone(),
                kind: edge.kind,
                source: edge.source.clone(),
                target: edge.target.clone(),
            })
            .collect();

        LayoutDump {
            change_id: data.current_change.id.clone(),
            selected: data.selected_task_id().map(str::to_string),
            bounds: layout
                .bounds()
                .map(|rect| [rect.x, rect.y, rect.width, rect.height]),
            nodes,
            edges,
            dangling_links: data
                .dangling_links()
                .into_iter()
                .map(|(change, task)| [change.to_string(), task.to_string()])
                .collect(),
        }
    }
}

pub fn write_layout_dump(path: &Path, layout: &TopologyLayout, data: &TopologyData) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = LayoutDump::from_layout(layout, data);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}
