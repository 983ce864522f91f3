use change_topology::layout::{MeasuredAnchors, Rect};
use change_topology::{
    Config, LayoutConfig, TopologyData, compute_layout, flow_elements, parse_topology,
    render_topology_svg, route_links,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopologyLayoutOptions {
    node_width: Option<f32>,
    node_height: Option<f32>,
    group_gap: Option<f32>,
    task_group_gap: Option<f32>,
    task_node_gap: Option<f32>,
    selected_task_id: Option<String>,
}

/// Boxes measured with `getBoundingClientRect`, keyed by element id.
#[derive(Debug, Default, Deserialize)]
struct MeasuredBoxes {
    container: Option<Rect>,
    #[serde(default)]
    nodes: HashMap<String, Rect>,
}

#[derive(Serialize)]
struct LinkOut {
    id: String,
    d: String,
}

fn build_layout_config(options: &TopologyLayoutOptions) -> LayoutConfig {
    let mut config = LayoutConfig::default();
    if let Some(v) = options.node_width {
        config.node_width = v;
    }
    if let Some(v) = options.node_height {
        config.node_height = v;
    }
    if let Some(v) = options.group_gap {
        config.group_gap = v;
    }
    if let Some(v) = options.task_group_gap {
        config.task_group_gap = v;
    }
    if let Some(v) = options.task_node_gap {
        config.task_node_gap = v;
    }
    config
}

fn to_js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

fn parse_options(options_json: Option<String>) -> Result<TopologyLayoutOptions, JsValue> {
    match options_json {
        Some(raw) => serde_json::from_str(&raw).map_err(to_js_error),
        None => Ok(TopologyLayoutOptions::default()),
    }
}

fn flow_json(data: &TopologyData, options: &TopologyLayoutOptions) -> Result<String, JsValue> {
    let layout = compute_layout(data, &build_layout_config(options));
    let selected = options
        .selected_task_id
        .as_deref()
        .or_else(|| data.selected_task_id());
    serde_json::to_string(&flow_elements(data, &layout, selected)).map_err(to_js_error)
}

/// Node and edge descriptors for a node-graph surface.
#[wasm_bindgen]
pub fn layout_topology(topology_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let data = parse_topology(topology_json).map_err(to_js_error)?;
    flow_json(&data, &parse_options(options_json)?)
}

/// Curve paths between measured node boxes, relative to the container box.
#[wasm_bindgen]
pub fn route_topology_links(topology_json: &str, boxes_json: &str) -> Result<String, JsValue> {
    let data = parse_topology(topology_json).map_err(to_js_error)?;
    let boxes: MeasuredBoxes = serde_json::from_str(boxes_json).map_err(to_js_error)?;
    let anchors = MeasuredAnchors {
        container: boxes.container,
        boxes: boxes.nodes,
    };
    let links: Vec<LinkOut> = route_links(&data, &anchors)
        .into_iter()
        .map(|link| LinkOut {
            id: link.id,
            d: link.path,
        })
        .collect();
    serde_json::to_string(&links).map_err(to_js_error)
}

#[wasm_bindgen]
pub fn selected_task_id(topology_json: &str) -> Result<Option<String>, JsValue> {
    let data = parse_topology(topology_json).map_err(to_js_error)?;
    Ok(data.selected_task_id().map(str::to_string))
}

#[wasm_bindgen]
pub fn render_topology(topology_json: &str) -> Result<String, JsValue> {
    render_topology_svg(topology_json, &Config::default()).map_err(to_js_error)
}
