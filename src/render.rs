use crate::config::RenderConfig;
use crate::layout::{LayoutAnchors, LayoutNode, NodeKind, TopologyLayout, node_element_id, route_layout_edges};
use crate::model::TopologyData;
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

const NODE_RADIUS: f32 = 8.0;
const STATUS_BAR_WIDTH: f32 = 4.0;
const LABEL_LINE_HEIGHT: f32 = 1.4;

pub fn render_svg(
    layout: &TopologyLayout,
    data: &TopologyData,
    selected: Option<&str>,
    theme: &Theme,
    config: &RenderConfig,
) -> String {
    let anchors = LayoutAnchors::new(layout, config.padding);
    let container = anchors.container();
    let offset = anchors.offset();
    let width = container.width.max(200.0);
    let height = container.height.max(200.0);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\" class=\"topology-container\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        config.background
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{}\"/></marker>",
        theme.line_color
    ));
    svg.push_str("</defs>");

    for link in route_layout_edges(layout, &anchors) {
        svg.push_str(&format!(
            "<path id=\"{}\" d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.4\" marker-end=\"url(#arrow)\"/>",
            escape_xml(&link.id),
            link.path,
            theme.line_color
        ));
    }

    for node in &layout.nodes {
        let x = node.position.x + offset.x;
        let y = node.position.y + offset.y;
        svg.push_str(&node_svg(node, x, y, data, selected, theme));
    }

    svg.push_str("</svg>");
    svg
}

fn node_svg(
    node: &LayoutNode,
    x: f32,
    y: f32,
    data: &TopologyData,
    selected: Option<&str>,
    theme: &Theme,
) -> String {
    let mut out = String::new();
    let w = node.size.width;
    let h = node.size.height;
    let is_selected = node.kind == NodeKind::Task && selected == Some(node.id.as_str());
    let (fill, stroke, stroke_width) = match node.kind {
        NodeKind::Predecessor | NodeKind::Successor => {
            (theme.change_fill.as_str(), theme.change_border.as_str(), 1.0)
        }
        NodeKind::Task if is_selected => {
            (theme.selected_fill.as_str(), theme.selected_border.as_str(), 2.4)
        }
        NodeKind::Task => (theme.task_fill.as_str(), theme.change_border.as_str(), 1.0),
    };

    out.push_str(&format!(
        "<g id=\"{}\" class=\"topo-node topo-{:?}\">",
        escape_xml(&node_element_id(&node.id)),
        node.kind
    ));
    out.push_str(&format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{w:.2}\" height=\"{h:.2}\" rx=\"{NODE_RADIUS}\" ry=\"{NODE_RADIUS}\" fill=\"{fill}\" stroke=\"{stroke}\" stroke-width=\"{stroke_width}\"/>",
    ));
    if let Some(task) = data.task(&node.id).filter(|_| node.kind == NodeKind::Task) {
        out.push_str(&format!(
            "<rect x=\"{x:.2}\" y=\"{:.2}\" width=\"{STATUS_BAR_WIDTH}\" height=\"{:.2}\" fill=\"{}\"><title>{}</title></rect>",
            y + NODE_RADIUS / 2.0,
            (h - NODE_RADIUS).max(0.0),
            theme.status_color(task.status),
            task.status.as_str()
        ));
    }
    out.push_str(&text_block_svg(x + w / 2.0, y + h / 2.0, &node.label, theme));
    out.push_str("</g>");
    out
}

fn text_block_svg(x: f32, y: f32, label: &str, theme: &Theme) -> String {
    let lines: Vec<&str> = label.lines().collect();
    let line_height = theme.font_size * LABEL_LINE_HEIGHT;
    let total_height = lines.len() as f32 * line_height;
    let start_y = y - total_height / 2.0 + theme.font_size;
    let mut text = String::new();
    text.push_str(&format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.text_color
    ));
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_height };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("invalid render size {}x{}", render_cfg.width, render_cfg.height))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
