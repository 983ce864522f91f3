#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod flow;
pub mod layout;
pub mod layout_dump;
#[cfg(feature = "cli")]
pub mod logging;
pub mod model;
pub mod parser;
pub mod render;
pub mod session;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, FitConfig, LayoutConfig, RenderConfig, load_config};
pub use flow::{FlowEdge, FlowGraph, FlowNode, flow_elements};
pub use layout::{
    AnchorSource, CurveLink, LayoutEdge, LayoutNode, TopologyLayout, compute_layout, curve_path,
    route_links,
};
pub use model::{ChangeRef, Task, TaskStatus, TopologyData};
pub use parser::{TopologyError, parse_topology};
pub use render::render_svg;
pub use session::{TopologyView, Viewport};
pub use theme::Theme;

/// Parses a JSON topology and renders it to SVG using `config`.
pub fn render_topology_svg(input: &str, config: &Config) -> Result<String, TopologyError> {
    let data = parse_topology(input)?;
    let layout = compute_layout(&data, &config.layout);
    Ok(render_svg(
        &layout,
        &data,
        data.selected_task_id(),
        &config.theme,
        &config.render,
    ))
}
