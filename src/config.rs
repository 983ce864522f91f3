use crate::theme::Theme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Node geometry and the gaps between columns and stacked nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub node_width: f32,
    pub node_height: f32,
    /// Gap between the predecessor column, the current-change region and the successor column.
    pub group_gap: f32,
    /// Gap between consecutive step columns.
    pub task_group_gap: f32,
    /// Gap between nodes stacked in one column.
    pub task_node_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 150.0,
            node_height: 60.0,
            group_gap: 100.0,
            task_group_gap: 30.0,
            task_node_gap: 20.0,
        }
    }
}

impl LayoutConfig {
    /// Vertical pitch of a stacked column.
    pub fn row_pitch(&self) -> f32 {
        self.node_height + self.task_node_gap
    }

    /// Horizontal pitch between step columns.
    pub fn step_pitch(&self) -> f32 {
        self.node_width + self.task_group_gap
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitConfig {
    pub padding: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub delay: Duration,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            padding: 0.1,
            min_zoom: 0.5,
            max_zoom: 2.0,
            delay: Duration::from_millis(100),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            padding: 24.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub fit: FitConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::dashboard();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            fit: FitConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    line_color: Option<String>,
    change_fill: Option<String>,
    change_border: Option<String>,
    text_color: Option<String>,
    success_color: Option<String>,
    failed_color: Option<String>,
    running_color: Option<String>,
    pending_color: Option<String>,
    selected_border: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    node_width: Option<f32>,
    node_height: Option<f32>,
    group_gap: Option<f32>,
    task_group_gap: Option<f32>,
    task_node_gap: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FitConfigFile {
    padding: Option<f32>,
    min_zoom: Option<f32>,
    max_zoom: Option<f32>,
    delay_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    padding: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    fit: Option<FitConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parsing config file {}", path.display()))
}

/// Applies a JSON config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "dark" => config.theme = Theme::dark(),
            "default" | "dashboard" => config.theme = Theme::dashboard(),
            other => tracing::warn!(theme = other, "unknown theme name, keeping default"),
        }
        config.render.background = config.theme.background.clone();
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.render.background = v.clone();
            config.theme.background = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.change_fill {
            config.theme.change_fill = v;
        }
        if let Some(v) = vars.change_border {
            config.theme.change_border = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.success_color {
            config.theme.success_color = v;
        }
        if let Some(v) = vars.failed_color {
            config.theme.failed_color = v;
        }
        if let Some(v) = vars.running_color {
            config.theme.running_color = v;
        }
        if let Some(v) = vars.pending_color {
            config.theme.pending_color = v;
        }
        if let Some(v) = vars.selected_border {
            config.theme.selected_border = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.node_width {
            config.layout.node_width = v;
        }
        if let Some(v) = layout.node_height {
            config.layout.node_height = v;
        }
        if let Some(v) = layout.group_gap {
            config.layout.group_gap = v;
        }
        if let Some(v) = layout.task_group_gap {
            config.layout.task_group_gap = v;
        }
        if let Some(v) = layout.task_node_gap {
            config.layout.task_node_gap = v;
        }
    }

    if let Some(fit) = parsed.fit {
        if let Some(v) = fit.padding {
            config.fit.padding = v.max(0.0);
        }
        if let Some(v) = fit.min_zoom {
            config.fit.min_zoom = v;
        }
        if let Some(v) = fit.max_zoom {
            config.fit.max_zoom = v;
        }
        if let Some(v) = fit.delay_ms {
            config.fit.delay = Duration::from_millis(v);
        }
        if config.fit.min_zoom > config.fit.max_zoom {
            anyhow::bail!(
                "fit.minZoom ({}) is greater than fit.maxZoom ({})",
                config.fit.min_zoom,
                config.fit.max_zoom
            );
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.width {
            config.render.width = v;
        }
        if let Some(v) = render.height {
            config.render.height = v;
        }
        if let Some(v) = render.padding {
            config.render.padding = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_keeps_defaults() {
        let config = parse_config("{}").unwrap();
        assert_eq!(config.layout.node_width, 150.0);
        assert_eq!(config.layout.task_node_gap, 20.0);
        assert_eq!(config.fit.delay, Duration::from_millis(100));
    }

    #[test]
    fn overrides_geometry_and_theme() {
        let config = parse_config(
            r##"{
                "theme": "dark",
                "themeVariables": {"failedColor": "#FF0000"},
                "layout": {"nodeWidth": 200, "taskGroupGap": 40},
                "fit": {"delayMs": 250}
            }"##,
        )
        .unwrap();
        assert_eq!(config.layout.node_width, 200.0);
        assert_eq!(config.layout.task_group_gap, 40.0);
        assert_eq!(config.layout.node_height, 60.0);
        assert_eq!(config.theme.failed_color, "#FF0000");
        assert_eq!(config.render.background, Theme::dark().background);
        assert_eq!(config.fit.delay, Duration::from_millis(250));
    }

    #[test]
    fn rejects_inverted_zoom_range() {
        let err = parse_config(r#"{"fit": {"minZoom": 3, "maxZoom": 1}}"#).unwrap_err();
        assert!(err.to_string().contains("minZoom"));
    }
}
