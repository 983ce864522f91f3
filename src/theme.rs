use crate::model::TaskStatus;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub line_color: String,
    pub text_color: String,
    pub change_fill: String,
    pub change_border: String,
    pub task_fill: String,
    pub success_color: String,
    pub failed_color: String,
    pub running_color: String,
    pub pending_color: String,
    pub selected_border: String,
    pub selected_fill: String,
}

impl Theme {
    pub fn dashboard() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            line_color: "#7A8AA6".to_string(),
            text_color: "#1C2430".to_string(),
            change_fill: "#F4F4F5".to_string(),
            change_border: "#C0C4CC".to_string(),
            task_fill: "#FFFFFF".to_string(),
            success_color: "#67C23A".to_string(),
            failed_color: "#F56C6C".to_string(),
            running_color: "#409EFF".to_string(),
            pending_color: "#909399".to_string(),
            selected_border: "#E6A23C".to_string(),
            selected_fill: "#FDF6EC".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#141414".to_string(),
            line_color: "#8C8C8C".to_string(),
            text_color: "#E5EAF3".to_string(),
            change_fill: "#262727".to_string(),
            change_border: "#4C4D4F".to_string(),
            task_fill: "#1D1E1F".to_string(),
            success_color: "#4E8E2F".to_string(),
            failed_color: "#C45656".to_string(),
            running_color: "#337ECC".to_string(),
            pending_color: "#6B6D71".to_string(),
            selected_border: "#EEBE77".to_string(),
            selected_fill: "#292218".to_string(),
        }
    }

    pub fn status_color(&self, status: TaskStatus) -> &str {
        match status {
            TaskStatus::Success => &self.success_color,
            TaskStatus::Failed => &self.failed_color,
            TaskStatus::Running => &self.running_color,
            TaskStatus::Pending => &self.pending_color,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dashboard()
    }
}
