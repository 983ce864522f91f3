use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Success,
    Failed,
    Running,
    Pending,
}

impl TaskStatus {
    /// Statuses that pull the selection onto a task.
    pub fn needs_attention(self) -> bool {
        matches!(self, Self::Running | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Running => "RUNNING",
            Self::Pending => "PENDING",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub submitter: Contact,
    #[serde(default)]
    pub implementer: Contact,
}

impl Task {
    pub fn new(id: impl Into<String>, status: TaskStatus) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            name: id.clone(),
            id,
            status,
            submitter: Contact::default(),
            implementer: Contact::default(),
        }
    }
}

/// A predecessor or successor change and the current-change tasks it attaches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub links_to: Vec<String>,
}

impl ChangeRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>, links_to: &[&str]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            links_to: links_to.iter().map(|id| id.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentChange {
    #[serde(default)]
    pub id: Option<String>,
    /// Serial steps; tasks inside one step run in parallel.
    #[serde(default)]
    pub tasks: Vec<Vec<Task>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopologyData {
    #[serde(default)]
    pub predecessors: Vec<ChangeRef>,
    #[serde(default)]
    pub current_change: CurrentChange,
    #[serde(default)]
    pub successors: Vec<ChangeRef>,
}

impl TopologyData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_steps(steps: Vec<Vec<Task>>) -> Self {
        Self {
            current_change: CurrentChange { id: None, tasks: steps },
            ..Default::default()
        }
    }

    pub fn steps(&self) -> &[Vec<Task>] {
        &self.current_change.tasks
    }

    /// Tasks flattened in step order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.current_change.tasks.iter().flatten()
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks().find(|task| task.id == id)
    }

    /// First running or failed task, else the first task.
    pub fn selected_task_id(&self) -> Option<&str> {
        self.tasks()
            .find(|task| task.status.needs_attention())
            .or_else(|| self.tasks().next())
            .map(|task| task.id.as_str())
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.selected_task_id().and_then(|id| self.task(id))
    }

    /// `linksTo` entries pointing at no task of the current change, as
    /// `(change id, task id)` pairs in input order.
    pub fn dangling_links(&self) -> Vec<(&str, &str)> {
        let known: HashSet<&str> = self.tasks().map(|task| task.id.as_str()).collect();
        self.predecessors
            .iter()
            .chain(self.successors.iter())
            .flat_map(|change| {
                change
                    .links_to
                    .iter()
                    .map(move |task_id| (change.id.as_str(), task_id.as_str()))
            })
            .filter(|(_, task_id)| !known.contains(task_id))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.predecessors.is_empty() && self.successors.is_empty() && self.tasks().next().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(tasks: &[(&str, TaskStatus)]) -> Vec<Task> {
        tasks.iter().map(|(id, status)| Task::new(*id, *status)).collect()
    }

    #[test]
    fn selection_prefers_failed_or_running() {
        let data = TopologyData::with_steps(vec![step(&[
            ("T1", TaskStatus::Success),
            ("T2", TaskStatus::Failed),
            ("T3", TaskStatus::Pending),
        ])]);
        assert_eq!(data.selected_task_id(), Some("T2"));
        assert_eq!(data.selected_task().map(|t| t.status), Some(TaskStatus::Failed));
    }

    #[test]
    fn selection_falls_back_to_first_task() {
        let data = TopologyData::with_steps(vec![
            step(&[("T1", TaskStatus::Success)]),
            step(&[("T2", TaskStatus::Success)]),
        ]);
        assert_eq!(data.selected_task_id(), Some("T1"));
    }

    #[test]
    fn selection_scans_steps_in_order() {
        let data = TopologyData::with_steps(vec![
            step(&[("T1", TaskStatus::Pending)]),
            step(&[("T2", TaskStatus::Success), ("T3", TaskStatus::Running)]),
            step(&[("T4", TaskStatus::Failed)]),
        ]);
        assert_eq!(data.selected_task_id(), Some("T3"));
    }

    #[test]
    fn no_tasks_means_no_selection() {
        let data = TopologyData::new();
        assert_eq!(data.selected_task_id(), None);
        assert!(data.is_empty());
    }

    #[test]
    fn reports_dangling_links() {
        let mut data = TopologyData::with_steps(vec![step(&[("T1", TaskStatus::Success)])]);
        data.predecessors.push(ChangeRef::new("C1", "pre", &["T1", "T9"]));
        data.successors.push(ChangeRef::new("C2", "post", &["T8"]));
        assert_eq!(data.dangling_links(), vec![("C1", "T9"), ("C2", "T8")]);
    }

    #[test]
    fn deserializes_wire_names() {
        let raw = r#"{
            "predecessors": [{"id": "C1", "name": "a", "linksTo": ["T1"]}],
            "currentChange": {"id": "C2", "tasks": [[{"id": "T1", "status": "RUNNING", "label": "deploy"}]]},
            "successors": []
        }"#;
        let data: TopologyData = serde_json::from_str(raw).unwrap();
        assert_eq!(data.predecessors[0].links_to, vec!["T1".to_string()]);
        assert_eq!(data.current_change.id.as_deref(), Some("C2"));
        assert_eq!(data.task("T1").map(|t| t.label.as_str()), Some("deploy"));
        assert_eq!(data.task("T1").map(|t| t.submitter.clone()), Some(Contact::default()));
    }
}
