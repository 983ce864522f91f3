use crate::model::TopologyData;
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("topology input is empty")]
    Empty,
    #[error("invalid topology JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid topology JSON5: {0}")]
    Json5(#[from] json5::Error),
    #[error("change `{0}` not found in catalog")]
    UnknownChange(String),
    #[error("catalog contains no changes")]
    EmptyCatalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Json5,
}

impl InputFormat {
    pub fn from_extension(ext: &str) -> Self {
        if ext.eq_ignore_ascii_case("json5") {
            Self::Json5
        } else {
            Self::Json
        }
    }
}

/// A set of topologies, one per change, as supplied by the data provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopologyCatalog {
    pub changes: Vec<TopologyData>,
}

impl TopologyCatalog {
    /// Topology for `change_id`, or the first one when no id is given.
    pub fn select(&self, change_id: Option<&str>) -> Result<&TopologyData, TopologyError> {
        match change_id {
            Some(id) => self
                .changes
                .iter()
                .find(|data| data.current_change.id.as_deref() == Some(id))
                .ok_or_else(|| TopologyError::UnknownChange(id.to_string())),
            None => self.changes.first().ok_or(TopologyError::EmptyCatalog),
        }
    }
}

#[derive(Debug, Clone)]
pub enum TopologyDocument {
    Single(TopologyData),
    Catalog(TopologyCatalog),
}

impl TopologyDocument {
    pub fn select(&self, change_id: Option<&str>) -> Result<&TopologyData, TopologyError> {
        match self {
            TopologyDocument::Single(data) => match change_id {
                Some(id) if data.current_change.id.as_deref() != Some(id) => {
                    Err(TopologyError::UnknownChange(id.to_string()))
                }
                _ => Ok(data),
            },
            TopologyDocument::Catalog(catalog) => catalog.select(change_id),
        }
    }
}

pub fn parse_topology(input: &str) -> Result<TopologyData, TopologyError> {
    parse_topology_as(input, InputFormat::Json)
}

pub fn parse_topology_as(input: &str, format: InputFormat) -> Result<TopologyData, TopologyError> {
    let data: TopologyData = decode(input, format)?;
    warn_on_suspicious_ids(&data);
    Ok(data)
}

/// Parses either a single topology or a `{"changes": [...]}` catalog.
pub fn parse_document(input: &str, format: InputFormat) -> Result<TopologyDocument, TopologyError> {
    let value: serde_json::Value = decode(input, format)?;
    if value.get("changes").is_some() {
        let catalog: TopologyCatalog = serde_json::from_value(value)?;
        catalog.changes.iter().for_each(warn_on_suspicious_ids);
        return Ok(TopologyDocument::Catalog(catalog));
    }
    let data: TopologyData = serde_json::from_value(value)?;
    warn_on_suspicious_ids(&data);
    Ok(TopologyDocument::Single(data))
}

fn decode<T>(input: &str, format: InputFormat) -> Result<T, TopologyError>
where
    T: for<'de> Deserialize<'de>,
{
    if input.trim().is_empty() {
        return Err(TopologyError::Empty);
    }
    match format {
        InputFormat::Json => Ok(serde_json::from_str(input)?),
        InputFormat::Json5 => Ok(json5::from_str(input)?),
    }
}

// Duplicate ids and dangling links still lay out; they only make edges ambiguous.
fn warn_on_suspicious_ids(data: &TopologyData) {
    let mut seen = HashSet::new();
    let ids = data
        .predecessors
        .iter()
        .map(|change| change.id.as_str())
        .chain(data.tasks().map(|task| task.id.as_str()))
        .chain(data.successors.iter().map(|change| change.id.as_str()));
    for id in ids {
        if !seen.insert(id) {
            tracing::warn!(id, "duplicate node id in topology");
        }
    }
    for (change, task) in data.dangling_links() {
        tracing::warn!(change, task, "linksTo references an unknown task");
    }
}
