use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::row::Row;
use super::task::Task;

/// The initial data set a chart is loaded from: rows plus the tasks plotted on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default = "Utc::now")]
    pub modified: DateTime<Utc>,
}

impl Default for ChartData {
    fn default() -> Self {
        Self {
            name: "Untitled Chart".to_string(),
            rows: Vec::new(),
            tasks: Vec::new(),
            modified: Utc::now(),
        }
    }
}

impl ChartData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    /// Earliest start and latest end across all tasks.
    pub fn task_span(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.tasks.iter().map(|t| t.start).min()?;
        let end = self.tasks.iter().map(|t| t.end).max()?;
        Some((start, end))
    }
}
