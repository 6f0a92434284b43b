use chrono::{DateTime, Utc};
use egui::Color32;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::row::Row;

/// Workflow status of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    Released,
    InProgress,
    Finished,
}

impl TaskStatus {
    /// Map a free-form status label to a status. Unknown labels are `NotStarted`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "finished" | "done" | "complete" | "completed" => Self::Finished,
            "in progress" | "in-progress" | "in_progress" | "active" | "started" => {
                Self::InProgress
            }
            "released" | "planned" => Self::Released,
            _ => Self::NotStarted,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::Released => "Released",
            Self::InProgress => "In Progress",
            Self::Finished => "Finished",
        }
    }
}

/// Which point of a bar its stored horizontal offset refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarAnchor {
    #[default]
    LeftEdge,
    Center,
}

/// Horizontal placement of a task bar in timeline pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    pub offset: f64,
    pub width: f64,
    pub anchor: BarAnchor,
}

impl BarGeometry {
    pub fn new(offset: f64, width: f64, anchor: BarAnchor) -> Self {
        Self {
            offset,
            width,
            anchor,
        }
    }

    /// Build a geometry from a bar's left edge, storing the offset in `anchor`'s convention.
    pub fn from_left(left: f64, width: f64, anchor: BarAnchor) -> Self {
        let offset = match anchor {
            BarAnchor::LeftEdge => left,
            BarAnchor::Center => left + width / 2.0,
        };
        Self::new(offset, width, anchor)
    }

    pub fn left(&self) -> f64 {
        match self.anchor {
            BarAnchor::LeftEdge => self.offset,
            BarAnchor::Center => self.offset - self.width / 2.0,
        }
    }

    pub fn right(&self) -> f64 {
        self.left() + self.width
    }

    pub fn center(&self) -> f64 {
        self.left() + self.width / 2.0
    }

    /// Same bar, offset expressed in another convention. Identity when the
    /// anchor already matches.
    pub fn to_anchor(self, anchor: BarAnchor) -> Self {
        if self.anchor == anchor {
            self
        } else {
            Self::from_left(self.left(), self.width, anchor)
        }
    }
}

/// A time-boxed bar plotted against a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: TaskStatus,
    /// The row this task is plotted against.
    pub row_id: Uuid,
    /// Parent task, for task-level hierarchies.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default = "default_expanded")]
    pub expanded: bool,
    /// Cached bar placement. Cleared whenever the dates change unless the
    /// editor supplies a fresher value alongside them.
    #[serde(default)]
    pub geometry: Option<BarGeometry>,
    #[serde(with = "hex_color", default = "default_color")]
    pub color: Color32,
}

fn default_expanded() -> bool {
    true
}

fn default_color() -> Color32 {
    Color32::from_rgb(70, 130, 180) // Steel blue
}

impl Task {
    /// Create a new task with sensible defaults.
    pub fn new(
        title: impl Into<String>,
        row_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            start,
            end,
            category: String::new(),
            status: TaskStatus::NotStarted,
            row_id,
            parent_id: None,
            expanded: true,
            geometry: None,
            color: default_color(),
        }
    }

    /// Title-column stand-in for a row: carries the row's identity and metadata
    /// with zero-length dates at `at`.
    pub fn placeholder_for(row: &Row, at: DateTime<Utc>) -> Self {
        Self {
            id: row.id,
            title: row.title.clone(),
            start: at,
            end: at,
            category: row.category.clone(),
            status: TaskStatus::NotStarted,
            row_id: row.id,
            parent_id: row.parent_id,
            expanded: row.expanded,
            geometry: None,
            color: default_color(),
        }
    }

    /// Move the task to new dates, dropping the now stale cached geometry.
    pub fn set_dates(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        if self.start != start || self.end != end {
            self.geometry = None;
        }
        self.start = start;
        self.end = end;
    }

    pub fn duration_days(&self) -> f64 {
        (self.end - self.start).num_milliseconds() as f64 / 86_400_000.0
    }
}

/// A finalized edit to a task, delivered by identity. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub status: Option<TaskStatus>,
    pub row_id: Option<Uuid>,
    pub color: Option<Color32>,
    /// Pixel placement already computed by the editor (e.g. a finished drag).
    pub geometry: Option<BarGeometry>,
}

impl TaskUpdate {
    pub fn dates(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_geometry(mut self, geometry: BarGeometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    pub fn apply_to_task(&self, task: &mut Task) {
        let start = self.start.unwrap_or(task.start);
        let end = self.end.unwrap_or(task.end);
        task.set_dates(start, end);
        if let Some(geometry) = self.geometry {
            task.geometry = Some(geometry);
        }
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(category) = &self.category {
            task.category = category.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(row_id) = self.row_id {
            task.row_id = row_id;
        }
        if let Some(color) = self.color {
            task.color = color;
        }
    }

    /// Title-column edits land on the row sharing the task's identity.
    pub fn apply_to_row(&self, row: &mut Row) {
        if let Some(title) = &self.title {
            row.title = title.clone();
        }
        if let Some(category) = &self.category {
            row.category = category.clone();
        }
    }
}

/// Serde helper storing `Color32` as a `#RRGGBB` / `#RRGGBBAA` string.
pub mod hex_color {
    use egui::Color32;
    use serde::{self, Deserialize, Deserializer, Serializer};

    use crate::error::GanttError;

    pub fn serialize<S>(color: &Color32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&to_hex(*color))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Color32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_hex_color(&s).map_err(serde::de::Error::custom)
    }

    pub fn to_hex(color: Color32) -> String {
        let [r, g, b, a] = color.to_array();
        if a == 255 {
            format!("#{:02X}{:02X}{:02X}", r, g, b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
        }
    }

    pub fn parse_hex_color(s: &str) -> Result<Color32, GanttError> {
        let digits = s.trim().trim_start_matches('#');
        let invalid = || GanttError::InvalidColor(s.to_string());
        if !digits.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| invalid());
        match digits.len() {
            6 => Ok(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Ok(Color32::from_rgba_unmultiplied(
                channel(0)?,
                channel(2)?,
                channel(4)?,
                channel(6)?,
            )),
            _ => Err(invalid()),
        }
    }
}
