//! Render-ready layout derived from raw rows and tasks.
//!
//! Derivation is total: every call rebuilds the snapshot from scratch out of
//! the raw collections, the filter and the timeline. Nothing here mutates its
//! inputs except [`apply_update`], which merges one edit by identity.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::config::LayoutConfig;
use crate::hierarchy;
use crate::model::{BarAnchor, BarGeometry, Row, Task, TaskUpdate, Timeline};

/// Which tasks the filtering side currently lets through.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum TaskFilter {
    #[default]
    All,
    Only(HashSet<Uuid>),
}

impl TaskFilter {
    pub fn only(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self::Only(ids.into_iter().collect())
    }

    pub fn allows(&self, id: Uuid) -> bool {
        match self {
            Self::All => true,
            Self::Only(ids) => ids.contains(&id),
        }
    }
}

/// A visible row with its derived placement.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleRow {
    pub row: Row,
    /// Index among visible rows, top to bottom.
    pub index: usize,
    pub top: f64,
    pub depth: usize,
    pub has_children: bool,
}

/// A task with its bar placement for this pass.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedTask {
    pub task: Task,
    pub geometry: BarGeometry,
    pub row_index: usize,
    pub top: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSnapshot {
    /// All rows by ordinal position.
    pub sorted_rows: Vec<Row>,
    pub visible_rows: Vec<VisibleRow>,
    /// Visible, filtered tasks in row order, each row's tasks by start.
    pub tasks: Vec<PositionedTask>,
    /// Every visible row has an entry, possibly empty.
    pub tasks_by_row: HashMap<Uuid, Vec<PositionedTask>>,
    /// One title-column placeholder per visible row.
    pub left_panel: Vec<Task>,
    pub content_height: f64,
    pub task_content_height: f64,
    pub anchor: BarAnchor,
}

impl LayoutSnapshot {
    pub fn tasks_for_row(&self, row_id: Uuid) -> &[PositionedTask] {
        self.tasks_by_row
            .get(&row_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn visible_row(&self, row_id: Uuid) -> Option<&VisibleRow> {
        self.visible_rows.iter().find(|r| r.row.id == row_id)
    }

    pub fn task(&self, task_id: Uuid) -> Option<&PositionedTask> {
        self.tasks.iter().find(|t| t.task.id == task_id)
    }
}

/// Bar placement for a task. A cached geometry wins over the dates (it is
/// re-expressed in `anchor` if stored in the other convention).
pub fn position_task(
    task: &Task,
    timeline: &Timeline,
    anchor: BarAnchor,
    min_width: f64,
) -> BarGeometry {
    if let Some(cached) = task.geometry {
        return cached.to_anchor(anchor);
    }
    let left = timeline.date_to_pixel(task.start);
    let width = (timeline.date_to_pixel(task.end) - left).max(min_width);
    BarGeometry::from_left(left, width, anchor)
}

/// Top edge of the visible row at `index`.
pub fn row_top(index: usize, config: &LayoutConfig) -> f64 {
    config.top_padding + index as f64 * (config.row_height + config.row_spacing)
}

pub fn content_height(visible_rows: usize, config: &LayoutConfig) -> f64 {
    let stacked =
        visible_rows as f64 * (config.row_height + config.row_spacing) + config.top_padding;
    stacked.max(config.min_content_height)
}

/// Run the whole pipeline: sort, resolve, filter, position, group, measure.
///
/// A task is placed only when its row is visible and its own parent-task
/// chain is fully expanded.
pub fn derive_layout(
    rows: &[Row],
    tasks: &[Task],
    filter: &TaskFilter,
    timeline: &Timeline,
    config: &LayoutConfig,
) -> LayoutSnapshot {
    let anchor = config.bar_anchor;

    let mut sorted_rows = rows.to_vec();
    sorted_rows.sort_by_key(|r| r.position);

    let lookup = hierarchy::build_lookup(&sorted_rows);
    let visible_rows: Vec<VisibleRow> = hierarchy::resolve_visible(&sorted_rows, &lookup)
        .into_iter()
        .enumerate()
        .map(|(index, row)| VisibleRow {
            row: row.clone(),
            index,
            top: row_top(index, config),
            depth: hierarchy::depth_of(row.id, &lookup),
            has_children: hierarchy::has_children(row.id, &sorted_rows),
        })
        .collect();

    let row_index: HashMap<Uuid, usize> = visible_rows
        .iter()
        .map(|r| (r.row.id, r.index))
        .collect();

    let mut tasks_by_row: HashMap<Uuid, Vec<PositionedTask>> = visible_rows
        .iter()
        .map(|r| (r.row.id, Vec::new()))
        .collect();

    let task_lookup = hierarchy::build_lookup(tasks);
    let expanded_tasks = hierarchy::resolve_visible(tasks, &task_lookup);
    let collapsed = tasks.len() - expanded_tasks.len();

    let mut hidden = 0usize;
    for task in expanded_tasks.into_iter().filter(|t| filter.allows(t.id)) {
        let Some(&index) = row_index.get(&task.row_id) else {
            hidden += 1;
            continue;
        };
        let geometry = position_task(task, timeline, anchor, config.min_bar_width);
        log::trace!(
            "task {} at {:.1} width {:.1} ({:?})",
            task.id,
            geometry.offset,
            geometry.width,
            anchor
        );
        if let Some(bucket) = tasks_by_row.get_mut(&task.row_id) {
            bucket.push(PositionedTask {
                task: task.clone(),
                geometry,
                row_index: index,
                top: row_top(index, config),
            });
        }
    }
    for bucket in tasks_by_row.values_mut() {
        bucket.sort_by_key(|t| t.task.start);
    }

    let positioned: Vec<PositionedTask> = visible_rows
        .iter()
        .flat_map(|r| tasks_by_row[&r.row.id].iter().cloned())
        .collect();

    let placeholder_at = timeline.start();
    let left_panel = visible_rows
        .iter()
        .map(|r| Task::placeholder_for(&r.row, placeholder_at))
        .collect();

    let height = content_height(visible_rows.len(), config);

    log::debug!(
        "layout: {}/{} rows visible, {} tasks placed, {} on hidden rows, {} collapsed",
        visible_rows.len(),
        sorted_rows.len(),
        positioned.len(),
        hidden,
        collapsed
    );

    LayoutSnapshot {
        sorted_rows,
        visible_rows,
        tasks: positioned,
        tasks_by_row,
        left_panel,
        content_height: height,
        task_content_height: height,
        anchor,
    }
}

/// Which collections an [`apply_update`] call touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub task: bool,
    pub row: bool,
}

impl UpdateOutcome {
    pub fn any(&self) -> bool {
        self.task || self.row
    }
}

/// Merge an edit into the task with identity `id` and, for title-column
/// edits, into the row with the same identity. All other entities are left
/// untouched.
pub fn apply_update(
    rows: &mut [Row],
    tasks: &mut [Task],
    id: Uuid,
    update: &TaskUpdate,
) -> UpdateOutcome {
    let mut outcome = UpdateOutcome::default();
    if let Some(task) = tasks.iter_mut().find(|t| t.id == id) {
        update.apply_to_task(task);
        outcome.task = true;
    }
    if let Some(row) = rows.iter_mut().find(|r| r.id == id) {
        update.apply_to_row(row);
        outcome.row = true;
    }
    outcome
}
