use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::GanttConfig;
use crate::hierarchy;
use crate::layout::{self, LayoutSnapshot, TaskFilter, UpdateOutcome};
use crate::model::{
    ChartData, DateRange, Granularity, Row, Task, TaskUpdate, TimeScaleSegment, Timeline,
};

/// Everything the presentation layer needs for one frame, derived in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct GanttSnapshot {
    /// Increments on every recomputation.
    pub revision: u64,
    pub layout: LayoutSnapshot,
    pub segments: Vec<TimeScaleSegment>,
    pub range: DateRange,
    pub granularity: Granularity,
    pub total_width: f64,
    pub selected_task: Option<Uuid>,
    pub selected_row: Option<Uuid>,
}

type Listener = Box<dyn FnMut(&GanttSnapshot)>;

/// Owns the raw rows and tasks plus view settings, and keeps a derived
/// snapshot in step with them.
///
/// Every mutating method recomputes the snapshot before returning, so readers
/// never observe raw state and derived state out of sync.
pub struct GanttStore {
    rows: Vec<Row>,
    tasks: Vec<Task>,
    timeline: Timeline,
    filter: TaskFilter,
    selected_task: Option<Uuid>,
    selected_row: Option<Uuid>,
    config: GanttConfig,
    revision: u64,
    snapshot: GanttSnapshot,
    listeners: Vec<Listener>,
}

impl GanttStore {
    /// Empty store with the configured default range around today.
    pub fn new(config: GanttConfig) -> Self {
        let timeline = Timeline::new(config.timeline.clone());
        Self::with_timeline(config, timeline)
    }

    pub fn with_timeline(config: GanttConfig, timeline: Timeline) -> Self {
        let snapshot = build_snapshot(0, &[], &[], &TaskFilter::All, &timeline, &config, None, None);
        Self {
            rows: Vec::new(),
            tasks: Vec::new(),
            timeline,
            filter: TaskFilter::All,
            selected_task: None,
            selected_row: None,
            config,
            revision: 0,
            snapshot,
            listeners: Vec::new(),
        }
    }

    // --- Reads ---

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn config(&self) -> &GanttConfig {
        &self.config
    }

    pub fn filter(&self) -> &TaskFilter {
        &self.filter
    }

    pub fn snapshot(&self) -> &GanttSnapshot {
        &self.snapshot
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selected_task(&self) -> Option<Uuid> {
        self.selected_task
    }

    pub fn selected_row(&self) -> Option<Uuid> {
        self.selected_row
    }

    /// Tasks whose parent-task chain is fully expanded, in raw order.
    pub fn visible_tasks(&self) -> Vec<&Task> {
        let lookup = hierarchy::build_lookup(&self.tasks);
        hierarchy::resolve_visible(&self.tasks, &lookup)
    }

    /// Receive every newly published snapshot.
    pub fn subscribe(&mut self, listener: impl FnMut(&GanttSnapshot) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // --- Data ---

    /// Replace rows and tasks with a loaded data set.
    pub fn load(&mut self, data: ChartData) {
        self.rows = data.rows;
        self.tasks = data.tasks;
        hierarchy::refresh_depths(&mut self.rows);
        self.clear_stale_selection();
        self.publish();
    }

    /// Current rows and tasks as a data set.
    pub fn to_chart_data(&self, name: impl Into<String>) -> ChartData {
        let mut data = ChartData::new(name);
        data.rows = self.rows.clone();
        data.tasks = self.tasks.clone();
        data
    }

    pub fn set_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        hierarchy::refresh_depths(&mut self.rows);
        self.clear_stale_selection();
        self.publish();
    }

    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
        self.clear_stale_selection();
        self.publish();
    }

    /// Merge a finalized edit (drag, inline rename) by identity.
    pub fn update_task(&mut self, id: Uuid, update: TaskUpdate) -> UpdateOutcome {
        let outcome = layout::apply_update(&mut self.rows, &mut self.tasks, id, &update);
        if outcome.any() {
            self.publish();
        } else {
            log::debug!("update for unknown id {} ignored", id);
        }
        outcome
    }

    /// Remove a row, its descendants and every task plotted on them.
    /// Returns the removed row identities.
    pub fn remove_row(&mut self, id: Uuid) -> Vec<Uuid> {
        if !self.rows.iter().any(|r| r.id == id) {
            return Vec::new();
        }
        let mut removed = hierarchy::descendants_of(id, &self.rows);
        removed.insert(0, id);

        self.rows.retain(|r| !removed.contains(&r.id));
        for row in &mut self.rows {
            if let Some(children) = row.children.as_mut() {
                children.retain(|c| !removed.contains(c));
            }
        }
        self.tasks.retain(|t| !removed.contains(&t.row_id));
        self.clear_stale_selection();
        self.publish();
        removed
    }

    // --- Collapse state ---

    /// Flip a row's expand flag. Returns `false` for unknown rows.
    pub fn toggle_row(&mut self, id: Uuid) -> bool {
        let Some(row) = self.rows.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        row.expanded = !row.expanded;
        self.publish();
        true
    }

    pub fn set_row_expanded(&mut self, id: Uuid, expanded: bool) -> bool {
        let Some(row) = self.rows.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        if row.expanded != expanded {
            row.expanded = expanded;
            self.publish();
        }
        true
    }

    /// Collapse a row and everything below it, so re-expanding it reveals
    /// only its direct children.
    pub fn collapse_row(&mut self, id: Uuid) -> bool {
        if !self.rows.iter().any(|r| r.id == id) {
            return false;
        }
        let mut affected = hierarchy::descendants_of(id, &self.rows);
        affected.push(id);
        for row in self.rows.iter_mut().filter(|r| affected.contains(&r.id)) {
            row.expanded = false;
        }
        self.publish();
        true
    }

    pub fn expand_all(&mut self) {
        self.rows.iter_mut().for_each(|r| r.expanded = true);
        self.publish();
    }

    pub fn collapse_all(&mut self) {
        self.rows.iter_mut().for_each(|r| r.expanded = false);
        self.publish();
    }

    /// Expand flag of a parent task (task-level hierarchies).
    pub fn set_task_expanded(&mut self, id: Uuid, expanded: bool) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        if task.expanded != expanded {
            task.expanded = expanded;
            self.publish();
        }
        true
    }

    // --- Timeline ---

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.timeline.set_granularity(granularity);
        self.publish();
    }

    pub fn set_date_range(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        let before = *self.timeline.range();
        self.timeline.set_range(start, end);
        self.after_timeline_change(before);
    }

    pub fn set_container_width(&mut self, width: Option<f64>) {
        let before = *self.timeline.range();
        self.timeline.set_container_width(width);
        self.after_timeline_change(before);
    }

    pub fn zoom_in(&mut self) -> bool {
        let before = *self.timeline.range();
        let changed = self.timeline.zoom_in();
        if changed {
            self.after_timeline_change(before);
        }
        changed
    }

    pub fn zoom_out(&mut self) -> bool {
        let before = *self.timeline.range();
        let changed = self.timeline.zoom_out();
        if changed {
            self.after_timeline_change(before);
        }
        changed
    }

    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        let before = *self.timeline.range();
        let changed = self.timeline.set_zoom(zoom);
        if changed {
            self.after_timeline_change(before);
        }
        changed
    }

    pub fn scroll_days(&mut self, days: i64) {
        let before = *self.timeline.range();
        self.timeline.scroll_days(days);
        self.after_timeline_change(before);
    }

    /// Fit the range around all tasks with the given padding.
    pub fn fit_range_to_tasks(&mut self, days_before: i64, days_after: i64) -> bool {
        let before = *self.timeline.range();
        let changed = self.timeline.fit_to_tasks(&self.tasks, days_before, days_after);
        if changed {
            self.after_timeline_change(before);
        }
        changed
    }

    // --- Filter & selection ---

    pub fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
        self.publish();
    }

    pub fn select_task(&mut self, id: Option<Uuid>) {
        self.selected_task = id.filter(|id| self.tasks.iter().any(|t| t.id == *id));
        self.publish();
    }

    pub fn select_row(&mut self, id: Option<Uuid>) {
        self.selected_row = id.filter(|id| self.rows.iter().any(|r| r.id == *id));
        self.publish();
    }

    // --- Derivation ---

    /// Cached bar geometry is expressed in the old coordinate system once the
    /// origin or density moves.
    fn after_timeline_change(&mut self, before: DateRange) {
        let after = self.timeline.range();
        if before.start != after.start || before.pixels_per_day != after.pixels_per_day {
            let mut cleared = 0usize;
            for task in self.tasks.iter_mut().filter(|t| t.geometry.is_some()) {
                task.geometry = None;
                cleared += 1;
            }
            if cleared > 0 {
                log::debug!("coordinate system moved, dropped {} cached bars", cleared);
            }
        }
        self.publish();
    }

    fn clear_stale_selection(&mut self) {
        if let Some(id) = self.selected_task {
            if !self.tasks.iter().any(|t| t.id == id) {
                self.selected_task = None;
            }
        }
        if let Some(id) = self.selected_row {
            if !self.rows.iter().any(|r| r.id == id) {
                self.selected_row = None;
            }
        }
    }

    fn publish(&mut self) {
        self.revision += 1;
        self.snapshot = build_snapshot(
            self.revision,
            &self.rows,
            &self.tasks,
            &self.filter,
            &self.timeline,
            &self.config,
            self.selected_task,
            self.selected_row,
        );
        log::debug!(
            "snapshot r{}: {} rows, {} tasks",
            self.revision,
            self.rows.len(),
            self.tasks.len()
        );
        for listener in self.listeners.iter_mut() {
            listener(&self.snapshot);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn build_snapshot(
    revision: u64,
    rows: &[Row],
    tasks: &[Task],
    filter: &TaskFilter,
    timeline: &Timeline,
    config: &GanttConfig,
    selected_task: Option<Uuid>,
    selected_row: Option<Uuid>,
) -> GanttSnapshot {
    GanttSnapshot {
        revision,
        layout: layout::derive_layout(rows, tasks, filter, timeline, &config.layout),
        segments: timeline.scale_segments(),
        range: *timeline.range(),
        granularity: timeline.granularity(),
        total_width: timeline.total_width(),
        selected_task,
        selected_row,
    }
}
