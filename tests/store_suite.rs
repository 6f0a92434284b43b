use std::path::Path;

use chrono::{DateTime, Duration, TimeZone, Utc};
use gantt_core::{
    io, BarAnchor, BarGeometry, GanttConfig, GanttStore, Granularity, Task, TaskFilter,
    TaskUpdate, Timeline, TimelineConfig,
};
use uuid::Uuid;

const PLATFORM: Uuid = Uuid::from_u128(0x01);
const API: Uuid = Uuid::from_u128(0x02);
const UI: Uuid = Uuid::from_u128(0x03);
const WIDGETS: Uuid = Uuid::from_u128(0x04);
const OPS: Uuid = Uuid::from_u128(0x05);

const SCHEMA: Uuid = Uuid::from_u128(0xa1);
const ENDPOINTS: Uuid = Uuid::from_u128(0xa2);
const COMPONENTS: Uuid = Uuid::from_u128(0xa3);
const GO_LIVE: Uuid = Uuid::from_u128(0xa4);
const STRAY: Uuid = Uuid::from_u128(0xa5);

fn utc(m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, m, d, 0, 0, 0).unwrap()
}

/// Q1 2024 (90 days) fitted into 900px, so one day is 10px.
fn roadmap_store() -> GanttStore {
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("roadmap.json");
    let data = io::load_chart(&fixture).expect("fixture load failed");

    let mut timeline = Timeline::with_range(TimelineConfig::default(), utc(1, 1), utc(3, 31));
    timeline.set_container_width(Some(900.0));
    let mut store = GanttStore::with_timeline(GanttConfig::default(), timeline);
    store.load(data);
    store
}

fn visible_row_ids(store: &GanttStore) -> Vec<Uuid> {
    store
        .snapshot()
        .layout
        .visible_rows
        .iter()
        .map(|r| r.row.id)
        .collect()
}

#[test]
fn fixture_derives_expected_layout() {
    let store = roadmap_store();
    let snapshot = store.snapshot();
    assert_eq!(snapshot.range.total_days, 90);
    assert_eq!(snapshot.range.pixels_per_day, 10.0);
    assert_eq!(snapshot.total_width, 900.0);

    assert_eq!(visible_row_ids(&store), vec![PLATFORM, API, UI, OPS]);
    let depths: Vec<_> = snapshot.layout.visible_rows.iter().map(|r| r.depth).collect();
    assert_eq!(depths, [0, 1, 1, 0]);
    let widgets = store.rows().iter().find(|r| r.id == WIDGETS).unwrap();
    assert_eq!(widgets.depth, 2, "depth normalized from parent links");

    let api: Vec<_> = snapshot.layout.tasks_for_row(API).iter().map(|t| t.task.id).collect();
    assert_eq!(api, vec![ENDPOINTS, SCHEMA]);

    let schema = snapshot.layout.task(SCHEMA).unwrap();
    assert_eq!(schema.geometry, BarGeometry::new(140.0, 100.0, BarAnchor::LeftEdge));
    assert_eq!(schema.top, 44.0 + 32.0);

    assert!(snapshot.layout.task(COMPONENTS).is_none(), "row under collapsed UI");
    assert!(snapshot.layout.task(STRAY).is_none(), "row does not exist");
    assert_eq!(snapshot.layout.tasks.len(), 3);

    assert_eq!(snapshot.layout.content_height, 400.0);
    assert_eq!(snapshot.layout.left_panel.len(), 4);
    assert_eq!(snapshot.layout.left_panel[3].title, "Ops");
}

#[test]
fn expanding_collapsed_row_reveals_children_and_their_tasks() {
    let mut store = roadmap_store();
    assert!(store.toggle_row(UI));
    assert_eq!(visible_row_ids(&store), vec![PLATFORM, API, UI, WIDGETS, OPS]);

    let components = store.snapshot().layout.task(COMPONENTS).unwrap();
    assert_eq!(components.geometry.left(), 310.0);
    assert_eq!(components.geometry.width, 190.0);
    assert_eq!(components.row_index, 3);

    store.set_row_expanded(PLATFORM, false);
    assert_eq!(visible_row_ids(&store), vec![PLATFORM, OPS]);
    assert_eq!(store.snapshot().layout.tasks.len(), 1);
}

#[test]
fn cached_geometry_is_stable_across_rederivation() {
    let mut store = roadmap_store();
    let cached = BarGeometry::new(612.5, 31.0, BarAnchor::LeftEdge);
    assert_eq!(store.snapshot().layout.task(GO_LIVE).unwrap().geometry, cached);

    let before = store.snapshot().layout.task(GO_LIVE).unwrap().geometry;
    store.set_filter(TaskFilter::All);
    store.set_granularity(Granularity::Month);
    let after = store.snapshot().layout.task(GO_LIVE).unwrap().geometry;
    assert_eq!(before.offset.to_bits(), after.offset.to_bits());
    assert_eq!(before.width.to_bits(), after.width.to_bits());
}

#[test]
fn moving_the_coordinate_system_drops_cached_geometry() {
    let mut store = roadmap_store();
    store.set_container_width(Some(1800.0));
    let go_live = store.snapshot().layout.task(GO_LIVE).unwrap().geometry;
    // 60 days at 20px, zero-length bar widened to the minimum.
    assert_eq!(go_live, BarGeometry::new(1200.0, 20.0, BarAnchor::LeftEdge));
}

#[test]
fn drag_finalize_flows_through_store() {
    let mut store = roadmap_store();
    let timeline = store.timeline().clone();

    // The gesture side converts pointer positions with the engine's own math.
    let new_start = timeline.pixel_to_date(200.0);
    let new_end = timeline.pixel_to_date(260.0);
    assert_eq!(new_start, utc(1, 21));

    let outcome = store.update_task(ENDPOINTS, TaskUpdate::dates(new_start, new_end));
    assert!(outcome.task);
    let api: Vec<_> = store
        .snapshot()
        .layout
        .tasks_for_row(API)
        .iter()
        .map(|t| t.task.id)
        .collect();
    assert_eq!(api, vec![SCHEMA, ENDPOINTS], "re-sorted by start");
    let endpoints = store.snapshot().layout.task(ENDPOINTS).unwrap();
    assert_eq!(endpoints.geometry.left(), 200.0);
    assert_eq!(endpoints.geometry.width, 60.0);
}

#[test]
fn external_filter_limits_tasks() {
    let mut store = roadmap_store();
    store.set_filter(TaskFilter::only([SCHEMA, COMPONENTS]));
    let ids: Vec<_> = store.snapshot().layout.tasks.iter().map(|t| t.task.id).collect();
    assert_eq!(ids, vec![SCHEMA]);
    assert_eq!(store.snapshot().layout.tasks_for_row(OPS).len(), 0);
}

#[test]
fn segments_tile_range_for_every_granularity() {
    let mut store = roadmap_store();
    for granularity in Granularity::ALL {
        store.set_granularity(granularity);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.granularity, granularity);
        let sum: f64 = snapshot.segments.iter().map(|s| s.width).sum();
        assert!(
            (sum - snapshot.total_width).abs() < 1e-6,
            "{granularity:?}: {sum} != {}",
            snapshot.total_width
        );
    }

    store.set_granularity(Granularity::Month);
    let widths: Vec<_> = store.snapshot().segments.iter().map(|s| s.width).collect();
    assert_eq!(widths, [310.0, 290.0, 300.0]);
}

#[test]
fn round_trip_recovers_dates_within_a_millisecond() {
    let mut store = roadmap_store();
    store.set_container_width(Some(1234.0));
    let timeline = store.timeline();
    let mut date = Utc.with_ymd_and_hms(2023, 12, 1, 7, 13, 0).unwrap();
    while date < utc(5, 1) {
        let back = timeline.pixel_to_date(timeline.date_to_pixel(date));
        assert!((back - date).num_milliseconds().abs() <= 1);
        date += Duration::hours(37);
    }
}

#[test]
fn zoom_only_applies_without_container_width() {
    let mut store = roadmap_store();
    assert!(!store.zoom_in());
    store.set_container_width(None);
    assert_eq!(store.timeline().pixels_per_day(), 80.0);
    assert!(store.zoom_out());
    assert!(store.timeline().pixels_per_day() < 80.0);
}

#[test]
fn visible_window_matches_scroll_position() {
    let store = roadmap_store();
    let (from, to) = store.timeline().visible_date_window(100.0, 310.0);
    assert_eq!(from, utc(1, 11));
    assert_eq!(to, utc(2, 11));
}

#[test]
fn collapsed_parent_task_hides_its_subtasks_in_snapshot() {
    let mut store = roadmap_store();
    let mut tasks = store.tasks().to_vec();
    let mut review = Task::new("Schema review", API, utc(1, 20), utc(1, 22));
    review.parent_id = Some(SCHEMA);
    let review_id = review.id;
    tasks.push(review);
    store.set_tasks(tasks);
    assert_eq!(store.snapshot().layout.tasks_for_row(API).len(), 3);

    assert!(store.set_task_expanded(SCHEMA, false));
    let layout = &store.snapshot().layout;
    assert!(layout.task(review_id).is_none());
    assert!(layout.task(SCHEMA).is_some());
    assert_eq!(layout.tasks_for_row(API).len(), 2);
    assert_eq!(store.visible_tasks().len(), store.tasks().len() - 1);
}

#[test]
fn unusable_config_file_still_yields_a_working_timeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gantt.json");
    std::fs::write(
        &path,
        r#"{ "timeline": { "min_zoom": 5.0, "max_zoom": 0.1, "zoom_step": 0.0, "base_pixels_per_day": -1.0 } }"#,
    )
    .unwrap();
    let config = GanttConfig::load(&path).unwrap();

    let timeline = Timeline::with_range(config.timeline.clone(), utc(1, 1), utc(3, 31));
    let mut store = GanttStore::with_timeline(config, timeline);
    assert_eq!(store.timeline().pixels_per_day(), 80.0);
    assert!(store.zoom_in());
    assert!(store.set_zoom(50.0));
    assert_eq!(store.timeline().zoom(), 5.0);
}

#[test]
fn far_pointer_positions_do_not_panic() {
    let store = roadmap_store();
    let timeline = store.timeline();
    assert_eq!(timeline.pixel_to_date(f64::MAX), DateTime::<Utc>::MAX_UTC);
    assert_eq!(timeline.pixel_to_date(-f64::MAX), DateTime::<Utc>::MIN_UTC);
    let (from, to) = timeline.visible_date_window(-1e18, 2e18);
    assert_eq!((from, to), (DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC));
}
