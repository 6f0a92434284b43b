//! Timeline, hierarchy and layout engine behind an interactive Gantt chart.
//!
//! The crate draws nothing. It resolves which rows are visible under the
//! current collapse state, maps dates to pixels for the selected granularity
//! and zoom, and derives a render-ready snapshot that a UI layer paints.
//!
//! ```no_run
//! use gantt_core::{GanttConfig, GanttStore, Granularity};
//!
//! let mut store = GanttStore::new(GanttConfig::load_or_default());
//! store.load(gantt_core::io::load_chart("plan.json".as_ref())?);
//! store.set_container_width(Some(1200.0));
//! store.set_granularity(Granularity::Week);
//! for bar in &store.snapshot().layout.tasks {
//!     println!("{} @ {:.0}px", bar.task.title, bar.geometry.left());
//! }
//! # Ok::<(), gantt_core::GanttError>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod hierarchy;
pub mod io;
pub mod layout;
pub mod model;
pub mod store;

pub use config::{GanttConfig, LayoutConfig, TimelineConfig};
pub use context::GanttContext;
pub use error::{GanttError, Result};
pub use hierarchy::Hierarchical;
pub use layout::{derive_layout, LayoutSnapshot, PositionedTask, TaskFilter, VisibleRow};
pub use model::{
    BarAnchor, BarGeometry, ChartData, DateRange, Granularity, Row, Task, TaskStatus,
    TaskUpdate, TimeScaleSegment, Timeline,
};
pub use store::{GanttSnapshot, GanttStore};
