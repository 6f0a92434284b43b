pub mod chart;
pub mod row;
pub mod scale;
pub mod task;
pub mod timeline;

pub use chart::ChartData;
pub use row::Row;
pub use scale::TimeScaleSegment;
pub use task::{BarAnchor, BarGeometry, Task, TaskStatus, TaskUpdate};
pub use timeline::{DateRange, Granularity, Timeline};
