use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::scale::{self, TimeScaleSegment};
use super::task::Task;
use crate::config::TimelineConfig;

pub(crate) const MS_PER_DAY: f64 = 86_400_000.0;

/// Axis bucketing unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 5] = [
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Quarter,
        Granularity::Year,
    ];
}

/// The active date range and the density derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateRange {
    /// Always UTC midnight.
    pub start: DateTime<Utc>,
    /// UTC midnight at least one day after `start`, unless that would pass
    /// the last representable instant.
    pub end: DateTime<Utc>,
    pub total_days: i64,
    pub pixels_per_day: f64,
}

/// Maps calendar instants to horizontal pixels and back.
///
/// Density is adaptive when a rendering width is known (the range fills the
/// width exactly) and zoom-driven otherwise. Zoom controls are inert in
/// adaptive mode.
#[derive(Debug, Clone)]
pub struct Timeline {
    range: DateRange,
    granularity: Granularity,
    zoom: f64,
    container_width: Option<f64>,
    config: TimelineConfig,
}

impl Timeline {
    /// Default range around today, as configured.
    pub fn new(config: TimelineConfig) -> Self {
        let config = config.sanitized();
        let now = Utc::now();
        let start = shift_days(now, config.days_before_today.saturating_neg());
        let end = shift_days(now, config.days_after_today);
        Self::with_range(config, start, end)
    }

    /// Explicit range. Invalid config values are replaced, see
    /// [`TimelineConfig::sanitized`].
    pub fn with_range(config: TimelineConfig, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let config = config.sanitized();
        let mut timeline = Self {
            range: DateRange {
                start,
                end,
                total_days: 0,
                pixels_per_day: 1.0,
            },
            granularity: config.granularity,
            zoom: 1.0,
            container_width: None,
            config,
        };
        timeline.set_range(start, end);
        timeline
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.range.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.range.end
    }

    pub fn pixels_per_day(&self) -> f64 {
        self.range.pixels_per_day
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn container_width(&self) -> Option<f64> {
        self.container_width
    }

    /// Width-fit density is in effect; zoom requests are ignored.
    pub fn is_adaptive(&self) -> bool {
        matches!(self.container_width, Some(w) if w > 0.0) && self.range.total_days > 0
    }

    // --- Inputs ---

    /// Replace the active range. Instants are floored to UTC midnight; an end
    /// that does not lie after the start is pushed to one day past it.
    pub fn set_range(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) {
        let start = midnight(start);
        let mut end = midnight(end);
        if end <= start {
            log::warn!(
                "degenerate date range {} .. {}, clamping to one day",
                start.date_naive(),
                end.date_naive()
            );
            end = shift_days(start, 1);
        }
        self.range.start = start;
        self.range.end = end;
        self.recompute();
    }

    pub fn set_granularity(&mut self, granularity: Granularity) {
        self.granularity = granularity;
    }

    /// Available rendering width from the layout-measurement side. `None` or a
    /// non-positive width switches back to zoom-driven density.
    pub fn set_container_width(&mut self, width: Option<f64>) {
        self.container_width = width;
        self.recompute();
    }

    /// Zoom in one step. Returns whether anything changed.
    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom * self.config.zoom_step)
    }

    /// Zoom out one step. Returns whether anything changed.
    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom / self.config.zoom_step)
    }

    /// Set the zoom factor, clamped to the configured bounds. No-op in adaptive mode.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if !zoom.is_finite() {
            log::warn!("ignoring non-finite zoom {}", zoom);
            return false;
        }
        if self.is_adaptive() {
            log::debug!("zoom request ignored: density follows container width");
            return false;
        }
        let zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        if zoom == self.zoom {
            return false;
        }
        self.zoom = zoom;
        self.recompute();
        true
    }

    /// Pan the range by a number of days.
    pub fn scroll_days(&mut self, days: i64) {
        let start = shift_days(self.range.start, days);
        let end = shift_days(self.range.end, days);
        self.set_range(start, end);
    }

    /// Fit the range around the given tasks with padding on both sides.
    /// Returns `false` (range untouched) when there are no tasks.
    pub fn fit_to_tasks(&mut self, tasks: &[Task], days_before: i64, days_after: i64) -> bool {
        let (Some(min), Some(max)) = (
            tasks.iter().map(|t| t.start).min(),
            tasks.iter().map(|t| t.end).max(),
        ) else {
            return false;
        };
        self.set_range(
            shift_days(min, days_before.saturating_neg()),
            shift_days(max, days_after),
        );
        true
    }

    fn recompute(&mut self) {
        self.range.total_days = (self.range.end - self.range.start).num_days();
        self.range.pixels_per_day = match self.container_width {
            Some(width) if width > 0.0 && self.range.total_days > 0 => {
                width / self.range.total_days as f64
            }
            _ => (self.config.base_pixels_per_day * self.zoom).max(1.0),
        };
    }

    // --- Conversion ---

    /// Convert an instant to an x-pixel offset from the range start. Instants
    /// outside the range map outside `0..total_width()`.
    pub fn date_to_pixel(&self, date: DateTime<Utc>) -> f64 {
        days_between(self.range.start, date) * self.range.pixels_per_day
    }

    /// Convert an x-pixel offset back to an instant (millisecond precision).
    /// Offsets beyond the representable calendar saturate at its ends; NaN
    /// maps to the range start.
    pub fn pixel_to_date(&self, x: f64) -> DateTime<Utc> {
        let ms = (x / self.range.pixels_per_day * MS_PER_DAY).round();
        if ms.is_nan() {
            return self.range.start;
        }
        Duration::try_milliseconds(ms as i64)
            .and_then(|offset| self.range.start.checked_add_signed(offset))
            .unwrap_or(if ms > 0.0 {
                DateTime::<Utc>::MAX_UTC
            } else {
                DateTime::<Utc>::MIN_UTC
            })
    }

    /// Total width in pixels for the active range.
    pub fn total_width(&self) -> f64 {
        self.range.total_days as f64 * self.range.pixels_per_day
    }

    /// Axis segments for the active granularity.
    pub fn scale_segments(&self) -> Vec<TimeScaleSegment> {
        scale::generate(&self.range, self.granularity)
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.range.start <= instant && instant <= self.range.end
    }

    pub fn is_now_within_range(&self) -> bool {
        self.contains(Utc::now())
    }

    /// Dates covered by a horizontal scroll position and viewport width.
    pub fn visible_date_window(
        &self,
        scroll_offset: f64,
        viewport_width: f64,
    ) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            self.pixel_to_date(scroll_offset),
            self.pixel_to_date(scroll_offset + viewport_width),
        )
    }
}

/// Fractional days from `from` to `to`.
pub fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_DAY
}

/// `instant` moved by whole days, saturating at the calendar bounds.
fn shift_days(instant: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|delta| instant.checked_add_signed(delta))
        .unwrap_or(if days < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

fn midnight(instant: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&instant.date_naive().and_time(NaiveTime::MIN))
}
