//! Engine configuration.
//!
//! Every tunable number used by the timeline and layout stages lives in
//! [`GanttConfig`]. Configs are plain JSON; all fields carry
//! `#[serde(default)]` so a partial file is valid and missing keys fall back
//! to the built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{BarAnchor, Granularity};

// ─── Top-level definition ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanttConfig {
    pub timeline: TimelineConfig,
    pub layout: LayoutConfig,
}

impl GanttConfig {
    /// Load a config from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Location of the per-user config file, if the OS exposes a config dir.
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "hjertis", "gantt-timeline-core")
            .map(|dirs| dirs.config_dir().join("gantt.json"))
    }

    /// Load the per-user config, falling back to defaults when it is absent
    /// or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::user_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("failed to load config {:?}: {}", path, e);
                Self::default()
            }
        }
    }
}

// ─── Timeline ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Density at zoom 1.0 when no rendering width is known.
    pub base_pixels_per_day: f64,
    /// Default range start, relative to today.
    pub days_before_today: i64,
    /// Default range end, relative to today.
    pub days_after_today: i64,
    /// Multiplier applied by one zoom-in / zoom-out step.
    pub zoom_step: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub granularity: Granularity,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            base_pixels_per_day: 80.0,
            days_before_today: 30,
            days_after_today: 150,
            zoom_step: 1.2,
            min_zoom: 0.1,
            max_zoom: 5.0,
            granularity: Granularity::Day,
        }
    }
}

impl TimelineConfig {
    /// Longest default span on either side of today.
    pub const MAX_DEFAULT_DAYS: i64 = 36_500;

    /// Copy with unusable values replaced so the timeline math stays total.
    ///
    /// Non-finite or out-of-range numbers fall back to their defaults, a
    /// zoom step must grow the zoom, and inverted zoom bounds are swapped.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.base_pixels_per_day = checked_or(
            "base_pixels_per_day",
            self.base_pixels_per_day,
            defaults.base_pixels_per_day,
            |v| v > 0.0,
        );
        self.zoom_step = checked_or("zoom_step", self.zoom_step, defaults.zoom_step, |v| v > 1.0);
        self.min_zoom = checked_or("min_zoom", self.min_zoom, defaults.min_zoom, |v| v > 0.0);
        self.max_zoom = checked_or("max_zoom", self.max_zoom, defaults.max_zoom, |v| v > 0.0);
        if self.min_zoom > self.max_zoom {
            log::warn!(
                "min_zoom {} exceeds max_zoom {}, swapping",
                self.min_zoom,
                self.max_zoom
            );
            std::mem::swap(&mut self.min_zoom, &mut self.max_zoom);
        }

        let days = 0..=Self::MAX_DEFAULT_DAYS;
        if !days.contains(&self.days_before_today) || !days.contains(&self.days_after_today) {
            log::warn!(
                "default range {}/{} days out of bounds, clamping",
                self.days_before_today,
                self.days_after_today
            );
            self.days_before_today = self.days_before_today.clamp(0, Self::MAX_DEFAULT_DAYS);
            self.days_after_today = self.days_after_today.clamp(0, Self::MAX_DEFAULT_DAYS);
        }
        self
    }
}

fn checked_or(name: &str, value: f64, default: f64, valid: impl Fn(f64) -> bool) -> f64 {
    if value.is_finite() && valid(value) {
        value
    } else {
        log::warn!("invalid {} {}, using {}", name, value, default);
        default
    }
}

// ─── Layout ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub row_height: f64,
    pub row_spacing: f64,
    /// Space above the first row (the timeline header).
    pub top_padding: f64,
    pub min_content_height: f64,
    /// Bars never get narrower than this, even for zero-length tasks.
    pub min_bar_width: f64,
    /// Offset convention used for freshly positioned bars.
    pub bar_anchor: BarAnchor,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            row_height: 30.0,
            row_spacing: 2.0,
            top_padding: 44.0,
            min_content_height: 400.0,
            min_bar_width: 20.0,
            bar_anchor: BarAnchor::LeftEdge,
        }
    }
}
