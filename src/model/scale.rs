//! Axis segments for each granularity.
//!
//! Buckets follow the calendar exactly (Monday weeks, real month, quarter and
//! year lengths). Buckets straddling either end of the range are clipped to
//! it, so the segments tile `0..total_width` with no gaps or overlap.

use chrono::{Datelike, Duration, Months, NaiveDate};

use super::timeline::{DateRange, Granularity};

/// One labelled bucket of the time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeScaleSegment {
    pub granularity: Granularity,
    pub label: String,
    /// Calendar start of the bucket, possibly before the range start.
    pub start: NaiveDate,
    pub left: f64,
    pub width: f64,
}

pub fn generate(range: &DateRange, granularity: Granularity) -> Vec<TimeScaleSegment> {
    let range_start = range.start.date_naive();
    let range_end = range.end.date_naive();
    let ppd = range.pixels_per_day;

    let mut segments = Vec::new();
    let mut bucket = floor_to(range_start, granularity);
    while bucket < range_end {
        let Some(next) = next_bucket(bucket, granularity) else {
            break;
        };
        let from = bucket.max(range_start);
        let to = next.min(range_end);
        segments.push(TimeScaleSegment {
            granularity,
            label: label_for(bucket, granularity),
            start: bucket,
            left: (from - range_start).num_days() as f64 * ppd,
            width: (to - from).num_days() as f64 * ppd,
        });
        bucket = next;
    }
    segments
}

/// Start of the bucket containing `date`.
fn floor_to(date: NaiveDate, granularity: Granularity) -> NaiveDate {
    match granularity {
        Granularity::Day => date,
        Granularity::Week => {
            let back = Duration::days(date.weekday().num_days_from_monday() as i64);
            date.checked_sub_signed(back).unwrap_or(date)
        }
        Granularity::Month => date.with_day(1).unwrap_or(date),
        Granularity::Quarter => {
            let month = (date.month0() / 3) * 3 + 1;
            NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
        }
        Granularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
    }
}

fn next_bucket(bucket: NaiveDate, granularity: Granularity) -> Option<NaiveDate> {
    match granularity {
        Granularity::Day => bucket.checked_add_signed(Duration::days(1)),
        Granularity::Week => bucket.checked_add_signed(Duration::days(7)),
        Granularity::Month => bucket.checked_add_months(Months::new(1)),
        Granularity::Quarter => bucket.checked_add_months(Months::new(3)),
        Granularity::Year => bucket.checked_add_months(Months::new(12)),
    }
}

fn label_for(bucket: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Day | Granularity::Week => bucket.format("%m/%d").to_string(),
        Granularity::Month => bucket.format("%Y/%m").to_string(),
        Granularity::Quarter => format!("{} Q{}", bucket.year(), bucket.month0() / 3 + 1),
        Granularity::Year => bucket.year().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimelineConfig;
    use crate::model::Timeline;
    use chrono::{TimeZone, Utc};

    fn timeline(from: (i32, u32, u32), to: (i32, u32, u32), width: f64) -> Timeline {
        let mut timeline = Timeline::with_range(
            TimelineConfig::default(),
            Utc.with_ymd_and_hms(from.0, from.1, from.2, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(to.0, to.1, to.2, 0, 0, 0).unwrap(),
        );
        timeline.set_container_width(Some(width));
        timeline
    }

    fn assert_tiles(timeline: &Timeline, segments: &[TimeScaleSegment]) {
        let mut cursor = 0.0;
        for segment in segments {
            assert!((segment.left - cursor).abs() < 1e-6, "gap before {}", segment.label);
            assert!(segment.width > 0.0);
            cursor = segment.left + segment.width;
        }
        let sum: f64 = segments.iter().map(|s| s.width).sum();
        let expected = timeline.range().total_days as f64 * timeline.pixels_per_day();
        assert!((sum - expected).abs() < 1e-6, "{sum} != {expected}");
    }

    #[test]
    fn every_granularity_tiles_the_range() {
        let mut timeline = timeline((2023, 11, 15), (2025, 2, 9), 1234.5);
        for granularity in Granularity::ALL {
            timeline.set_granularity(granularity);
            let segments = timeline.scale_segments();
            assert!(!segments.is_empty());
            assert_tiles(&timeline, &segments);
        }
    }

    #[test]
    fn day_segments_one_per_day() {
        let timeline = timeline((2024, 1, 1), (2024, 1, 31), 300.0);
        let segments = generate(timeline.range(), Granularity::Day);
        assert_eq!(segments.len(), 30);
        assert_eq!(segments[0].label, "01/01");
        assert_eq!(segments[10].left, 100.0);
        assert!(segments.iter().all(|s| s.width == 10.0));
    }

    #[test]
    fn weeks_anchor_on_monday() {
        // 2024-01-03 is a Wednesday.
        let timeline = timeline((2024, 1, 3), (2024, 1, 31), 280.0);
        let segments = generate(timeline.range(), Granularity::Week);
        assert_eq!(segments[0].start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(segments[0].label, "01/01");
        assert_eq!(segments[0].width, 50.0);
        assert_eq!(segments[1].start, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(segments[1].width, 70.0);
    }

    #[test]
    fn february_of_leap_year_has_29_days() {
        let timeline = timeline((2024, 1, 1), (2024, 4, 1), 910.0);
        let ppd = timeline.pixels_per_day();
        let segments = generate(timeline.range(), Granularity::Month);
        let labels: Vec<_> = segments.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["2024/01", "2024/02", "2024/03"]);
        assert!((segments[1].width - ppd * 29.0).abs() < 1e-9);
        assert!((segments[0].width - ppd * 31.0).abs() < 1e-9);
    }

    #[test]
    fn quarters_follow_calendar_lengths() {
        let timeline = timeline((2024, 1, 1), (2025, 1, 1), 366.0);
        let segments = generate(timeline.range(), Granularity::Quarter);
        let labels: Vec<_> = segments.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["2024 Q1", "2024 Q2", "2024 Q3", "2024 Q4"]);
        let widths: Vec<_> = segments.iter().map(|s| s.width).collect();
        assert_eq!(widths, [91.0, 91.0, 92.0, 92.0]);
    }

    #[test]
    fn years_are_leap_aware() {
        let timeline = timeline((2023, 1, 1), (2025, 1, 1), 731.0);
        let segments = generate(timeline.range(), Granularity::Year);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].label, "2023");
        assert_eq!(segments[0].width, 365.0);
        assert_eq!(segments[1].width, 366.0);
        assert_eq!(segments[1].left, 365.0);
    }

    #[test]
    fn partial_buckets_are_clipped() {
        let timeline = timeline((2024, 2, 20), (2024, 3, 10), 19.0);
        let segments = generate(timeline.range(), Granularity::Month);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(segments[0].left, 0.0);
        assert_eq!(segments[0].width, 10.0);
        assert_eq!(segments[1].width, 9.0);
    }
}
