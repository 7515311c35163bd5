//! Date ↔ grid mapping for the week-row calendar.
//!
//! A calendar is a stack of week rows, each seven columns wide. Column 0 is
//! the first day of the locale week; a week's last day is six days later.
//! Everything here is pure.

use chrono::{Datelike, NaiveDate, Weekday};
use egui::{Pos2, Vec2};
use serde::{Deserialize, Serialize};

use super::task::Task;

pub const DAYS_PER_WEEK: i64 = 7;

/// First day of the week for the user's locale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }

    /// Column index (0..7) of `date` within its week.
    pub fn column_of(self, date: NaiveDate) -> i64 {
        match self {
            WeekStart::Monday => date.weekday().num_days_from_monday() as i64,
            WeekStart::Sunday => date.weekday().num_days_from_sunday() as i64,
        }
    }
}

/// Pixel size of one day cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    pub column_width: f32,
    pub row_height: f32,
}

/// A task's horizontal extent inside one week row, in columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekSpan {
    pub start_col: usize,
    /// Inclusive.
    pub end_col: usize,
    /// The task starts before this week.
    pub clipped_start: bool,
    /// The task ends after this week.
    pub clipped_end: bool,
}

impl WeekSpan {
    pub fn overlaps(&self, other: &WeekSpan) -> bool {
        self.start_col.max(other.start_col) <= self.end_col.min(other.end_col)
    }

    pub fn columns(&self) -> usize {
        self.end_col - self.start_col + 1
    }
}

/// The week anchor (first day) of the week containing `date`.
pub fn week_start_of(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    date - chrono::Duration::days(week_start.column_of(date))
}

/// Last day of the week anchored at `anchor`.
pub fn week_end(anchor: NaiveDate) -> NaiveDate {
    anchor + chrono::Duration::days(DAYS_PER_WEEK - 1)
}

/// `date` moved by `days`, or `date` itself if that leaves chrono's range.
pub fn shift_date(date: NaiveDate, days: i64) -> NaiveDate {
    chrono::Duration::try_days(days)
        .and_then(|d| date.checked_add_signed(d))
        .unwrap_or(date)
}

/// Date shown in column `col` of the week anchored at `anchor`.
pub fn date_at(anchor: NaiveDate, col: usize) -> NaiveDate {
    anchor + chrono::Duration::days(col as i64)
}

/// Clamp a task to the week anchored at `anchor`. `None` when the task lies
/// entirely outside the week.
pub fn week_span(task: &Task, anchor: NaiveDate) -> Option<WeekSpan> {
    let last = week_end(anchor);
    if !task.intersects(anchor, last) {
        return None;
    }
    let start = (task.start_date - anchor).num_days().clamp(0, DAYS_PER_WEEK - 1);
    let end = (task.end_date - anchor).num_days().clamp(0, DAYS_PER_WEEK - 1);
    Some(WeekSpan {
        start_col: start as usize,
        end_col: end as usize,
        clipped_start: task.start_date < anchor,
        clipped_end: task.end_date > last,
    })
}

/// Whole days represented by a horizontal pixel delta.
pub fn day_offset(dx: f32, column_width: f32) -> i64 {
    quantize(dx, column_width)
}

/// Whole weeks represented by a vertical pixel delta.
pub fn week_offset(dy: f32, row_height: f32) -> i64 {
    quantize(dy, row_height)
}

/// Day offset of a pointer delta that may cross week rows.
pub fn combined_offset(delta: Vec2, metrics: CellMetrics) -> i64 {
    day_offset(delta.x, metrics.column_width)
        + week_offset(delta.y, metrics.row_height) * DAYS_PER_WEEK
}

fn quantize(delta: f32, unit: f32) -> i64 {
    if unit <= 0.0 || !delta.is_finite() {
        return 0;
    }
    (delta / unit).round() as i64
}

/// Week anchors covering `[start, end]`, in order.
pub fn weeks_in_range(start: NaiveDate, end: NaiveDate, week_start: WeekStart) -> Vec<NaiveDate> {
    let (start, end) = (start.min(end), end.max(start));
    let mut anchor = week_start_of(start, week_start);
    let mut weeks = Vec::new();
    while anchor <= end {
        weeks.push(anchor);
        anchor += chrono::Duration::days(DAYS_PER_WEEK);
    }
    weeks
}

/// One calendar month and the week rows needed to draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<NaiveDate>,
}

impl MonthBucket {
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

/// Split `[start, end]` into calendar months. A week straddling two months
/// appears in both.
pub fn months_in_range(start: NaiveDate, end: NaiveDate, week_start: WeekStart) -> Vec<MonthBucket> {
    let (start, end) = (start.min(end), end.max(start));
    let mut buckets = Vec::new();
    let mut first = NaiveDate::from_ymd_opt(start.year(), start.month(), 1).unwrap_or(start);
    while first <= end {
        let next = next_month(first);
        let last = next.pred_opt().unwrap_or(first);
        buckets.push(MonthBucket {
            year: first.year(),
            month: first.month(),
            weeks: weeks_in_range(first, last, week_start),
        });
        first = next;
    }
    buckets
}

fn next_month(first: NaiveDate) -> NaiveDate {
    let (y, m) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(first + chrono::Duration::days(31))
}

/// Date under `point` in a grid of uniform week rows drawn from `origin`.
pub fn cell_at(origin: Pos2, point: Pos2, metrics: CellMetrics, weeks: &[NaiveDate]) -> Option<NaiveDate> {
    if metrics.column_width <= 0.0 || metrics.row_height <= 0.0 {
        return None;
    }
    let local = point - origin;
    if local.x < 0.0 || local.y < 0.0 {
        return None;
    }
    let col = (local.x / metrics.column_width).floor() as usize;
    let row = (local.y / metrics.row_height).floor() as usize;
    if col >= DAYS_PER_WEEK as usize {
        return None;
    }
    weeks.get(row).map(|anchor| date_at(*anchor, col))
}
