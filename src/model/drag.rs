//! Pointer drags on calendar tasks: move (whole linked group) and resize.
//!
//! A [`DragHandle`] is created on pointer-down, fed pointer positions while
//! the button is held, and consumed on release. It never touches the
//! committed schedule; every update yields a working copy built from a
//! snapshot taken at pointer-down.

use chrono::NaiveDate;
use egui::Pos2;
use uuid::Uuid;

use super::grid::{combined_offset, day_offset, shift_date, CellMetrics};
use super::schedule::Schedule;

/// Pointer travel (px, per axis) below which a press is still a click.
pub const DEFAULT_DRAG_THRESHOLD: f32 = 3.0;

/// Which part of a task bar the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    /// Body: translate the task and everything linked to it.
    Move,
    /// Left edge.
    ResizeStart,
    /// Right edge.
    ResizeEnd,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DragError {
    #[error("cannot drag unknown task {0}")]
    TaskNotFound(Uuid),
}

/// Dates of one task at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSnapshot {
    pub id: Uuid,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// How a gesture ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// The pointer travelled past the threshold; this is the new schedule.
    Committed(Schedule),
    /// Released before the threshold: treat as a click on the task.
    Click(Uuid),
}

/// A live drag gesture.
#[derive(Debug, Clone)]
pub struct DragHandle {
    task_id: Uuid,
    kind: DragKind,
    origin: Pos2,
    metrics: CellMetrics,
    threshold: f32,
    related: Vec<DragSnapshot>,
    base: Schedule,
    working: Schedule,
    offset: i64,
    started: bool,
}

impl DragHandle {
    /// Start a gesture on `task_id`, reading its dates (and for a move, its
    /// group's membership) from `live`.
    pub fn begin(
        task_id: Uuid,
        kind: DragKind,
        origin: Pos2,
        metrics: CellMetrics,
        live: &Schedule,
    ) -> Result<Self, DragError> {
        let task = live.task(task_id).ok_or(DragError::TaskNotFound(task_id))?;
        let related: Vec<DragSnapshot> = match kind {
            DragKind::Move => live
                .related_tasks(task_id)
                .into_iter()
                .map(|t| DragSnapshot {
                    id: t.id,
                    start: t.start_date,
                    end: t.end_date,
                })
                .collect(),
            DragKind::ResizeStart | DragKind::ResizeEnd => vec![DragSnapshot {
                id: task.id,
                start: task.start_date,
                end: task.end_date,
            }],
        };
        tracing::debug!(task = %task_id, ?kind, related = related.len(), "drag started");

        Ok(Self {
            task_id,
            kind,
            origin,
            metrics,
            threshold: DEFAULT_DRAG_THRESHOLD,
            related,
            base: live.clone(),
            working: live.clone(),
            offset: 0,
            started: false,
        })
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold.max(0.0);
        self
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    pub fn kind(&self) -> DragKind {
        self.kind
    }

    /// Tasks the gesture moves, as they were at pointer-down.
    pub fn related(&self) -> &[DragSnapshot] {
        &self.related
    }

    pub fn moves(&self, task_id: Uuid) -> bool {
        self.related.iter().any(|s| s.id == task_id)
    }

    /// Days applied by the latest update.
    pub fn offset_days(&self) -> i64 {
        self.offset
    }

    /// The pointer has travelled past the click threshold.
    pub fn is_dragging(&self) -> bool {
        self.started
    }

    /// Schedule to render while the gesture is live.
    pub fn working(&self) -> &Schedule {
        &self.working
    }

    /// Feed the current pointer position and return the working copy.
    pub fn update(&mut self, pointer: Pos2) -> &Schedule {
        let delta = pointer - self.origin;
        if !self.started && delta.x.abs() < self.threshold && delta.y.abs() < self.threshold {
            return &self.working;
        }
        self.started = true;

        let offset = self.clamp_offset(match self.kind {
            DragKind::Move => combined_offset(delta, self.metrics),
            DragKind::ResizeStart | DragKind::ResizeEnd => day_offset(delta.x, self.metrics.column_width),
        });
        if offset != self.offset {
            self.offset = offset;
            self.working = self.project(offset);
        }
        &self.working
    }

    /// Clamp `offset` to what every snapshot can take without leaving
    /// chrono's date range or crossing its own opposite edge, so the related
    /// set always shifts by one shared amount.
    fn clamp_offset(&self, offset: i64) -> i64 {
        let (mut lo, mut hi) = (i64::MIN, i64::MAX);
        for snap in &self.related {
            let to_min = (NaiveDate::MIN - snap.start).num_days();
            let to_max = (NaiveDate::MAX - snap.end).num_days();
            let span = (snap.end - snap.start).num_days();
            let (snap_lo, snap_hi) = match self.kind {
                DragKind::Move => (to_min, to_max),
                DragKind::ResizeStart => (to_min, span),
                DragKind::ResizeEnd => (-span, to_max),
            };
            lo = lo.max(snap_lo);
            hi = hi.min(snap_hi);
        }
        if lo > hi {
            return 0;
        }
        offset.clamp(lo, hi)
    }

    /// The base schedule with `offset` applied to the related set.
    pub fn project(&self, offset: i64) -> Schedule {
        let offset = self.clamp_offset(offset);
        let mut next = self.base.clone();
        for snap in &self.related {
            let (start, end) = match self.kind {
                DragKind::Move => {
                    let start = shift_date(snap.start, offset);
                    (start, shift_date(start, (snap.end - snap.start).num_days()))
                }
                DragKind::ResizeStart => (shift_date(snap.start, offset).min(snap.end), snap.end),
                DragKind::ResizeEnd => (snap.start, shift_date(snap.end, offset).max(snap.start)),
            };
            next.set_dates(snap.id, start, end);
        }
        next
    }

    /// Finish the gesture on pointer release.
    pub fn commit(self) -> DragOutcome {
        if !self.started {
            return DragOutcome::Click(self.task_id);
        }
        tracing::info!(
            task = %self.task_id,
            kind = ?self.kind,
            days = self.offset,
            tasks = self.related.len(),
            "drag committed"
        );
        DragOutcome::Committed(self.working)
    }
}
