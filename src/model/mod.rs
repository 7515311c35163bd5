pub mod drag;
pub mod gesture;
pub mod grid;
pub mod group;
pub mod history;
pub mod lanes;
pub mod project;
pub mod schedule;
pub mod selection;
pub mod task;

pub use drag::{DragHandle, DragKind, DragOutcome};
pub use gesture::Gesture;
pub use grid::{CellMetrics, WeekStart};
pub use group::TaskGroup;
pub use history::History;
pub use lanes::TaskFilter;
pub use project::Project;
pub use schedule::{Schedule, ScheduleError, TaskEdit};
pub use selection::{Command, Selection};
pub use task::{ExecutingUnit, Task};
