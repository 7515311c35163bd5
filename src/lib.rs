//! Calendar planner: week-row task layout, linked task groups and the drag
//! gestures that move them.

pub mod app;
pub mod io;
pub mod logging;
pub mod model;
pub mod ui;
