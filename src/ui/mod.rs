pub mod calendar_view;
pub mod dialogs;
pub mod inspector;
pub mod task_list;
pub mod theme;
pub mod toolbar;
