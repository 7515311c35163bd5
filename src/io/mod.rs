pub mod csv_export;
pub mod file;
pub mod markdown_export;
pub mod settings;

pub use file::{load_project, save_project, ProjectIoError};
pub use settings::AppSettings;
