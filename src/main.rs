#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use rust_calendar_app::{app, logging};

fn main() -> eframe::Result<()> {
    logging::init_logging();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 500.0])
            .with_title("Rust Calendar App"),
        ..Default::default()
    };

    eframe::run_native(
        "Rust Calendar App",
        options,
        Box::new(|cc| Ok(Box::new(app::CalendarApp::new(cc)))),
    )
}
