//! Vizboard - Tabular Data Intake & Interactive Chart Dashboard
//!
//! Load CSV, Excel or text tables (or generate random data), pick columns
//! and render 1D, 2D and 3D charts.

mod charts;
mod config;
mod data;
mod gui;
mod stats;

use config::AppConfig;
use eframe::egui;
use gui::DashboardApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = AppConfig::discover();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1000.0, 650.0])
            .with_title("Vizboard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "Vizboard",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, config)))),
    )
}
