#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::unbounded;
use log::{error, info};

use pad_rumble::domain::models::AppConfig;
use pad_rumble::infrastructure::driver::platform_driver;
use pad_rumble::infrastructure::persistence::{ConfigRepository, FileConfigRepository};
use pad_rumble::interface::gui::VibrationApp;
use pad_rumble::logging::init_logging;
use pad_rumble::usecase::vibration_loop::VibrationController;

fn main() {
    // 1. Setup Logging
    init_logging("pad_rumble.log");
    info!("pad-rumble started");

    // 2. Load Preferences
    let repo_path = FileConfigRepository::default_config_path().unwrap_or_else(|e| {
        error!("Failed to get default config path: {}, falling back to local 'config.json'", e);
        PathBuf::from("config.json")
    });
    info!("Using config path: {:?}", repo_path);
    let repository = FileConfigRepository::new(repo_path);
    let config = repository.load().unwrap_or_else(|e| {
        error!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    // 3. Initialize Driver and Controller
    let driver = Arc::new(platform_driver());
    let (notice_tx, notice_rx) = unbounded();
    let controller = VibrationController::new(driver, config.tick_interval(), notice_tx);

    // 4. Run GUI (blocks main thread)
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([460.0, 620.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Xbox Controller Vibration",
        options,
        Box::new(move |cc| Ok(Box::new(VibrationApp::new(cc, controller, notice_rx, repository, config)))),
    );

    // VibrationApp::on_exit stops the loop and saves preferences.
    if let Err(e) = result {
        error!("GUI exited with error: {}", e);
    }
    info!("Application exited.");
}
