use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::{bounded, unbounded};
use log::{info, warn};

use pad_rumble::domain::interfaces::VibrationDriver;
use pad_rumble::domain::models::VibrationPattern;
use pad_rumble::infrastructure::driver::platform_driver;
use pad_rumble::infrastructure::persistence::{ConfigRepository, FileConfigRepository};
use pad_rumble::logging::init_logging;
use pad_rumble::usecase::intensity::FixedIntensity;
use pad_rumble::usecase::vibration_loop::VibrationController;

/// Headless runner: `rumble_cli [pattern]`. Runs until Ctrl+C.
fn main() -> Result<()> {
    init_logging("pad_rumble_cli.log");

    let repo_path = FileConfigRepository::default_config_path().unwrap_or_else(|_| PathBuf::from("config.json"));
    let config = FileConfigRepository::new(&repo_path)
        .load()
        .with_context(|| format!("Failed to load config from {:?}", repo_path))?;

    let pattern = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<VibrationPattern>().map_err(|e| anyhow!(e))?,
        None => config.pattern,
    };

    let driver = Arc::new(platform_driver());
    let connected = driver.list_connected_controllers();
    let target = match config.target_controller() {
        Some(c) if connected.contains(&c) => Some(c),
        Some(c) => {
            warn!("{} is not connected, using the first connected controller", c);
            connected.first().copied()
        }
        None => connected.first().copied(),
    };

    // Notices already go through the logger; nothing else reads them here.
    let (notice_tx, _) = unbounded();
    let controller = VibrationController::new(driver, config.tick_interval(), notice_tx);
    controller
        .start(target, pattern, Arc::new(FixedIntensity(config.manual_levels())))
        .context("Failed to start vibration")?;

    let (shutdown_tx, shutdown_rx) = bounded(1);
    ctrlc::set_handler(move || {
        info!("Ctrl+C received! Stopping vibration...");
        let _ = shutdown_tx.try_send(());
    })
    .context("Error setting Ctrl-C handler")?;

    info!("Vibrating with pattern {}. Press Ctrl+C to exit.", pattern);
    // The loop stops itself on a driver error; don't wait for Ctrl+C then.
    while controller.is_running() {
        if shutdown_rx.recv_timeout(Duration::from_millis(500)).is_ok() {
            break;
        }
    }

    controller.shutdown();
    info!("Exited gracefully.");
    Ok(())
}
