use std::process::ExitCode;

use pad_rumble::domain::interfaces::VibrationDriver;
use pad_rumble::domain::models::MAX_CONTROLLERS;
use pad_rumble::infrastructure::driver::platform_driver;

fn main() -> ExitCode {
    println!("Checking all {} XInput slots (User Index 0-{})...", MAX_CONTROLLERS, MAX_CONTROLLERS - 1);

    let driver = platform_driver();
    let controllers = driver.list_connected_controllers();

    if controllers.is_empty() {
        println!("  No XInput devices found.");
        return ExitCode::FAILURE;
    }

    for controller in controllers {
        println!("  [Slot {}] CONNECTED", controller.index());
    }
    ExitCode::SUCCESS
}
