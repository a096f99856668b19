use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver};
use log::Level;

use crate::domain::errors::{DriverError, VibrationError};
use crate::domain::models::{ControllerHandle, LoopState, MotorLevels, VibrationPattern, MOTOR_MAX};
use crate::domain::patterns::WAVE_FLOOR;
use crate::infrastructure::driver::MockDriver;
use crate::usecase::intensity::SliderIntensity;
use crate::usecase::notices::Notice;
use crate::usecase::vibration_loop::VibrationController;

fn controller_with(
    driver: MockDriver,
) -> (Arc<MockDriver>, VibrationController<MockDriver>, Receiver<Notice>) {
    let driver = Arc::new(driver);
    let (tx, rx) = unbounded();
    let controller = VibrationController::new(driver.clone(), Duration::from_millis(1), tx);
    (driver, controller, rx)
}

fn pad(index: u32) -> Option<ControllerHandle> {
    ControllerHandle::new(index)
}

fn sliders(left: u16, right: u16) -> Arc<SliderIntensity> {
    Arc::new(SliderIntensity::new(MotorLevels::new(left, right)))
}

fn wait_for_calls(driver: &MockDriver, count: usize) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while driver.call_count() < count {
        assert!(Instant::now() < deadline, "driver never reached {} calls", count);
        thread::sleep(Duration::from_millis(1));
    }
}

fn messages(rx: &Receiver<Notice>) -> Vec<Notice> {
    rx.try_iter().collect()
}

#[test]
fn test_pulse_scenario_twenty_five_ticks_then_stop() {
    // Park the 25th write so exactly 25 ticks happen before stop.
    let (driver, pause) = MockDriver::new(vec![0]).pausing_at(24);
    let (driver, controller, _rx) = controller_with(driver);
    let controller = Arc::new(controller);

    controller
        .start(pad(0), VibrationPattern::Pulse, sliders(0, 0))
        .unwrap();
    pause.wait_reached();

    let stopper = {
        let controller = controller.clone();
        thread::spawn(move || controller.stop())
    };
    while controller.is_running() {
        thread::yield_now();
    }
    pause.resume();
    assert_eq!(stopper.join().unwrap(), Ok(()));

    let calls = driver.calls();
    assert_eq!(calls.len(), 26);
    assert!(calls.iter().all(|(c, _)| c.index() == 0));

    let levels: Vec<u16> = calls.iter().map(|(_, l)| l.left).collect();
    let mut expected = vec![MOTOR_MAX; 10];
    expected.extend(vec![0; 10]);
    expected.extend(vec![MOTOR_MAX; 5]);
    expected.push(0);
    assert_eq!(levels, expected);
    assert!(calls.iter().all(|(_, l)| l.left == l.right));
    assert_eq!(calls.last().unwrap().1, MotorLevels::OFF);
}

#[test]
fn test_start_without_controller_is_rejected() {
    let (driver, controller, rx) = controller_with(MockDriver::new(vec![0]));

    let result = controller.start(None, VibrationPattern::Manual, sliders(100, 100));

    assert_eq!(result, Err(VibrationError::InvalidSelection));
    assert_eq!(controller.state(), LoopState::Stopped);
    assert_eq!(driver.call_count(), 0);
    let notices = messages(&rx);
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, Level::Warn);
    assert_eq!(notices[0].message, "No controller selected.");
}

#[test]
fn test_start_while_running_is_rejected() {
    let (driver, controller, rx) = controller_with(MockDriver::new(vec![1]));

    controller.start(pad(1), VibrationPattern::Manual, sliders(5, 6)).unwrap();
    let second = controller.start(pad(1), VibrationPattern::Wave, sliders(0, 0));
    assert_eq!(second, Err(VibrationError::AlreadyRunning));

    wait_for_calls(&driver, 3);
    controller.stop().unwrap();

    // Only the first loop ran: every tick wrote the manual sliders.
    let calls = driver.calls();
    let (last, ticks) = calls.split_last().unwrap();
    assert_eq!(last.1, MotorLevels::OFF);
    assert!(ticks.iter().all(|(_, l)| *l == MotorLevels::new(5, 6)));
    assert!(messages(&rx).iter().any(|n| n.message == "Vibration is already running."));
}

#[test]
fn test_stop_is_idempotent() {
    let (driver, controller, rx) = controller_with(MockDriver::new(vec![0]));

    controller.start(pad(0), VibrationPattern::Manual, sliders(1000, 2000)).unwrap();
    wait_for_calls(&driver, 2);

    assert_eq!(controller.stop(), Ok(()));
    let after_first = driver.call_count();
    assert_eq!(driver.calls().last().unwrap().1, MotorLevels::OFF);

    assert_eq!(controller.stop(), Err(VibrationError::AlreadyStopped));
    assert_eq!(driver.call_count(), after_first);

    let notices = messages(&rx);
    assert!(notices.iter().any(|n| n.message == "Stopping vibration of Controller 0"));
    assert_eq!(notices.last().unwrap().message, "Vibration is already stopped.");
}

#[test]
fn test_stop_before_start_reports_already_stopped() {
    let (driver, controller, _rx) = controller_with(MockDriver::new(vec![0]));
    assert_eq!(controller.stop(), Err(VibrationError::AlreadyStopped));
    assert_eq!(driver.call_count(), 0);
}

#[test]
fn test_slider_changes_reach_the_driver() {
    let (driver, controller, _rx) = controller_with(MockDriver::new(vec![0]));
    let intensity = sliders(0, 0);

    controller.start(pad(0), VibrationPattern::Manual, intensity.clone()).unwrap();
    wait_for_calls(&driver, 1);
    intensity.set_left(40000);
    intensity.set_right(12);

    let deadline = Instant::now() + Duration::from_secs(5);
    while controller.status().last_levels != MotorLevels::new(40000, 12) {
        assert!(Instant::now() < deadline, "slider update never observed");
        thread::sleep(Duration::from_millis(1));
    }
    controller.stop().unwrap();
}

#[test]
fn test_wave_ticks_stay_in_band() {
    let (driver, controller, _rx) = controller_with(MockDriver::new(vec![3]));

    controller.start(pad(3), VibrationPattern::Wave, sliders(0, 0)).unwrap();
    wait_for_calls(&driver, 40);
    controller.stop().unwrap();

    let calls = driver.calls();
    let (_, ticks) = calls.split_last().unwrap();
    for (_, levels) in ticks {
        assert!(levels.left >= WAVE_FLOOR);
        assert_eq!(levels.left, levels.right);
    }
}

#[test]
fn test_driver_failure_stops_loop_and_rests_controller() {
    let driver = MockDriver::new(vec![2]).failing_from(3, 1167);
    let (driver, controller, rx) = controller_with(driver);

    controller.start(pad(2), VibrationPattern::Pulse, sliders(0, 0)).unwrap();

    let deadline = Instant::now() + Duration::from_secs(5);
    while controller.is_running() {
        assert!(Instant::now() < deadline, "loop never stopped itself");
        thread::sleep(Duration::from_millis(1));
    }

    // The loop already stopped itself; this only reaps the thread.
    assert_eq!(controller.stop(), Err(VibrationError::AlreadyStopped));

    let calls = driver.calls();
    assert_eq!(calls.len(), 5);
    assert_eq!(calls[4].1, MotorLevels::OFF);
    assert_eq!(calls.iter().filter(|(_, l)| *l == MotorLevels::OFF).count(), 1);

    let errors: Vec<String> = messages(&rx)
        .into_iter()
        .filter(|n| n.level == Level::Error)
        .map(|n| n.message)
        .collect();
    let expected = format!("Error: {}", DriverError::new(1167));
    assert_eq!(errors, vec![expected.clone(), expected]);
    assert_eq!(controller.status().state, LoopState::Stopped);
}

#[test]
fn test_restart_after_driver_failure() {
    let driver = MockDriver::new(vec![0]).failing_from(0, 5);
    let (driver, controller, _rx) = controller_with(driver);

    controller.start(pad(0), VibrationPattern::Manual, sliders(1, 1)).unwrap();
    wait_for_calls(&driver, 2);
    let deadline = Instant::now() + Duration::from_secs(5);
    while controller.is_running() {
        assert!(Instant::now() < deadline, "loop never stopped itself");
        thread::sleep(Duration::from_millis(1));
    }

    // The stale loop thread is joined and a fresh one starts.
    assert_eq!(controller.start(pad(0), VibrationPattern::Manual, sliders(1, 1)), Ok(()));
    wait_for_calls(&driver, 3);
    controller.shutdown();
    assert!(!controller.is_running());
}

#[test]
fn test_drop_rests_a_running_controller() {
    let (driver, controller, _rx) = controller_with(MockDriver::new(vec![0]));

    controller.start(pad(0), VibrationPattern::Pulse, sliders(0, 0)).unwrap();
    wait_for_calls(&driver, 2);
    drop(controller);

    assert_eq!(driver.calls().last().unwrap().1, MotorLevels::OFF);
}
