use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::domain::errors::{DriverError, ERROR_DEVICE_NOT_CONNECTED};
use crate::domain::interfaces::VibrationDriver;
use crate::domain::models::{ControllerHandle, MotorLevels};

/// Driver used where XInput does not exist: nothing is connected.
#[derive(Debug, Default)]
pub struct UnsupportedDriver;

impl VibrationDriver for UnsupportedDriver {
    fn set_vibration(&self, _controller: ControllerHandle, _levels: MotorLevels) -> Result<(), DriverError> {
        Err(DriverError::new(ERROR_DEVICE_NOT_CONNECTED))
    }

    fn probe_connected(&self, _index: u32) -> bool {
        false
    }
}

// Windows Implementation
#[cfg(target_os = "windows")]
#[derive(Debug, Default)]
pub struct XInputDriver;

#[cfg(target_os = "windows")]
impl XInputDriver {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_os = "windows")]
impl VibrationDriver for XInputDriver {
    fn set_vibration(&self, controller: ControllerHandle, levels: MotorLevels) -> Result<(), DriverError> {
        use windows::Win32::UI::Input::XboxController::{XInputSetState, XINPUT_VIBRATION};

        let vibration = XINPUT_VIBRATION {
            wLeftMotorSpeed: levels.left,
            wRightMotorSpeed: levels.right,
        };
        let result = unsafe { XInputSetState(controller.index(), &vibration) };

        if result == 0 { // ERROR_SUCCESS
            Ok(())
        } else {
            Err(DriverError::new(result))
        }
    }

    fn probe_connected(&self, index: u32) -> bool {
        use windows::Win32::UI::Input::XboxController::{XInputGetState, XINPUT_STATE};

        let mut state = XINPUT_STATE::default();
        let result = unsafe { XInputGetState(index, &mut state) };
        result == 0
    }
}

#[cfg(target_os = "windows")]
pub type PlatformDriver = XInputDriver;
#[cfg(not(target_os = "windows"))]
pub type PlatformDriver = UnsupportedDriver;

pub fn platform_driver() -> PlatformDriver {
    PlatformDriver::default()
}

struct PausePoint {
    at_call: usize,
    reached: Sender<()>,
    resume: Receiver<()>,
}

/// Test side of a paused `MockDriver` write.
pub struct PauseHandle {
    reached: Receiver<()>,
    resume: Sender<()>,
}

impl PauseHandle {
    /// Blocks until the driver is parked inside the paused write.
    pub fn wait_reached(&self) {
        let _ = self.reached.recv();
    }

    /// Lets the parked write return.
    pub fn resume(&self) {
        let _ = self.resume.send(());
    }
}

/// Scripted driver that records every write.
pub struct MockDriver {
    connected: BTreeSet<u32>,
    calls: Mutex<Vec<(ControllerHandle, MotorLevels)>>,
    fail_from: Option<(usize, u32)>,
    pause: Option<PausePoint>,
}

impl MockDriver {
    pub fn new(connected: Vec<u32>) -> Self {
        Self {
            connected: connected.into_iter().collect(),
            calls: Mutex::new(Vec::new()),
            fail_from: None,
            pause: None,
        }
    }

    /// Writes numbered `call` (0-based) and later return `code`.
    pub fn failing_from(mut self, call: usize, code: u32) -> Self {
        self.fail_from = Some((call, code));
        self
    }

    /// Parks write number `call` (0-based) until the returned handle resumes it.
    pub fn pausing_at(mut self, call: usize) -> (Self, PauseHandle) {
        let (reached_tx, reached_rx) = bounded(1);
        let (resume_tx, resume_rx) = bounded(1);
        self.pause = Some(PausePoint {
            at_call: call,
            reached: reached_tx,
            resume: resume_rx,
        });
        (
            self,
            PauseHandle {
                reached: reached_rx,
                resume: resume_tx,
            },
        )
    }

    pub fn calls(&self) -> Vec<(ControllerHandle, MotorLevels)> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl VibrationDriver for MockDriver {
    fn set_vibration(&self, controller: ControllerHandle, levels: MotorLevels) -> Result<(), DriverError> {
        let call = {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            calls.push((controller, levels));
            calls.len() - 1
        };

        if let Some(pause) = &self.pause {
            if pause.at_call == call {
                let _ = pause.reached.send(());
                let _ = pause.resume.recv();
            }
        }

        match self.fail_from {
            Some((from, code)) if call >= from => Err(DriverError::new(code)),
            _ => Ok(()),
        }
    }

    fn probe_connected(&self, index: u32) -> bool {
        self.connected.contains(&index)
    }
}
