use thiserror::Error;

/// Status returned by the driver when no controller answers at an index.
pub const ERROR_DEVICE_NOT_CONNECTED: u32 = 1167;

/// A platform vibration call returned a non-zero status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Failed to set vibration (error code: {code})")]
pub struct DriverError {
    pub code: u32,
}

impl DriverError {
    pub fn new(code: u32) -> Self {
        Self { code }
    }

    pub fn is_disconnected(&self) -> bool {
        self.code == ERROR_DEVICE_NOT_CONNECTED
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VibrationError {
    #[error("No controller selected")]
    InvalidSelection,
    #[error("Vibration is already running")]
    AlreadyRunning,
    #[error("Vibration is already stopped")]
    AlreadyStopped,
    #[error(transparent)]
    Driver(#[from] DriverError),
}
