use crate::domain::errors::DriverError;
use crate::domain::models::{ControllerHandle, MotorLevels, MAX_CONTROLLERS};

/// Abstraction over the platform rumble API.
pub trait VibrationDriver: Send + Sync {
    /// Sends a motor pair to the controller.
    /// Returns Err(DriverError) carrying the status code on a non-zero status.
    fn set_vibration(&self, controller: ControllerHandle, levels: MotorLevels) -> Result<(), DriverError>;

    /// Returns true if a state query at `index` succeeds.
    fn probe_connected(&self, index: u32) -> bool;

    /// Probes every slot in ascending order and returns the ones that respond.
    fn list_connected_controllers(&self) -> Vec<ControllerHandle> {
        (0..MAX_CONTROLLERS)
            .filter(|&index| self.probe_connected(index))
            .filter_map(ControllerHandle::new)
            .collect()
    }
}

/// Source of the manual (slider) motor levels, sampled once per tick.
pub trait IntensityProvider: Send + Sync {
    fn manual_levels(&self) -> MotorLevels;
}
