use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// XInput exposes four user slots.
pub const MAX_CONTROLLERS: u32 = 4;

pub type MotorIntensity = u16;

pub const MOTOR_MAX: MotorIntensity = u16::MAX;

/// Index of a connected controller (0..=3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControllerHandle(u32);

impl ControllerHandle {
    pub fn new(index: u32) -> Option<Self> {
        (index < MAX_CONTROLLERS).then_some(Self(index))
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for ControllerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Controller {}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MotorLevels {
    pub left: MotorIntensity,
    pub right: MotorIntensity,
}

impl MotorLevels {
    pub const OFF: Self = Self { left: 0, right: 0 };
    pub const FULL: Self = Self { left: MOTOR_MAX, right: MOTOR_MAX };

    pub fn new(left: MotorIntensity, right: MotorIntensity) -> Self {
        Self { left, right }
    }

    pub fn both(level: MotorIntensity) -> Self {
        Self { left: level, right: level }
    }
}

impl fmt::Display for MotorLevels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L {} / R {}", self.left, self.right)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VibrationPattern {
    /// Slider values pass through unchanged.
    #[default]
    Manual,
    /// Sine ramp between `WAVE_FLOOR` and full strength.
    Wave,
    /// Independent uniform sample per motor per tick.
    Random,
    /// Square wave: full on even whole time units, off on odd ones.
    Pulse,
}

impl VibrationPattern {
    pub const ALL: [VibrationPattern; 4] = [
        VibrationPattern::Manual,
        VibrationPattern::Wave,
        VibrationPattern::Random,
        VibrationPattern::Pulse,
    ];
}

impl fmt::Display for VibrationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VibrationPattern::Manual => write!(f, "Manual"),
            VibrationPattern::Wave => write!(f, "Wave"),
            VibrationPattern::Random => write!(f, "Random"),
            VibrationPattern::Pulse => write!(f, "Pulse"),
        }
    }
}

impl FromStr for VibrationPattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "manual" => Ok(VibrationPattern::Manual),
            "wave" => Ok(VibrationPattern::Wave),
            "random" => Ok(VibrationPattern::Random),
            "pulse" => Ok(VibrationPattern::Pulse),
            _ => Err(format!("Unknown vibration pattern: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopState {
    #[default]
    Stopped,
    Running,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoopState::Stopped => write!(f, "Stopped"),
            LoopState::Running => write!(f, "Running"),
        }
    }
}

/// User preferences restored between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub target_controller_index: Option<u32>,
    pub pattern: VibrationPattern,
    pub left_motor: MotorIntensity,
    pub right_motor: MotorIntensity,
    pub tick_interval_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            target_controller_index: None,
            pattern: VibrationPattern::Manual,
            left_motor: 0,
            right_motor: 0,
            tick_interval_ms: 100,
        }
    }
}

impl AppConfig {
    pub fn target_controller(&self) -> Option<ControllerHandle> {
        self.target_controller_index.and_then(ControllerHandle::new)
    }

    pub fn manual_levels(&self) -> MotorLevels {
        MotorLevels::new(self.left_motor, self.right_motor)
    }

    /// Wall-clock wait between ticks; never zero.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_handle_range() {
        assert_eq!(ControllerHandle::new(3).map(|c| c.index()), Some(3));
        assert!(ControllerHandle::new(4).is_none());
        assert_eq!(ControllerHandle::new(0).unwrap().to_string(), "Controller 0");
    }

    #[test]
    fn test_pattern_parse_and_display() {
        for pattern in VibrationPattern::ALL {
            assert_eq!(pattern.to_string().parse::<VibrationPattern>(), Ok(pattern));
        }
        assert_eq!("PULSE".parse::<VibrationPattern>(), Ok(VibrationPattern::Pulse));
        assert!("zigzag".parse::<VibrationPattern>().is_err());
    }

    #[test]
    fn test_config_fills_missing_fields() {
        let config: AppConfig = serde_json::from_str(r#"{"pattern":"Wave"}"#).unwrap();
        assert_eq!(config.pattern, VibrationPattern::Wave);
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.target_controller(), None);
    }

    #[test]
    fn test_config_rejects_out_of_range_controller() {
        let config = AppConfig {
            target_controller_index: Some(7),
            ..AppConfig::default()
        };
        assert_eq!(config.target_controller(), None);
        assert_eq!(config.tick_interval(), Duration::from_millis(100));
    }

    #[test]
    fn test_zero_tick_interval_is_clamped() {
        let config = AppConfig {
            tick_interval_ms: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
    }
}
