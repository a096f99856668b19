use std::sync::atomic::{AtomicU16, Ordering};

use crate::domain::interfaces::IntensityProvider;
use crate::domain::models::{MotorIntensity, MotorLevels};

/// Slider values written by the UI thread and sampled by the loop thread.
#[derive(Debug, Default)]
pub struct SliderIntensity {
    left: AtomicU16,
    right: AtomicU16,
}

impl SliderIntensity {
    pub fn new(levels: MotorLevels) -> Self {
        Self {
            left: AtomicU16::new(levels.left),
            right: AtomicU16::new(levels.right),
        }
    }

    pub fn set_left(&self, level: MotorIntensity) {
        self.left.store(level, Ordering::Relaxed);
    }

    pub fn set_right(&self, level: MotorIntensity) {
        self.right.store(level, Ordering::Relaxed);
    }
}

impl IntensityProvider for SliderIntensity {
    fn manual_levels(&self) -> MotorLevels {
        MotorLevels::new(self.left.load(Ordering::Relaxed), self.right.load(Ordering::Relaxed))
    }
}

/// Constant levels, used by the headless runner.
#[derive(Debug, Clone, Copy)]
pub struct FixedIntensity(pub MotorLevels);

impl IntensityProvider for FixedIntensity {
    fn manual_levels(&self) -> MotorLevels {
        self.0
    }
}
