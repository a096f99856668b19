use rand::Rng;

use crate::domain::models::{MotorIntensity, MotorLevels, VibrationPattern, MOTOR_MAX};

/// Lowest level the wave pattern reaches.
pub const WAVE_FLOOR: MotorIntensity = 2000;

/// Virtual time added per tick, independent of wall clock.
pub const TIME_STEP: f64 = 0.1;

/// Virtual time at a given tick.
///
/// Derived from the tick count rather than accumulated, so every tenth tick
/// lands exactly on a whole number.
pub fn virtual_time(tick: u64) -> f64 {
    tick as f64 * TIME_STEP
}

/// Sine ramp mapped onto `[WAVE_FLOOR, MOTOR_MAX]`.
pub fn wave_level(t: f64) -> MotorIntensity {
    let span = f64::from(MOTOR_MAX - WAVE_FLOOR);
    let level = ((t.sin() * 0.5 + 0.5) * span + f64::from(WAVE_FLOOR)).round();
    level.clamp(f64::from(WAVE_FLOOR), f64::from(MOTOR_MAX)) as MotorIntensity
}

/// Full strength while `floor(t)` is even, zero while odd.
pub fn pulse_level(t: f64) -> MotorIntensity {
    if (t.floor() as i64).rem_euclid(2) == 0 {
        MOTOR_MAX
    } else {
        0
    }
}

impl VibrationPattern {
    /// Motor levels for one tick at virtual time `t`.
    ///
    /// `manual` is the slider reading for this tick; only `Manual` uses it.
    pub fn levels_at<R: Rng + ?Sized>(&self, t: f64, manual: MotorLevels, rng: &mut R) -> MotorLevels {
        match self {
            VibrationPattern::Manual => manual,
            VibrationPattern::Wave => MotorLevels::both(wave_level(t)),
            VibrationPattern::Random => MotorLevels::new(rng.gen(), rng.gen()),
            VibrationPattern::Pulse => MotorLevels::both(pulse_level(t)),
        }
    }
}
