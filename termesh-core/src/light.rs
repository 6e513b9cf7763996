/// Light direction shared between the input handler and the frame loop
use std::f32::consts::TAU;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::math::{wrap_angle, Vec3};

/// Keyboard rows that pick one of ten evenly spaced light angles.
pub const LIGHT_KEY_ROWS: [&str; 3] = ["qwertyuiop", "asdfghjkl;", "zxcvbnm,./"];

/// Number of angles selectable with digit keys `1`..=`8`.
pub const DIGIT_STOPS: u32 = 8;

/// Light direction for an angle on the horizontal ring around the mesh.
/// Angle 0 shines from the camera's side.
pub fn ring_direction(angle: f32) -> Vec3 {
    Vec3::new(angle.sin(), 0.0, angle.cos())
}

/// What a key press does to the light
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightCommand {
    /// Jump to an angle and stop orbiting.
    SetAngle(f32),
    /// Stop orbiting, keep the current angle.
    StopOrbit,
}

impl LightCommand {
    pub fn for_key(key: char) -> Self {
        if let Some(digit) = key.to_digit(10) {
            if (1..=DIGIT_STOPS).contains(&digit) {
                return LightCommand::SetAngle((digit - 1) as f32 / DIGIT_STOPS as f32 * TAU);
            }
        }

        LIGHT_KEY_ROWS
            .iter()
            .find_map(|row| row.chars().position(|c| c == key))
            .map(|position| LightCommand::SetAngle(position as f32 / 10.0 * TAU))
            .unwrap_or(LightCommand::StopOrbit)
    }
}

/// Light angle and auto-orbit flag
///
/// Each field is one machine word updated with a single atomic store, so
/// the input thread and the frame loop share it without a lock. Readers may
/// see a value up to one frame old.
#[derive(Debug)]
pub struct LightState {
    angle: AtomicU32,
    auto_orbit: AtomicBool,
}

impl LightState {
    pub fn new(angle: f32, auto_orbit: bool) -> Self {
        Self {
            angle: AtomicU32::new(wrap_angle(angle).to_bits()),
            auto_orbit: AtomicBool::new(auto_orbit),
        }
    }

    pub fn angle(&self) -> f32 {
        f32::from_bits(self.angle.load(Ordering::Relaxed))
    }

    pub fn set_angle(&self, angle: f32) {
        self.angle
            .store(wrap_angle(angle).to_bits(), Ordering::Relaxed);
    }

    pub fn auto_orbit(&self) -> bool {
        self.auto_orbit.load(Ordering::Relaxed)
    }

    pub fn set_auto_orbit(&self, enabled: bool) {
        self.auto_orbit.store(enabled, Ordering::Relaxed);
    }

    /// Current unit light direction.
    pub fn direction(&self) -> Vec3 {
        ring_direction(self.angle())
    }

    pub fn apply(&self, command: LightCommand) {
        if let LightCommand::SetAngle(angle) = command {
            self.set_angle(angle);
        }
        self.set_auto_orbit(false);
    }

    /// Move the light along its ring if orbiting. Called by the frame loop.
    pub fn orbit(&self, step: f32) {
        if self.auto_orbit() {
            self.set_angle(self.angle() + step);
        }
    }
}

impl Default for LightState {
    fn default() -> Self {
        Self::new(0.0, true)
    }
}
