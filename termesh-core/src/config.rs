/// Tunables for the render pipeline and frame loop
use std::time::Duration;

use crate::framebuffer::{DEFAULT_DEPTH_BIAS, DEFAULT_PREVIOUS_WEIGHT};
use crate::normalize::DEFAULT_TARGET_SIZE;
use crate::projection::Camera;
use crate::shading::{LightingModel, ShadingMode};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// Largest bounding-box extent of the normalized mesh.
    pub target_size: f32,
    pub camera: Camera,
    pub lighting: LightingModel,
    pub shading: ShadingMode,
    /// Weight of the previous frame in the temporal blend.
    pub previous_weight: f32,
    pub depth_bias: f32,
    /// Delay between frames.
    pub frame_interval: Duration,
    /// Yaw added each frame, radians.
    pub yaw_step: f32,
    /// Light angle added each frame while auto-orbit is on, radians.
    pub light_orbit_step: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            camera: Camera::default(),
            lighting: LightingModel::default(),
            shading: ShadingMode::Smooth,
            previous_weight: DEFAULT_PREVIOUS_WEIGHT,
            depth_bias: DEFAULT_DEPTH_BIAS,
            frame_interval: Duration::from_millis(60),
            yaw_step: 0.05,
            light_orbit_step: 0.03,
        }
    }
}
