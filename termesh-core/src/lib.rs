/// termesh core library - STL loading and character-grid rasterization
///
/// Everything here is free of terminal I/O: meshes are loaded and
/// normalized once, then [`Renderer`] turns a rotation and a light
/// direction into text frames.

pub mod config;
pub mod error;
pub mod framebuffer;
pub mod geometry;
pub mod light;
pub mod math;
pub mod normalize;
pub mod projection;
pub mod raster;
pub mod renderer;
pub mod shading;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use config::RenderConfig;
pub use error::LoadError;
pub use framebuffer::{Frame, FrameBuffer};
pub use geometry::{Mesh, Triangle, Vertex};
pub use light::{LightCommand, LightState};
pub use math::{Pos3, Vec3};
pub use projection::Camera;
pub use renderer::{FrameStats, Renderer};
pub use shading::{CharRamp, LightingModel, ShadingMode};
pub use transform::{RotationState, Transform};
