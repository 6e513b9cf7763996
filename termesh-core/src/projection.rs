/// Camera and projection onto the character grid
use crate::math::{Pos3, Vec3};

/// Terminal cells are about twice as tall as they are wide.
pub const DEFAULT_CELL_ASPECT: f32 = 2.0;

/// A projected point: integer cell coordinates plus view depth
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
    /// Distance from the camera along the view axis.
    pub depth: f32,
}

/// Camera on the +Z axis looking at the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Distance from the origin.
    pub distance: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    /// Cell height divided by cell width.
    pub cell_aspect: f32,
    /// Points nearer than this along the view axis are off-screen.
    pub near: f32,
}

impl Camera {
    pub fn new(distance: f32) -> Self {
        Self {
            distance,
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            cell_aspect: DEFAULT_CELL_ASPECT,
            near: 1e-3,
        }
    }

    pub fn position(&self) -> Pos3 {
        Pos3::new(0.0, 0.0, self.distance)
    }

    /// View-axis depth of a view-space point.
    pub fn depth(&self, point: &Pos3) -> f32 {
        self.distance - point.z
    }

    /// Vector from `point` towards the camera.
    pub fn to_camera(&self, point: &Pos3) -> Vec3 {
        self.position() - point
    }

    /// Project a view-space point onto a `cols` x `rows` character grid
    ///
    /// Returns `None` for points at or behind the near epsilon. The grid is
    /// stretched horizontally by the cell aspect so shapes keep their
    /// proportions, and coordinates are rounded rather than truncated
    /// (vertical offset 0.25, horizontal 0.5) to steady the image.
    pub fn project(&self, point: &Pos3, cols: usize, rows: usize) -> Option<ScreenPoint> {
        let depth = self.depth(point);
        if depth < self.near {
            return None;
        }

        let focal = 1.0 / (self.fov * 0.5).tan();
        let ndc_x = point.x * focal / depth;
        let ndc_y = point.y * focal / depth;

        let (cols, rows) = (cols as f32, rows as f32);
        let half_rows = rows.min(cols / self.cell_aspect) * 0.5;
        let screen_x = cols * 0.5 + ndc_x * half_rows * self.cell_aspect;
        let screen_y = rows * 0.5 - ndc_y * half_rows;

        Some(ScreenPoint {
            x: (screen_x + 0.5).floor() as i32,
            y: (screen_y + 0.25).floor() as i32,
            depth,
        })
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(3.5)
    }
}
