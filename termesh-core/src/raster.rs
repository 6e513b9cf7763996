/// Triangle rasterizer for the character grid
use nalgebra::Rotation3;

use crate::framebuffer::FrameBuffer;
use crate::geometry::Triangle;
use crate::math::{Pos3, Vec3, Vec3Ext};
use crate::projection::{Camera, ScreenPoint};
use crate::shading::{CharRamp, LightingModel, ShadingMode};

/// What happened to a triangle this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriangleOutcome {
    /// Rasterized; `cells` is how many cells it won the depth test for.
    Drawn { cells: usize },
    /// Normal faces away from the camera (or is zero).
    BackFacing,
    /// A vertex is at or behind the camera's near epsilon.
    OffScreen,
    /// Bounding rectangle lies entirely outside the grid.
    Outside,
    /// Zero-area on the grid: flat bounding rectangle or collinear corners.
    Degenerate,
}

/// Whether a cell lies inside a projected triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coverage {
    /// Inside, with barycentric weights for the three corners.
    Covered([f32; 3]),
    NotCovered,
}

/// Barycentric setup for one projected triangle
#[derive(Debug, Clone, Copy)]
pub struct Barycentric {
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    denom: f32,
}

impl Barycentric {
    /// `None` when the corners are collinear on the grid.
    pub fn new(points: &[ScreenPoint; 3]) -> Option<Self> {
        let [v0, v1, v2] = points.map(|p| (p.x as f32, p.y as f32));
        let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

        if denom.abs() < 1e-6 {
            return None;
        }
        Some(Self { v0, v1, v2, denom })
    }

    /// Calculate barycentric coordinates for a cell and test containment
    pub fn coverage(&self, x: f32, y: f32) -> Coverage {
        let (v0, v1, v2) = (self.v0, self.v1, self.v2);
        let w0 = ((v1.1 - v2.1) * (x - v2.0) + (v2.0 - v1.0) * (y - v2.1)) / self.denom;
        let w1 = ((v2.1 - v0.1) * (x - v2.0) + (v0.0 - v2.0) * (y - v2.1)) / self.denom;
        let w2 = 1.0 - w0 - w1;

        if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
            Coverage::Covered([w0, w1, w2])
        } else {
            Coverage::NotCovered
        }
    }
}

/// Inclusive cell rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRect {
    pub min_x: usize,
    pub max_x: usize,
    pub min_y: usize,
    pub max_y: usize,
}

/// Rasterizes triangles into a [`FrameBuffer`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Rasterizer {
    pub camera: Camera,
    pub lighting: LightingModel,
    pub shading: ShadingMode,
    pub ramp: CharRamp,
}

/// Bounding rectangle of projected corners clipped to the grid.
fn clip_bounds(
    points: &[ScreenPoint; 3],
    width: usize,
    height: usize,
) -> Result<CellRect, TriangleOutcome> {
    if width == 0 || height == 0 {
        return Err(TriangleOutcome::Outside);
    }
    let min_x = points.iter().map(|p| p.x).min().unwrap_or(0).max(0);
    let max_x = points.iter().map(|p| p.x).max().unwrap_or(0).min(width as i32 - 1);
    let min_y = points.iter().map(|p| p.y).min().unwrap_or(0).max(0);
    let max_y = points.iter().map(|p| p.y).max().unwrap_or(0).min(height as i32 - 1);

    if max_x < min_x || max_y < min_y {
        return Err(TriangleOutcome::Outside);
    }
    if max_x == min_x || max_y == min_y {
        return Err(TriangleOutcome::Degenerate);
    }
    Ok(CellRect {
        min_x: min_x as usize,
        max_x: max_x as usize,
        min_y: min_y as usize,
        max_y: max_y as usize,
    })
}

impl Rasterizer {
    pub fn new(camera: Camera, lighting: LightingModel, shading: ShadingMode) -> Self {
        Self {
            camera,
            lighting,
            shading,
            ramp: CharRamp::default(),
        }
    }

    /// Rotate, cull, project, light and depth-test one triangle.
    ///
    /// `light` is a unit direction in view space.
    pub fn draw_triangle(
        &self,
        triangle: &Triangle,
        rotation: &Rotation3<f32>,
        light: &Vec3,
        fb: &mut FrameBuffer,
    ) -> TriangleOutcome {
        let vertices: [Pos3; 3] = triangle.positions().map(|p| rotation.transform_point(&p));
        let normal = rotation.transform_vector(&triangle.face_normal());

        let centroid = Pos3::from(
            (vertices[0].coords + vertices[1].coords + vertices[2].coords) / 3.0,
        );
        if normal.dot(&self.camera.to_camera(&centroid)) <= 0.0 {
            return TriangleOutcome::BackFacing;
        }

        let mut points = [ScreenPoint::default(); 3];
        for (point, vertex) in points.iter_mut().zip(&vertices) {
            match self.camera.project(vertex, fb.width(), fb.height()) {
                Some(projected) => *point = projected,
                None => return TriangleOutcome::OffScreen,
            }
        }

        let rect = match clip_bounds(&points, fb.width(), fb.height()) {
            Ok(rect) => rect,
            Err(outcome) => return outcome,
        };
        let barycentric = match Barycentric::new(&points) {
            Some(b) => b,
            None => return TriangleOutcome::Degenerate,
        };

        let depth = (points[0].depth + points[1].depth + points[2].depth) / 3.0;
        let flat_index = self.ramp.index_for(self.lighting.brightness(&normal, light));
        let vertex_normals = match self.shading {
            ShadingMode::Smooth => Some(
                triangle
                    .vertex_normals()
                    .map(|n| rotation.transform_vector(&n)),
            ),
            ShadingMode::Flat => None,
        };

        let mut cells = 0;
        for y in rect.min_y..=rect.max_y {
            for x in rect.min_x..=rect.max_x {
                let weights = match barycentric.coverage(x as f32, y as f32) {
                    Coverage::Covered(weights) => weights,
                    Coverage::NotCovered => continue,
                };
                if !fb.is_nearer(x, y, depth) {
                    continue;
                }

                let index = match &vertex_normals {
                    Some([n0, n1, n2]) => {
                        let n = (n0 * weights[0] + n1 * weights[1] + n2 * weights[2])
                            .normalize_or_zero();
                        self.ramp.index_for(self.lighting.brightness(&n, light))
                    }
                    None => flat_index,
                };
                fb.write(x, y, depth, index);
                cells += 1;
            }
        }

        TriangleOutcome::Drawn { cells }
    }
}
