/// Per-frame pipeline: clear, rasterize every triangle, compose, roll
use log::trace;

use crate::config::RenderConfig;
use crate::framebuffer::{Frame, FrameBuffer};
use crate::geometry::Mesh;
use crate::math::Vec3;
use crate::raster::{Rasterizer, TriangleOutcome};
use crate::transform::{RotationState, Transform};

/// Triangle classification counts for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub drawn: usize,
    pub back_facing: usize,
    pub off_screen: usize,
    pub outside: usize,
    pub degenerate: usize,
    /// Cell writes that passed the depth test.
    pub cells: usize,
}

impl FrameStats {
    fn record(&mut self, outcome: TriangleOutcome) {
        match outcome {
            TriangleOutcome::Drawn { cells } => {
                self.drawn += 1;
                self.cells += cells;
            }
            TriangleOutcome::BackFacing => self.back_facing += 1,
            TriangleOutcome::OffScreen => self.off_screen += 1,
            TriangleOutcome::Outside => self.outside += 1,
            TriangleOutcome::Degenerate => self.degenerate += 1,
        }
    }
}

/// Renders a mesh into character frames of a fixed grid size
pub struct Renderer {
    rasterizer: Rasterizer,
    framebuffer: FrameBuffer,
    stats: FrameStats,
}

impl Renderer {
    pub fn new(width: usize, height: usize, config: &RenderConfig) -> Self {
        Self {
            rasterizer: Rasterizer::new(config.camera, config.lighting, config.shading),
            framebuffer: FrameBuffer::new(width, height)
                .with_blending(config.previous_weight, config.depth_bias),
            stats: FrameStats::default(),
        }
    }

    pub fn width(&self) -> usize {
        self.framebuffer.width()
    }

    pub fn height(&self) -> usize {
        self.framebuffer.height()
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.framebuffer.resize(width, height);
    }

    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    /// Counts from the most recent [`Renderer::render`].
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Draw one frame. `light` is a unit direction in view space.
    pub fn render(&mut self, mesh: &Mesh, rotation: &RotationState, light: &Vec3) -> Frame {
        let rotation = Transform::rotation(rotation);
        self.framebuffer.clear();

        let mut stats = FrameStats::default();
        for triangle in &mesh.triangles {
            let outcome =
                self.rasterizer
                    .draw_triangle(triangle, &rotation, light, &mut self.framebuffer);
            stats.record(outcome);
        }

        let frame = self.framebuffer.compose(&self.rasterizer.ramp);
        self.framebuffer.roll();

        trace!("Frame stats: {:?}", stats);
        self.stats = stats;
        frame
    }
}
