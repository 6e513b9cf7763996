/// Depth-tested brightness grids with frame-to-frame blending
use crate::shading::CharRamp;

/// Weight of the previous frame when blending a cell.
pub const DEFAULT_PREVIOUS_WEIGHT: f32 = 0.3;

/// How much nearer a surface must be to replace what a cell holds.
pub const DEFAULT_DEPTH_BIAS: f32 = 1e-4;

/// A composed frame: exactly `height` rows of `width` glyphs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    pub rows: Vec<String>,
}

impl Frame {
    /// Rows joined with `\n`.
    pub fn to_text(&self) -> String {
        self.rows.join("\n")
    }
}

/// Per-cell brightness indices and depths for the frame being drawn, plus
/// the indices computed for the previous frame.
///
/// `current` holds what gets emitted (blended); `computed` holds the raw
/// shading result, which is what the next frame blends against.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    current: Vec<Option<u8>>,
    computed: Vec<Option<u8>>,
    depth: Vec<f32>,
    previous: Vec<Option<u8>>,
    previous_weight: f32,
    depth_bias: f32,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            current: vec![None; size],
            computed: vec![None; size],
            depth: vec![f32::INFINITY; size],
            previous: vec![None; size],
            previous_weight: DEFAULT_PREVIOUS_WEIGHT,
            depth_bias: DEFAULT_DEPTH_BIAS,
        }
    }

    pub fn with_blending(mut self, previous_weight: f32, depth_bias: f32) -> Self {
        self.previous_weight = previous_weight.clamp(0.0, 1.0);
        self.depth_bias = depth_bias.max(0.0);
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocate for a new grid size. Blend history does not carry over.
    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        *self = Self::new(width, height).with_blending(self.previous_weight, self.depth_bias);
    }

    /// Start a new frame: every cell empty and infinitely far.
    pub fn clear(&mut self) {
        self.current.fill(None);
        self.computed.fill(None);
        self.depth.fill(f32::INFINITY);
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Whether a surface at `depth` is strictly nearer than the cell's
    /// current occupant, allowing for the coplanar bias.
    pub fn is_nearer(&self, x: usize, y: usize, depth: f32) -> bool {
        match self.index(x, y) {
            Some(i) => depth < self.depth[i] - self.depth_bias,
            None => false,
        }
    }

    /// Store a surface in a cell, blending its brightness index with what
    /// the previous frame showed there. Does not depth test; see
    /// [`FrameBuffer::is_nearer`].
    pub fn write(&mut self, x: usize, y: usize, depth: f32, index: u8) {
        if let Some(i) = self.index(x, y) {
            let blended = match self.previous[i] {
                Some(previous) => blend(previous, index, self.previous_weight),
                None => index,
            };
            self.depth[i] = depth;
            self.computed[i] = Some(index);
            self.current[i] = Some(blended);
        }
    }

    /// Brightness index drawn in a cell this frame.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.index(x, y).and_then(|i| self.current[i])
    }

    /// Unblended brightness index the previous frame computed for a cell.
    pub fn previous(&self, x: usize, y: usize) -> Option<u8> {
        self.index(x, y).and_then(|i| self.previous[i])
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// Number of cells drawn this frame.
    pub fn covered(&self) -> usize {
        self.current.iter().filter(|c| c.is_some()).count()
    }

    /// Serialize row-major; empty cells become blanks.
    pub fn compose(&self, ramp: &CharRamp) -> Frame {
        let rows = if self.width == 0 {
            vec![String::new(); self.height]
        } else {
            self.current
                .chunks(self.width)
                .map(|row| {
                    row.iter()
                        .map(|cell| cell.map_or(' ', |index| ramp.glyph(index)))
                        .collect()
                })
                .collect()
        };
        Frame {
            width: self.width,
            height: self.height,
            rows,
        }
    }

    /// Keep this frame's computed indices as the blend source for the next one.
    pub fn roll(&mut self) {
        self.previous.copy_from_slice(&self.computed);
    }
}

/// Weighted blend of two ramp indices, rounded to the nearest index.
pub fn blend(previous: u8, current: u8, previous_weight: f32) -> u8 {
    let mixed = previous_weight * previous as f32 + (1.0 - previous_weight) * current as f32;
    mixed.round().clamp(0.0, u8::MAX as f32) as u8
}
