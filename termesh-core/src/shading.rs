/// Lighting model and brightness-to-character mapping
use crate::math::Vec3;

/// Character luminosity ramp for shading (sparsest to densest)
pub const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Where the lighting normal comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadingMode {
    /// One brightness per triangle from its face normal.
    Flat,
    /// Per-cell blend of the smoothed vertex normals (Gouraud-style).
    #[default]
    Smooth,
}

/// Ambient plus directional lighting with a shaped falloff
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingModel {
    pub ambient: f32,
    pub diffuse: f32,
    /// Exponent applied to the directional term.
    pub falloff: f32,
    pub min_brightness: f32,
    pub max_brightness: f32,
}

impl LightingModel {
    /// Brightness in `[min_brightness, max_brightness]` for a surface normal
    /// lit from `light` (both unit length).
    pub fn brightness(&self, normal: &Vec3, light: &Vec3) -> f32 {
        let directional = normal.dot(light).max(0.0);
        (self.ambient + self.diffuse * directional.powf(self.falloff))
            .clamp(self.min_brightness, self.max_brightness)
    }
}

impl Default for LightingModel {
    fn default() -> Self {
        Self {
            ambient: 0.35,
            diffuse: 0.7,
            falloff: 1.2,
            min_brightness: 0.25,
            max_brightness: 1.0,
        }
    }
}

/// Ordered glyph ramp indexed by brightness
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharRamp {
    glyphs: &'static [char],
}

impl CharRamp {
    pub fn new(glyphs: &'static [char]) -> Self {
        Self { glyphs }
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Highest valid index.
    pub fn max_index(&self) -> u8 {
        self.len().saturating_sub(1).min(u8::MAX as usize) as u8
    }

    /// Scale `brightness` (0..=1) onto the ramp, truncating.
    pub fn index_for(&self, brightness: f32) -> u8 {
        let max = self.max_index();
        let scaled = (brightness.max(0.0) * max as f32) as usize;
        scaled.min(max as usize) as u8
    }

    /// Glyph for an index; out-of-range indices clamp to the densest glyph.
    pub fn glyph(&self, index: u8) -> char {
        self.glyphs
            .get(index as usize)
            .or_else(|| self.glyphs.last())
            .copied()
            .unwrap_or(' ')
    }
}

impl Default for CharRamp {
    fn default() -> Self {
        Self::new(LUMINOSITY_RAMP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_bounds() {
        let model = LightingModel::default();
        let up = Vec3::new(0.0, 1.0, 0.0);

        // Facing away: ambient only
        let away = model.brightness(&up, &Vec3::new(0.0, -1.0, 0.0));
        assert!((away - 0.35).abs() < 1e-6);

        // Facing the light: clamped at full
        let facing = model.brightness(&up, &up);
        assert_eq!(facing, 1.0);

        // A zero normal is treated as unlit
        let zero = model.brightness(&Vec3::zeros(), &up);
        assert!((zero - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_brightness_monotonic() {
        let model = LightingModel::default();
        let normal = Vec3::new(0.0, 0.0, 1.0);
        let mut last = 0.0;
        for step in 0..=20 {
            let angle = std::f32::consts::FRAC_PI_2 * (1.0 - step as f32 / 20.0);
            let light = Vec3::new(angle.sin(), 0.0, angle.cos());
            let b = model.brightness(&normal, &light);
            assert!(b >= last);
            last = b;
        }
    }

    #[test]
    fn test_ramp_index() {
        let ramp = CharRamp::default();
        assert_eq!(ramp.len(), 10);
        assert_eq!(ramp.index_for(0.0), 0);
        assert_eq!(ramp.index_for(0.35), 3);
        assert_eq!(ramp.index_for(0.99), 8);
        assert_eq!(ramp.index_for(1.0), 9);
        assert_eq!(ramp.index_for(7.0), 9);
        assert_eq!(ramp.index_for(-1.0), 0);
    }

    #[test]
    fn test_ramp_glyphs() {
        let ramp = CharRamp::default();
        assert_eq!(ramp.glyph(0), ' ');
        assert_eq!(ramp.glyph(9), '@');
        assert_eq!(ramp.glyph(200), '@');
    }
}
