/// One-time mesh preparation: smoothed normals, centering and scaling
use std::collections::HashMap;

use log::debug;

use crate::geometry::Mesh;
use crate::math::{Vec3, Vec3Ext, VertexKey};

/// Largest axis extent of a mesh after [`normalize_mesh`].
pub const DEFAULT_TARGET_SIZE: f32 = 1.5;

#[derive(Debug, Clone, Copy)]
struct NormalSum {
    sum: Vec3,
    count: u32,
}

impl Default for NormalSum {
    fn default() -> Self {
        Self {
            sum: Vec3::zeros(),
            count: 0,
        }
    }
}

/// Smooth, center and scale a freshly loaded mesh, in that order.
///
/// Smoothing keys on the original positions; centering and scaling only
/// touch positions, never normals.
pub fn normalize_mesh(mesh: &mut Mesh, target_size: f32) {
    let shared = smooth_normals(mesh);
    let centroid = center(mesh);
    let factor = scale_to_fit(mesh, target_size);
    debug!(
        "Normalized mesh: {} shared vertices, centroid {:?}, scale {}",
        shared, centroid, factor
    );
}

/// Assign every vertex the average face normal of all triangles touching
/// its (quantized) position. Returns the number of distinct positions.
pub fn smooth_normals(mesh: &mut Mesh) -> usize {
    let mut sums: HashMap<VertexKey, NormalSum> = HashMap::new();

    for triangle in &mesh.triangles {
        let normal = triangle.face_normal();
        for vertex in &triangle.vertices {
            let entry = sums.entry(VertexKey::new(&vertex.position)).or_default();
            entry.sum += normal;
            entry.count += 1;
        }
    }

    for triangle in &mut mesh.triangles {
        for vertex in &mut triangle.vertices {
            let average = sums
                .get(&VertexKey::new(&vertex.position))
                .map(|n| n.sum / n.count as f32)
                .unwrap_or_else(Vec3::zeros);
            vertex.normal = Some(average.normalize_or_zero());
        }
    }

    sums.len()
}

/// Translate the mesh so the mean of its vertex positions (one per
/// triangle occurrence) is the origin. Returns the removed centroid.
pub fn center(mesh: &mut Mesh) -> Vec3 {
    let count = mesh.len() * 3;
    if count == 0 {
        return Vec3::zeros();
    }

    let sum = mesh.positions().fold(Vec3::zeros(), |acc, p| acc + p.coords);
    let centroid = sum / count as f32;

    for triangle in &mut mesh.triangles {
        for vertex in &mut triangle.vertices {
            vertex.position -= centroid;
        }
    }
    centroid
}

/// Uniformly scale positions so the largest bounding-box extent equals
/// `target_size`. A mesh with no extent is left as is. Returns the factor.
pub fn scale_to_fit(mesh: &mut Mesh, target_size: f32) -> f32 {
    let extent = match mesh.bounds() {
        Some(bounds) => bounds.max_extent(),
        None => return 1.0,
    };
    if extent <= f32::EPSILON {
        return 1.0;
    }

    let factor = target_size / extent;
    for triangle in &mut mesh.triangles {
        for vertex in &mut triangle.vertices {
            vertex.position.coords *= factor;
        }
    }
    factor
}
