/// Geometry primitives for mesh rendering
use crate::math::{Pos3, Vec3, Vec3Ext};

/// A mesh vertex: position plus an optional smoothed normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Pos3,
    /// Averaged over every triangle sharing this position. Unset until
    /// [`crate::normalize::smooth_normals`] runs.
    pub normal: Option<Vec3>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Pos3::new(x, y, z),
            normal: None,
        }
    }
}

impl From<Pos3> for Vertex {
    fn from(position: Pos3) -> Self {
        Self {
            position,
            normal: None,
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
    /// Face normal as stored (file value, or computed on construction).
    pub normal: Vec3,
    /// Binary STL attribute word, kept for lossless re-encoding.
    pub attribute: u16,
}

impl Triangle {
    /// Build a triangle from positions, computing its face normal.
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        let vertices = [v0, v1, v2];
        Self {
            normal: Self::calculate_normal(&vertices),
            vertices,
            attribute: 0,
        }
    }

    /// Build a triangle with an explicit normal, as read from a file.
    pub fn with_normal(vertices: [Vertex; 3], normal: Vec3) -> Self {
        Self {
            vertices,
            normal,
            attribute: 0,
        }
    }

    /// Right-hand normal of `(v1 - v0) x (v2 - v0)`, zero when degenerate.
    pub fn calculate_normal(vertices: &[Vertex; 3]) -> Vec3 {
        let v0 = vertices[0].position;
        let v1 = vertices[1].position;
        let v2 = vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize_or_zero()
    }

    /// Unit face normal used for culling and lighting.
    ///
    /// A stored all-zero normal means "not supplied" and falls back to the
    /// computed one. The result is the zero vector only for degenerate faces.
    pub fn face_normal(&self) -> Vec3 {
        if self.normal == Vec3::zeros() {
            Self::calculate_normal(&self.vertices)
        } else {
            self.normal.normalize_or_zero()
        }
    }

    pub fn positions(&self) -> [Pos3; 3] {
        self.vertices.map(|v| v.position)
    }

    /// Smoothed normal of each vertex, or the face normal where unset.
    pub fn vertex_normals(&self) -> [Vec3; 3] {
        let face = self.face_normal();
        self.vertices.map(|v| v.normal.unwrap_or(face))
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Pos3,
    pub max: Pos3,
}

impl Bounds {
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Largest of the three axis extents.
    pub fn max_extent(&self) -> f32 {
        self.extent().max()
    }
}

/// A 3D mesh composed of triangles, in file order
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Every vertex position, once per triangle occurrence.
    pub fn positions(&self) -> impl Iterator<Item = Pos3> + '_ {
        self.triangles
            .iter()
            .flat_map(|t| t.vertices.iter().map(|v| v.position))
    }

    /// Bounding box of all vertices, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut positions = self.positions();
        let first = positions.next()?;
        let bounds = positions.fold(
            Bounds {
                min: first,
                max: first,
            },
            |b, p| Bounds {
                min: b.min.inf(&p),
                max: b.max.sup(&p),
            },
        );
        Some(bounds)
    }

    /// Create a closed cube mesh with outward normals, for tests and benches
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let corner = |x: f32, y: f32, z: f32| Vertex::new(x * half, y * half, z * half);
        // Two counter-clockwise triangles per face, seen from outside
        let quads: [[(f32, f32, f32); 4]; 6] = [
            [(-1.0, -1.0, 1.0), (1.0, -1.0, 1.0), (1.0, 1.0, 1.0), (-1.0, 1.0, 1.0)],
            [(1.0, -1.0, -1.0), (-1.0, -1.0, -1.0), (-1.0, 1.0, -1.0), (1.0, 1.0, -1.0)],
            [(-1.0, 1.0, 1.0), (1.0, 1.0, 1.0), (1.0, 1.0, -1.0), (-1.0, 1.0, -1.0)],
            [(-1.0, -1.0, -1.0), (1.0, -1.0, -1.0), (1.0, -1.0, 1.0), (-1.0, -1.0, 1.0)],
            [(1.0, -1.0, 1.0), (1.0, -1.0, -1.0), (1.0, 1.0, -1.0), (1.0, 1.0, 1.0)],
            [(-1.0, -1.0, -1.0), (-1.0, -1.0, 1.0), (-1.0, 1.0, 1.0), (-1.0, 1.0, -1.0)],
        ];

        let mut mesh = Self::with_capacity(12);
        for quad in quads {
            let [a, b, c, d] = quad.map(|(x, y, z)| corner(x, y, z));
            mesh.add_triangle(Triangle::new(a, b, c));
            mesh.add_triangle(Triangle::new(a, c, d));
        }
        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Vec<Triangle>> for Mesh {
    fn from(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }
}
