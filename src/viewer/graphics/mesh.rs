//! CPU-side procedural mesh generation.
//!
//! These meshes are authoring data. The backend uploads them and hands back a
//! `GeometryHandle` that scene objects keep until they are released.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

/// Smallest extent any generated primitive may have.
pub const MIN_EXTENT: f32 = 0.1;

/// Upper bound for `segments` and `rings` of curved primitives.
pub const MAX_TESSELLATION: u32 = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
    LineList,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CpuVertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
}

impl CpuVertex {
    fn new(pos: Vec3, normal: Vec3) -> Self {
        Self {
            pos: pos.to_array(),
            normal: normal.normalize_or_zero().to_array(),
        }
    }
}

/// CPU-side mesh data.
///
/// Contract:
/// - `vertices` + `indices` fully define geometry.
/// - `topology` is how indices are interpreted (3 per triangle or 2 per line).
#[derive(Debug, Clone)]
pub struct CpuMesh {
    pub vertices: Vec<CpuVertex>,
    pub indices: Vec<u32>,
    pub topology: PrimitiveTopology,
}

impl CpuMesh {
    pub fn triangles(vertices: Vec<CpuVertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            topology: PrimitiveTopology::TriangleList,
        }
    }

    pub fn lines(vertices: Vec<CpuVertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            topology: PrimitiveTopology::LineList,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    /// Number of triangles or line segments.
    pub fn primitive_count(&self) -> u32 {
        match self.topology {
            PrimitiveTopology::TriangleList => self.index_count() / 3,
            PrimitiveTopology::LineList => self.index_count() / 2,
        }
    }

    /// Axis-aligned bounds in object space, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut it = self.vertices.iter().map(|v| Vec3::from_array(v.pos));
        let first = it.next()?;
        Some(it.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

/// Sanitize a requested extent: non-finite becomes `fallback`, anything
/// smaller than `MIN_EXTENT` is raised to it.
pub fn clamp_extent(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.abs().max(MIN_EXTENT)
    } else {
        fallback.max(MIN_EXTENT)
    }
}

/// Procedural mesh constructors for clinical geometry.
///
/// Triangles wind counter-clockwise seen from outside.
pub struct MeshFactory;

impl MeshFactory {
    /// Ellipsoid centered at the origin with per-axis `radii`.
    ///
    /// `segments` slices around Y, `rings` stacks from pole to pole.
    pub fn ellipsoid(radii: Vec3, segments: u32, rings: u32) -> CpuMesh {
        let radii = Vec3::new(
            clamp_extent(radii.x, 1.0),
            clamp_extent(radii.y, 1.0),
            clamp_extent(radii.z, 1.0),
        );
        let segments = segments.clamp(3, MAX_TESSELLATION);
        let rings = rings.clamp(2, MAX_TESSELLATION);

        let mut vertices = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
        for r in 0..=rings {
            let phi = PI * r as f32 / rings as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            for s in 0..=segments {
                let theta = TAU * s as f32 / segments as f32;
                let (sin_theta, cos_theta) = theta.sin_cos();
                let unit = Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta);
                // Normal of an ellipsoid at p is p / r^2 per axis.
                let pos = unit * radii;
                let normal = pos / (radii * radii);
                vertices.push(CpuVertex::new(pos, normal));
            }
        }

        let stride = segments + 1;
        let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
        for r in 0..rings {
            for s in 0..segments {
                let a = r * stride + s;
                let b = a + stride;
                if r != 0 {
                    indices.extend_from_slice(&[a, b, a + 1]);
                }
                if r != rings - 1 {
                    indices.extend_from_slice(&[a + 1, b, b + 1]);
                }
            }
        }

        CpuMesh::triangles(vertices, indices)
    }

    /// Capped cylinder along Y, centered at the origin.
    pub fn cylinder(radius: f32, height: f32, segments: u32) -> CpuMesh {
        let radius = clamp_extent(radius, 1.0);
        let half = clamp_extent(height, 1.0) * 0.5;
        let segments = segments.clamp(3, MAX_TESSELLATION);

        let mut vertices = Vec::new();
        let mut indices = Vec::new();

        // Side wall.
        for s in 0..=segments {
            let theta = TAU * s as f32 / segments as f32;
            let (sin_t, cos_t) = theta.sin_cos();
            let n = Vec3::new(sin_t, 0.0, cos_t);
            vertices.push(CpuVertex::new(Vec3::new(n.x * radius, -half, n.z * radius), n));
            vertices.push(CpuVertex::new(Vec3::new(n.x * radius, half, n.z * radius), n));
        }
        for s in 0..segments {
            let bottom = s * 2;
            let top = bottom + 1;
            let next_bottom = bottom + 2;
            let next_top = bottom + 3;
            indices.extend_from_slice(&[bottom, next_bottom, top, top, next_bottom, next_top]);
        }

        // Caps: center vertex + rim, per side.
        for (y, normal) in [(half, Vec3::Y), (-half, Vec3::NEG_Y)] {
            let center = vertices.len() as u32;
            vertices.push(CpuVertex::new(Vec3::new(0.0, y, 0.0), normal));
            for s in 0..=segments {
                let theta = TAU * s as f32 / segments as f32;
                let (sin_t, cos_t) = theta.sin_cos();
                vertices.push(CpuVertex::new(
                    Vec3::new(sin_t * radius, y, cos_t * radius),
                    normal,
                ));
            }
            for s in 0..segments {
                let a = center + 1 + s;
                if normal.y > 0.0 {
                    indices.extend_from_slice(&[center, a, a + 1]);
                } else {
                    indices.extend_from_slice(&[center, a + 1, a]);
                }
            }
        }

        CpuMesh::triangles(vertices, indices)
    }

    /// Horizontal plane (XZ) facing +Y.
    pub fn plane(width: f32, depth: f32) -> CpuMesh {
        let hw = clamp_extent(width, 1.0) * 0.5;
        let hd = clamp_extent(depth, 1.0) * 0.5;
        let v = |x: f32, z: f32| CpuVertex::new(Vec3::new(x, 0.0, z), Vec3::Y);
        let vertices = vec![v(-hw, hd), v(hw, hd), v(hw, -hd), v(-hw, -hd)];
        CpuMesh::triangles(vertices, vec![0, 1, 2, 0, 2, 3])
    }

    /// Rectangle outline in the local XY plane (normal -Z).
    pub fn rectangle_outline(width: f32, height: f32) -> CpuMesh {
        let hw = clamp_extent(width, 1.0) * 0.5;
        let hh = clamp_extent(height, 1.0) * 0.5;
        let v = |x: f32, y: f32| CpuVertex::new(Vec3::new(x, y, 0.0), Vec3::NEG_Z);
        let vertices = vec![v(-hw, -hh), v(hw, -hh), v(hw, hh), v(-hw, hh)];
        CpuMesh::lines(vertices, vec![0, 1, 1, 2, 2, 3, 3, 0])
    }

    /// Single line segment.
    pub fn segment(from: Vec3, to: Vec3) -> CpuMesh {
        let dir = to - from;
        CpuMesh::lines(
            vec![CpuVertex::new(from, dir), CpuVertex::new(to, dir)],
            vec![0, 1],
        )
    }

    /// Three axis-aligned lines of length `size` crossing at the origin.
    pub fn crosshair(size: f32) -> CpuMesh {
        let h = clamp_extent(size, 1.0) * 0.5;
        let mut vertices = Vec::with_capacity(6);
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            vertices.push(CpuVertex::new(-axis * h, axis));
            vertices.push(CpuVertex::new(axis * h, axis));
        }
        CpuMesh::lines(vertices, vec![0, 1, 2, 3, 4, 5])
    }
}
