//! Procedural sphere meshes.
//!
//! - [`icosahedron`] builds the nucleus: an icosahedron whose faces are split
//!   into a triangular grid of `detail + 1` segments per edge and projected
//!   onto the sphere.
//! - [`uv_sphere`] builds the latitude/longitude sphere used as the galaxy
//!   backdrop.
//!
//! Both produce outward facing, counter-clockwise triangles.

use std::collections::HashMap;

use cgmath::{InnerSpace, Vector3, Zero};

use crate::data_structures::vertex::MeshVertex;

/// CPU-side mesh: a fixed-length vertex buffer plus triangle indices.
#[derive(Clone, Debug, Default)]
pub struct Geometry {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    /// For vertices duplicated along the texture seam, the index of the vertex
    /// they were copied from. Empty when nothing was duplicated.
    pub seam_sources: Vec<u32>,
}

impl Geometry {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Smooth normals from the current positions, shared across seam copies.
    pub fn recompute_normals(&mut self) {
        recompute_normals(&mut self.vertices, &self.indices, &self.seam_sources);
    }
}

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn icosahedron_corners() -> [Vector3<f32>; 12] {
    let t = (1.0 + 5.0_f32.sqrt()) / 2.0;
    [
        Vector3::new(-1.0, t, 0.0),
        Vector3::new(1.0, t, 0.0),
        Vector3::new(-1.0, -t, 0.0),
        Vector3::new(1.0, -t, 0.0),
        Vector3::new(0.0, -1.0, t),
        Vector3::new(0.0, 1.0, t),
        Vector3::new(0.0, -1.0, -t),
        Vector3::new(0.0, 1.0, -t),
        Vector3::new(t, 0.0, -1.0),
        Vector3::new(t, 0.0, 1.0),
        Vector3::new(-t, 0.0, -1.0),
        Vector3::new(-t, 0.0, 1.0),
    ]
    .map(|c| c.normalize())
}

/// Equirectangular texture coordinates for a point on the unit sphere.
fn sphere_uv(dir: Vector3<f32>) -> [f32; 2] {
    let u = 0.5 + dir.z.atan2(dir.x) / std::f32::consts::TAU;
    let v = 0.5 - dir.y.clamp(-1.0, 1.0).asin() / std::f32::consts::PI;
    [u, v]
}

/// Splits shared vertices where a triangle wraps around the `u = 0 / 1` seam
/// or touches a pole, so that no triangle interpolates across the whole texture.
///
/// The sampler repeats in `u`, so a copy with `u` shifted by a whole turn shows
/// the same texels.
struct SeamFixer {
    /// Copy of a vertex with its `u` shifted by the given number of turns.
    wrapped: HashMap<(u32, i8), u32>,
    sources: Vec<u32>,
}

impl SeamFixer {
    const POLE: f32 = 1.0e-5;

    fn new(vertex_count: usize) -> Self {
        Self {
            wrapped: HashMap::new(),
            sources: (0..vertex_count as u32).collect(),
        }
    }

    fn duplicate(&mut self, vertices: &mut Vec<MeshVertex>, idx: u32, u: f32) -> u32 {
        let mut vertex = vertices[idx as usize];
        vertex.tex_coords[0] = u;
        vertices.push(vertex);
        self.sources.push(self.sources[idx as usize]);
        vertices.len() as u32 - 1
    }

    fn is_pole(vertex: &MeshVertex) -> bool {
        vertex.normal[0].abs() < Self::POLE && vertex.normal[2].abs() < Self::POLE
    }

    /// Whole turn offsets for the corners that give the narrowest `u` range,
    /// preferring to leave corners untouched.
    fn turns(us: [f32; 3], poles: [bool; 3]) -> [i8; 3] {
        let mut best = ([0i8; 3], f32::MAX, usize::MAX);
        for code in 0..27 {
            let turns = [code % 3, code / 3 % 3, code / 9].map(|t| t as i8 - 1);
            if (0..3).any(|k| poles[k] && turns[k] != 0) {
                continue;
            }
            let shifted: Vec<f32> = (0..3)
                .filter(|&k| !poles[k])
                .map(|k| us[k] + turns[k] as f32)
                .collect();
            let span = shifted.iter().copied().fold(f32::MIN, f32::max)
                - shifted.iter().copied().fold(f32::MAX, f32::min);
            let moved = turns.iter().filter(|&&t| t != 0).count();
            if span < best.1 - 1.0e-6 || (span <= best.1 + 1.0e-6 && moved < best.2) {
                best = (turns, span, moved);
            }
        }
        best.0
    }

    fn fix(&mut self, vertices: &mut Vec<MeshVertex>, mut tri: [u32; 3]) -> [u32; 3] {
        let poles = tri.map(|i| Self::is_pole(&vertices[i as usize]));
        let us = tri.map(|i| vertices[i as usize].tex_coords[0]);

        for (k, turns) in Self::turns(us, poles).into_iter().enumerate() {
            if turns == 0 {
                continue;
            }
            let idx = tri[k];
            tri[k] = match self.wrapped.get(&(idx, turns)) {
                Some(&copy) => copy,
                None => {
                    let copy = self.duplicate(vertices, idx, us[k] + turns as f32);
                    self.wrapped.insert((idx, turns), copy);
                    copy
                }
            };
        }

        // A pole has no longitude of its own; give it the one of its triangle
        for k in (0..3).filter(|&k| poles[k]) {
            let others: Vec<f32> = (0..3)
                .filter(|&o| !poles[o])
                .map(|o| vertices[tri[o] as usize].tex_coords[0])
                .collect();
            if others.is_empty() {
                continue;
            }
            let u = others.iter().sum::<f32>() / others.len() as f32;
            tri[k] = self.duplicate(vertices, tri[k], u);
        }
        tri
    }
}

/// Deduplicates vertices that land on the same spot of the sphere, so that
/// neighbouring faces share their edge vertices.
struct VertexWelder {
    radius: f32,
    lookup: HashMap<[i64; 3], u32>,
    vertices: Vec<MeshVertex>,
}

impl VertexWelder {
    const CELLS_PER_UNIT: f32 = 1.0e3;
    const TOLERANCE: f32 = 1.0e-4;

    fn cell(dir: Vector3<f32>) -> [i64; 3] {
        [
            (dir.x * Self::CELLS_PER_UNIT).floor() as i64,
            (dir.y * Self::CELLS_PER_UNIT).floor() as i64,
            (dir.z * Self::CELLS_PER_UNIT).floor() as i64,
        ]
    }

    fn find(&self, dir: Vector3<f32>) -> Option<u32> {
        let [cx, cy, cz] = Self::cell(dir);
        // The same point computed along two different edges may land in a
        // neighbouring cell, so look around.
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(&idx) = self.lookup.get(&[cx + dx, cy + dy, cz + dz]) else {
                        continue;
                    };
                    let other = position(&self.vertices, idx) / self.radius;
                    if (other - dir).magnitude() < Self::TOLERANCE {
                        return Some(idx);
                    }
                }
            }
        }
        None
    }

    fn weld(&mut self, dir: Vector3<f32>) -> u32 {
        let dir = dir.normalize();
        if let Some(idx) = self.find(dir) {
            return idx;
        }
        let key = Self::cell(dir);
        let idx = self.vertices.len() as u32;
        self.vertices.push(MeshVertex {
            position: (dir * self.radius).into(),
            normal: dir.into(),
            tex_coords: sphere_uv(dir),
        });
        self.lookup.insert(key, idx);
        idx
    }
}

/// Builds an icosphere of the given `radius` where each of the 20 faces is cut
/// into `(detail + 1)^2` triangles.
///
/// `detail = 0` is the plain icosahedron; `detail = 10` gives 2420 triangles
/// and `10 * 11^2 + 2` distinct vertices.
pub fn icosahedron(radius: f32, detail: u32) -> Geometry {
    let corners = icosahedron_corners();
    let cols = detail as usize + 1;
    let mut welder = VertexWelder {
        radius,
        lookup: HashMap::new(),
        vertices: Vec::new(),
    };
    let mut indices = Vec::with_capacity(20 * cols * cols * 3);

    for face in ICOSAHEDRON_FACES {
        let (a, b, c) = (corners[face[0]], corners[face[1]], corners[face[2]]);

        // grid[i][j]: row i walks from edge ab towards corner c
        let mut grid: Vec<Vec<u32>> = Vec::with_capacity(cols + 1);
        for i in 0..=cols {
            let f = i as f32 / cols as f32;
            let aj = a + (c - a) * f;
            let bj = b + (c - b) * f;
            let rows = cols - i;
            let row = (0..=rows)
                .map(|j| {
                    let p = if rows == 0 {
                        aj
                    } else {
                        aj + (bj - aj) * (j as f32 / rows as f32)
                    };
                    welder.weld(p)
                })
                .collect();
            grid.push(row);
        }

        for i in 0..cols {
            for j in 0..(2 * (cols - i) - 1) {
                let k = j / 2;
                let tri = if j % 2 == 0 {
                    [grid[i][k + 1], grid[i + 1][k], grid[i][k]]
                } else {
                    [grid[i][k + 1], grid[i + 1][k + 1], grid[i + 1][k]]
                };
                push_outward(&welder.vertices, &mut indices, tri);
            }
        }
    }

    let mut vertices = welder.vertices;
    let mut seams = SeamFixer::new(vertices.len());
    for tri in indices.chunks_exact_mut(3) {
        let fixed = seams.fix(&mut vertices, [tri[0], tri[1], tri[2]]);
        tri.copy_from_slice(&fixed);
    }

    Geometry {
        vertices,
        indices,
        seam_sources: seams.sources,
    }
}

/// Builds a latitude/longitude sphere.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let width_segments = width_segments.max(3);
    let height_segments = height_segments.max(2);
    let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);

    for y in 0..=height_segments {
        let v = y as f32 / height_segments as f32;
        let polar = v * std::f32::consts::PI;
        for x in 0..=width_segments {
            let u = x as f32 / width_segments as f32;
            let azimuth = u * std::f32::consts::TAU;
            let dir = Vector3::new(
                -azimuth.cos() * polar.sin(),
                polar.cos(),
                azimuth.sin() * polar.sin(),
            );
            vertices.push(MeshVertex {
                position: (dir * radius).into(),
                normal: dir.into(),
                tex_coords: [u, v],
            });
        }
    }

    let stride = width_segments + 1;
    let mut indices = Vec::new();
    for y in 0..height_segments {
        for x in 0..width_segments {
            let a = y * stride + x + 1;
            let b = y * stride + x;
            let c = (y + 1) * stride + x;
            let d = (y + 1) * stride + x + 1;
            // The pole rows collapse to a single point, skip the degenerate half
            if y != 0 {
                push_outward(&vertices, &mut indices, [a, b, d]);
            }
            if y != height_segments - 1 {
                push_outward(&vertices, &mut indices, [b, c, d]);
            }
        }
    }

    Geometry {
        vertices,
        indices,
        ..Default::default()
    }
}

fn position(vertices: &[MeshVertex], idx: u32) -> Vector3<f32> {
    vertices[idx as usize].position.into()
}

fn push_outward(vertices: &[MeshVertex], indices: &mut Vec<u32>, [a, b, c]: [u32; 3]) {
    let (pa, pb, pc) = (
        position(vertices, a),
        position(vertices, b),
        position(vertices, c),
    );
    let normal = (pb - pa).cross(pc - pa);
    if normal.dot(pa + pb + pc) < 0.0 {
        indices.extend_from_slice(&[a, c, b]);
    } else {
        indices.extend_from_slice(&[a, b, c]);
    }
}

/// Recomputes smooth vertex normals from the current positions.
///
/// Face normals are accumulated area weighted on every corner and normalised.
/// `seam_sources` maps seam copies to their original vertex so both halves of
/// a split vertex get the same normal; pass an empty slice if there are none.
/// Vertices that belong to no (or only degenerate) triangles fall back to
/// their radial direction.
pub fn recompute_normals(vertices: &mut [MeshVertex], indices: &[u32], seam_sources: &[u32]) {
    let source = |idx: usize| seam_sources.get(idx).map_or(idx, |&s| s as usize);
    let mut acc = vec![Vector3::<f32>::zero(); vertices.len()];
    for tri in indices.chunks_exact(3) {
        let pa = position(vertices, tri[0]);
        let pb = position(vertices, tri[1]);
        let pc = position(vertices, tri[2]);
        let face = (pb - pa).cross(pc - pa);
        for &idx in tri {
            acc[source(idx as usize)] += face;
        }
    }
    let acc: Vec<_> = (0..vertices.len()).map(|i| acc[source(i)]).collect();
    for (vertex, normal) in vertices.iter_mut().zip(acc) {
        let normal = if normal.magnitude2() > f32::EPSILON {
            normal.normalize()
        } else {
            let p: Vector3<f32> = vertex.position.into();
            if p.magnitude2() > f32::EPSILON {
                p.normalize()
            } else {
                Vector3::unit_y()
            }
        };
        vertex.normal = normal.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icosahedron_detail_counts() {
        let mesh = icosahedron(30.0, 10);
        assert_eq!(mesh.triangle_count(), 20 * 11 * 11);
        assert_eq!(distinct_positions(&mesh), 10 * 11 * 11 + 2);

        let plain = icosahedron(1.0, 0);
        assert_eq!(plain.triangle_count(), 20);
        assert_eq!(distinct_positions(&plain), 12);
    }

    fn distinct_positions(mesh: &Geometry) -> usize {
        let mut sources = mesh.seam_sources.clone();
        sources.sort();
        sources.dedup();
        sources.len()
    }

    fn max_u_span(mesh: &Geometry) -> f32 {
        mesh.indices
            .chunks_exact(3)
            .map(|tri| {
                let us = [0, 1, 2].map(|k| mesh.vertices[tri[k] as usize].tex_coords[0]);
                us.iter().copied().fold(f32::MIN, f32::max) - us.iter().copied().fold(f32::MAX, f32::min)
            })
            .fold(0.0, f32::max)
    }

    #[test]
    fn test_no_triangle_wraps_around_the_texture() {
        // detail 1 puts vertices on both poles, detail 10 does not
        for mesh in [icosahedron(30.0, 10), icosahedron(30.0, 1), icosahedron(1.0, 0)] {
            assert!(max_u_span(&mesh) <= 0.5, "span {}", max_u_span(&mesh));
        }
    }

    #[test]
    fn test_seam_copies_share_position_and_normal() {
        let mut mesh = icosahedron(30.0, 10);
        assert_eq!(mesh.seam_sources.len(), mesh.vertices.len());
        assert!(mesh.vertices.len() > 10 * 11 * 11 + 2, "seam left unsplit");
        mesh.vertices.iter_mut().for_each(|v| v.normal = [0.0; 3]);
        mesh.recompute_normals();
        for (i, &src) in mesh.seam_sources.iter().enumerate() {
            let (copy, original) = (mesh.vertices[i], mesh.vertices[src as usize]);
            assert_eq!(copy.position, original.position);
            assert_eq!(copy.normal, original.normal);
        }
    }

    #[test]
    fn test_icosahedron_vertices_on_radius() {
        let mesh = icosahedron(30.0, 4);
        for v in &mesh.vertices {
            let len = Vector3::from(v.position).magnitude();
            assert!((len - 30.0).abs() < 1e-3, "vertex off sphere: {len}");
        }
    }

    #[test]
    fn test_triangles_face_outward() {
        for mesh in [icosahedron(5.0, 3), uv_sphere(5.0, 12, 8)] {
            for tri in mesh.indices.chunks_exact(3) {
                let pa = position(&mesh.vertices, tri[0]);
                let pb = position(&mesh.vertices, tri[1]);
                let pc = position(&mesh.vertices, tri[2]);
                let n = (pb - pa).cross(pc - pa);
                assert!(n.dot(pa + pb + pc) >= 0.0);
            }
        }
    }

    #[test]
    fn test_indices_in_bounds() {
        let mesh = uv_sphere(150.0, 40, 40);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
        assert_eq!(mesh.vertices.len(), 41 * 41);
    }

    #[test]
    fn test_recomputed_normals_point_outward_on_sphere() {
        let mut mesh = icosahedron(10.0, 2);
        mesh.vertices.iter_mut().for_each(|v| v.normal = [0.0; 3]);
        mesh.recompute_normals();
        for v in &mesh.vertices {
            let radial = Vector3::from(v.position).normalize();
            let normal = Vector3::from(v.normal);
            assert!((normal.magnitude() - 1.0).abs() < 1e-4);
            assert!(normal.dot(radial) > 0.9);
        }
    }
}
