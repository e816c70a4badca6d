//! The breathing nucleus.
//!
//! Every frame each vertex is pushed along its own position vector by a 3D
//! simplex noise sample taken at the rest position shifted by a time dependent
//! phase:
//!
//! ```text
//! n      = noise(x0 + t * fx, y0 + t * fy, z0 + t * fz)
//! offset = n * blob_scale
//! p      = p0 * (1 + offset)
//! ```
//!
//! `t` is in milliseconds. The rest positions are kept so that the surface
//! never accumulates drift; only the working vertex buffer is rewritten.

use noise::{NoiseFn, Simplex};

use crate::{
    config::NucleusConfig,
    data_structures::geometry::{self, Geometry},
};

/// Displaces one rest position for time `t_ms`.
pub fn displace<N: NoiseFn<f64, 3>>(
    noise: &N,
    rest: [f32; 3],
    t_ms: f64,
    time_factors: [f64; 3],
    blob_scale: f64,
) -> [f32; 3] {
    let [x, y, z] = rest.map(f64::from);
    let sample = noise.get([
        x + t_ms * time_factors[0],
        y + t_ms * time_factors[1],
        z + t_ms * time_factors[2],
    ]);
    let factor = 1.0 + sample * blob_scale;
    [
        (x * factor) as f32,
        (y * factor) as f32,
        (z * factor) as f32,
    ]
}

pub struct Nucleus<N = Simplex> {
    rest: Vec<[f32; 3]>,
    geometry: Geometry,
    noise: N,
    blob_scale: f64,
    time_factors: [f64; 3],
    needs_update: bool,
}

impl Nucleus<Simplex> {
    pub fn new(config: &NucleusConfig, seed: u32) -> Self {
        let geometry = geometry::icosahedron(config.radius, config.detail);
        Self::with_noise(geometry, Simplex::new(seed), config)
    }
}

impl<N: NoiseFn<f64, 3>> Nucleus<N> {
    pub fn with_noise(geometry: Geometry, noise: N, config: &NucleusConfig) -> Self {
        let rest = geometry.vertices.iter().map(|v| v.position).collect();
        Self {
            rest,
            geometry,
            noise,
            blob_scale: config.blob_scale,
            time_factors: config.time_factors,
            needs_update: false,
        }
    }

    /// Rewrites every vertex for time `t_ms` and flags the buffer for upload.
    ///
    /// Normals are recomputed only once all positions are final.
    pub fn deform(&mut self, t_ms: f64) {
        for (vertex, rest) in self.geometry.vertices.iter_mut().zip(&self.rest) {
            vertex.position = displace(
                &self.noise,
                *rest,
                t_ms,
                self.time_factors,
                self.blob_scale,
            );
        }
        self.geometry.recompute_normals();
        self.needs_update = true;
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn rest_positions(&self) -> &[[f32; 3]] {
        &self.rest
    }

    /// Returns whether the buffer changed since the last call, and clears the flag.
    pub fn take_needs_update(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }
}
