use galaxy_scene::{
    config::NucleusConfig,
    nucleus::{Nucleus, displace},
};
use noise::Simplex;

use crate::common::test_utils::{SEED, length, seeded_state};

mod common;

#[test]
fn origin_never_moves() {
    let config = NucleusConfig::default();
    let noise = Simplex::new(3);
    for frame in 0..600 {
        let t_ms = frame as f64 * 16.6;
        let p = displace(&noise, [0.0; 3], t_ms, config.time_factors, config.blob_scale);
        assert_eq!(p, [0.0; 3]);
    }
}

#[test]
fn default_nucleus_is_a_detailed_icosahedron() {
    let nucleus = Nucleus::new(&NucleusConfig::default(), 1);
    // 20 faces, each split into (detail + 1)^2 triangles
    assert_eq!(nucleus.geometry().triangle_count(), 20 * 11 * 11);
    for rest in nucleus.rest_positions() {
        assert!((length(*rest) - 30.0).abs() < 1e-3);
    }
}

#[test]
fn deformation_is_radial_and_rebuilt_from_rest() {
    let mut state = seeded_state(SEED);
    state.advance(1_000.0);
    let first: Vec<_> = state
        .nucleus
        .geometry()
        .vertices
        .iter()
        .map(|v| v.position)
        .collect();

    for _ in 0..10 {
        state.advance(5_000.0);
    }
    state.advance(1_000.0);

    let nucleus = &mut state.nucleus;
    assert!(nucleus.take_needs_update());
    assert!(!nucleus.take_needs_update());
    for ((vertex, rest), before) in nucleus
        .geometry()
        .vertices
        .iter()
        .zip(nucleus.rest_positions())
        .zip(&first)
    {
        // same time, same surface
        assert_eq!(vertex.position, *before);
        // p = p0 * k for a scalar k
        let k = length(vertex.position) / length(*rest);
        let cross = [
            rest[1] * vertex.position[2] - rest[2] * vertex.position[1],
            rest[2] * vertex.position[0] - rest[0] * vertex.position[2],
            rest[0] * vertex.position[1] - rest[1] * vertex.position[0],
        ];
        assert!(length(cross) <= 1e-2 * length(*rest) * length(*rest) * k.max(1.0));
        assert!(vertex.normal.iter().all(|c| c.is_finite()));
    }
}

#[test]
fn backdrop_spins_every_frame() {
    let mut state = seeded_state(SEED);
    for _ in 0..100 {
        state.advance(0.0);
    }
    let r = state.spin.rotation;
    for axis in [r.x, r.y, r.z] {
        assert!((axis - 0.2).abs() < 1e-4);
    }
}
