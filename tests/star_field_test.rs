use std::f32::consts::{PI, TAU};

use galaxy_scene::{
    config::{MovingStarsConfig, StarLayerConfig},
    data_structures::vertex::SpriteInstance,
    stars::{MovingStars, StarLayer, point_on_sphere},
};

use crate::common::test_utils::{
    SEED, histogram, length, polar_angle, rng, seeded_state, star_length,
};

mod common;

#[test]
fn moving_stars_start_on_the_backdrop_sphere() {
    let state = seeded_state(SEED);
    assert_eq!(state.moving_stars.len(), 50);
    for star in state.moving_stars.positions() {
        assert!((star_length(star) - 150.0).abs() < 1e-3, "{star:?}");
    }
}

#[test]
fn star_layers_stay_inside_their_shell() {
    let state = seeded_state(SEED);
    let counts: Vec<_> = state
        .star_layers
        .iter()
        .map(|layer| layer.positions().len())
        .collect();
    assert_eq!(counts, vec![20, 5, 5]);
    for layer in &state.star_layers {
        for star in layer.positions() {
            let r = star_length(star);
            assert!((70.0 - 1e-3..149.0 + 1e-3).contains(&r), "radius {r}");
        }
    }
}

#[test]
fn empty_layer_is_allowed() {
    let config = StarLayerConfig {
        count: 0,
        min_radius: 70.0,
        max_radius: 149.0,
        size: 4.0,
        texture: "sprite1.png".into(),
    };
    let layer = StarLayer::new(&mut rng(SEED), &config);
    assert!(layer.positions().is_empty());
}

#[test]
fn polar_angle_follows_sine_density() {
    const SAMPLES: usize = 20_000;
    const BINS: usize = 10;
    let mut rng = rng(SEED);
    let angles: Vec<f32> = (0..SAMPLES)
        .map(|_| polar_angle(point_on_sphere(&mut rng, 1.0).into()))
        .collect();

    let shares = histogram(angles, BINS, 0.0, PI);
    let width = PI / BINS as f32;
    for (i, share) in shares.iter().enumerate() {
        let (a, b) = (i as f32 * width, (i + 1) as f32 * width);
        // integral of sin(phi) / 2 over the bin
        let expected = (a.cos() - b.cos()) / 2.0;
        assert!(
            (share - expected).abs() < 0.015,
            "bin {i}: {share} vs {expected}"
        );
    }
    // a uniform phi would put 10% in each polar bin
    assert!(shares[0] < 0.05 && shares[BINS - 1] < 0.05);
}

#[test]
fn azimuth_is_uniform() {
    let mut rng = rng(SEED + 1);
    let azimuths = (0..20_000).map(|_| {
        let p = point_on_sphere(&mut rng, 1.0);
        p.x.atan2(p.z).rem_euclid(TAU)
    });
    for share in histogram(azimuths, 8, 0.0, TAU) {
        assert!((share - 0.125).abs() < 0.015, "{share}");
    }
}

#[test]
fn stars_decay_geometrically_towards_the_centre() {
    let start = [90.0f32, -120.0, 0.0];
    let mut stars = MovingStars::from_positions(vec![SpriteInstance { position: start }], 50.0, 5.0);
    let mut previous = length(start);
    for n in 1..=200 {
        stars.step();
        let p = stars.positions()[0].position;
        let factor = (49.0f32 / 50.0).powi(n);
        for axis in 0..3 {
            let expected = start[axis] * factor;
            assert!(
                (p[axis] - expected).abs() <= 1e-3 * start[axis].abs().max(1.0),
                "frame {n}: {p:?}"
            );
            // never crosses the origin
            assert!(p[axis] * start[axis] >= 0.0);
        }
        let current = length(p);
        assert!(current < previous);
        previous = current;
    }
}

#[test]
fn stars_are_never_respawned() {
    let mut rng = rng(SEED);
    let mut stars = MovingStars::new(&mut rng, &MovingStarsConfig::default());
    for _ in 0..2000 {
        stars.step();
    }
    assert_eq!(stars.len(), 50);
    assert!(stars.positions().iter().all(|s| star_length(s) < 1e-6));
}
