use galaxy_scene::{
    GalaxyConfig, data_structures::vertex::SpriteInstance, scene::GalaxyState,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub const SEED: u64 = 0x6a1a_c71c;

pub fn seeded_config(seed: u64) -> GalaxyConfig {
    GalaxyConfig {
        seed: Some(seed),
        ..Default::default()
    }
}

/// Builds the CPU side of the default scene with a fixed seed.
pub fn seeded_state(seed: u64) -> GalaxyState {
    let config = seeded_config(seed);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    GalaxyState::new(&config, &mut rng)
}

pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

pub fn length(p: [f32; 3]) -> f32 {
    (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()
}

pub fn star_length(star: &SpriteInstance) -> f32 {
    length(star.position)
}

/// Polar angle measured from +y.
pub fn polar_angle(p: [f32; 3]) -> f32 {
    (p[1] / length(p)).clamp(-1.0, 1.0).acos()
}

/// Share of samples per equal width bin over `[lo, hi)`.
pub fn histogram(values: impl IntoIterator<Item = f32>, bins: usize, lo: f32, hi: f32) -> Vec<f32> {
    let mut counts = vec![0usize; bins];
    let mut total = 0usize;
    for v in values {
        let bin = (((v - lo) / (hi - lo)) * bins as f32) as usize;
        counts[bin.min(bins - 1)] += 1;
        total += 1;
    }
    counts
        .into_iter()
        .map(|c| c as f32 / total as f32)
        .collect()
}
