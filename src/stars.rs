//! Star particles.
//!
//! Placement uses area-uniform sampling on a sphere: the azimuth `theta` is
//! drawn uniformly from `[0, 2pi)` and the polar angle as `phi = acos(2u - 1)`,
//! which gives `phi` the `sin(phi) / 2` density so points do not bunch up at
//! the poles.
//!
//! - [`MovingStars`] fall towards the origin, losing `1 / divisor` of their
//!   position every frame. They are never respawned.
//! - [`StarLayer`]s are static decorative clouds scattered through a shell.

use cgmath::Vector3;
use rand::Rng;

use crate::{
    config::{MovingStarsConfig, StarLayerConfig},
    data_structures::vertex::SpriteInstance,
};

/// A point on the sphere of the given `radius`, uniformly distributed by area.
pub fn point_on_sphere<R: Rng + ?Sized>(rng: &mut R, radius: f32) -> Vector3<f32> {
    let theta = rng.random::<f32>() * std::f32::consts::TAU;
    let phi = (2.0 * rng.random::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
    spherical_to_cartesian(radius, theta, phi)
}

/// A point at a uniformly drawn distance in `[min_radius, max_radius)` from the
/// origin, uniformly distributed over the directions.
pub fn point_in_shell<R: Rng + ?Sized>(
    rng: &mut R,
    min_radius: f32,
    max_radius: f32,
) -> Vector3<f32> {
    let radius = if max_radius > min_radius {
        rng.random_range(min_radius..max_radius)
    } else {
        min_radius
    };
    point_on_sphere(rng, radius)
}

/// `theta` is the azimuth around the y axis, `phi` the angle from +y.
pub fn spherical_to_cartesian(radius: f32, theta: f32, phi: f32) -> Vector3<f32> {
    let sin_phi = phi.sin();
    Vector3::new(
        radius * sin_phi * theta.sin(),
        radius * phi.cos(),
        radius * sin_phi * theta.cos(),
    )
}

/// Stars that drift towards the centre by first order relaxation.
#[derive(Clone, Debug)]
pub struct MovingStars {
    positions: Vec<SpriteInstance>,
    divisor: f32,
    pub size: f32,
}

impl MovingStars {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, config: &MovingStarsConfig) -> Self {
        let positions = (0..config.count)
            .map(|_| point_on_sphere(rng, config.radius).into())
            .collect();
        Self::from_positions(positions, config.decay_divisor, config.size)
    }

    pub fn from_positions(positions: Vec<SpriteInstance>, divisor: f32, size: f32) -> Self {
        Self {
            positions,
            divisor: divisor.max(1.0),
            size,
        }
    }

    /// One frame of `p += (0 - p) / divisor` on every axis.
    pub fn step(&mut self) {
        let divisor = self.divisor;
        for star in &mut self.positions {
            for axis in &mut star.position {
                *axis += (0.0 - *axis) / divisor;
            }
        }
    }

    pub fn positions(&self) -> &[SpriteInstance] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// A static decorative point cloud.
#[derive(Clone, Debug)]
pub struct StarLayer {
    positions: Vec<SpriteInstance>,
    pub size: f32,
}

impl StarLayer {
    pub fn new<R: Rng + ?Sized>(rng: &mut R, config: &StarLayerConfig) -> Self {
        let positions = (0..config.count)
            .map(|_| point_in_shell(rng, config.min_radius, config.max_radius).into())
            .collect();
        Self {
            positions,
            size: config.size,
        }
    }

    pub fn positions(&self) -> &[SpriteInstance] {
        &self.positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn length(s: &SpriteInstance) -> f32 {
        Vector3::from(s.position).magnitude()
    }

    #[test]
    fn test_moving_stars_start_on_sphere() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let stars = MovingStars::new(&mut rng, &MovingStarsConfig::default());
        assert_eq!(stars.len(), 50);
        for star in stars.positions() {
            assert!((length(star) - 150.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_layer_within_shell() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let config = StarLayerConfig {
            count: 500,
            min_radius: 70.0,
            max_radius: 149.0,
            size: 1.0,
            texture: String::new(),
        };
        let layer = StarLayer::new(&mut rng, &config);
        assert_eq!(layer.positions().len(), 500);
        for star in layer.positions() {
            let r = length(star);
            assert!(r >= 70.0 - 1e-3 && r < 149.0 + 1e-3, "radius {r}");
        }
    }

    #[test]
    fn test_step_decays_by_49_over_50() {
        let start = SpriteInstance {
            position: [100.0, -50.0, 25.0],
        };
        let mut stars = MovingStars::from_positions(vec![start], 50.0, 1.0);
        stars.step();
        let p = stars.positions()[0].position;
        assert!((p[0] - 98.0).abs() < 1e-4);
        assert!((p[1] + 49.0).abs() < 1e-4);
        assert!((p[2] - 24.5).abs() < 1e-4);
    }

    #[test]
    fn test_degenerate_shell_collapses_to_sphere() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let p = point_in_shell(&mut rng, 10.0, 10.0);
        assert!((p.magnitude() - 10.0).abs() < 1e-4);
    }
}
