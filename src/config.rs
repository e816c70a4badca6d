//! Scene configuration.
//!
//! Every tunable of the galaxy lives here. [`GalaxyConfig::default`] yields the
//! stock scene; callers may tweak fields before handing the config to
//! [`crate::flow::run`]. There is no file or environment layer: the running app
//! owns its config for its whole lifetime.

use instant::Duration;

/// DOM id of the element the renderer mounts into on the web.
pub const DEFAULT_MOUNT_ID: &str = "container";

#[derive(Clone, Debug)]
pub struct NucleusConfig {
    pub radius: f32,
    /// Icosahedron detail: every face is split into `(detail + 1)^2` triangles.
    pub detail: u32,
    /// Multiplier applied to the raw noise sample before displacement.
    pub blob_scale: f64,
    /// Per-axis phase speed in noise units per millisecond.
    pub time_factors: [f64; 3],
    pub texture: String,
}

impl Default for NucleusConfig {
    fn default() -> Self {
        Self {
            radius: 30.0,
            detail: 10,
            blob_scale: 3.0,
            time_factors: [0.0005, 0.0003, 0.0008],
            texture: "nucleus.jpg".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BackgroundConfig {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    /// Radians added to each euler axis every frame.
    pub rotation_per_frame: f32,
    pub texture: String,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            radius: 150.0,
            width_segments: 40,
            height_segments: 40,
            rotation_per_frame: 0.002,
            texture: "galaxy.png".to_string(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MovingStarsConfig {
    pub count: usize,
    pub radius: f32,
    /// Each frame a star moves `1 / decay_divisor` of the way to the origin.
    pub decay_divisor: f32,
    pub size: f32,
    pub texture: String,
}

impl Default for MovingStarsConfig {
    fn default() -> Self {
        Self {
            count: 50,
            radius: 150.0,
            decay_divisor: 50.0,
            size: 5.0,
            texture: "star.png".to_string(),
        }
    }
}

/// A decorative, static point cloud.
#[derive(Clone, Debug)]
pub struct StarLayerConfig {
    pub count: usize,
    pub min_radius: f32,
    pub max_radius: f32,
    pub size: f32,
    pub texture: String,
}

#[derive(Clone, Debug)]
pub struct OrbitConfig {
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Farthest the orbit target may be panned away from the origin. Together
    /// with `max_distance` it keeps the camera inside the backdrop sphere.
    pub pan_limit: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            distance: 120.0,
            min_distance: 40.0,
            max_distance: 140.0,
            damping_factor: 0.05,
            auto_rotate: true,
            auto_rotate_speed: 0.5,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            pan_limit: 9.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct GalaxyConfig {
    pub mount_id: String,
    pub nucleus: NucleusConfig,
    pub background: BackgroundConfig,
    pub moving_stars: MovingStarsConfig,
    pub star_layers: Vec<StarLayerConfig>,
    pub orbit: OrbitConfig,
    pub fov_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub resize_debounce: Duration,
    pub clear_colour: wgpu::Color,
    /// Fixed seed for reproducible star placement; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for GalaxyConfig {
    fn default() -> Self {
        let layer = |count, size, texture: &str| StarLayerConfig {
            count,
            min_radius: 70.0,
            max_radius: 149.0,
            size,
            texture: texture.to_string(),
        };
        Self {
            mount_id: DEFAULT_MOUNT_ID.to_string(),
            nucleus: NucleusConfig::default(),
            background: BackgroundConfig::default(),
            moving_stars: MovingStarsConfig::default(),
            star_layers: vec![
                layer(20, 4.0, "sprite1.png"),
                layer(5, 7.0, "sprite2.png"),
                layer(5, 10.0, "sprite3.png"),
            ],
            orbit: OrbitConfig::default(),
            fov_degrees: 55.0,
            znear: 0.01,
            zfar: 1000.0,
            resize_debounce: Duration::from_millis(80),
            clear_colour: wgpu::Color::BLACK,
            seed: None,
        }
    }
}

impl GalaxyConfig {
    /// All texture paths in load order, tagged with the material they feed.
    pub fn textures(&self) -> Vec<(crate::scene::TextureSlot, String)> {
        use crate::scene::TextureSlot;
        let mut textures = vec![
            (TextureSlot::Background, self.background.texture.clone()),
            (TextureSlot::Nucleus, self.nucleus.texture.clone()),
            (TextureSlot::MovingStars, self.moving_stars.texture.clone()),
        ];
        textures.extend(
            self.star_layers
                .iter()
                .enumerate()
                .map(|(i, layer)| (TextureSlot::StarLayer(i), layer.texture.clone())),
        );
        textures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layers_match_scene_description() {
        let config = GalaxyConfig::default();
        let counts: Vec<_> = config.star_layers.iter().map(|l| l.count).collect();
        assert_eq!(counts, vec![20, 5, 5]);
        assert_eq!(config.moving_stars.count, 50);
        assert_eq!(config.resize_debounce, Duration::from_millis(80));
    }

    #[test]
    fn test_camera_stays_inside_backdrop() {
        let config = GalaxyConfig::default();
        let reach = config.orbit.pan_limit + config.orbit.max_distance;
        assert!(reach < config.background.radius);
        assert!(config.orbit.distance <= config.orbit.max_distance);
    }

    #[test]
    fn test_six_textures_are_requested() {
        let config = GalaxyConfig::default();
        let textures = config.textures();
        assert_eq!(textures.len(), 6);
        let mut paths: Vec<_> = textures.iter().map(|(_, p)| p.as_str()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), 6, "every material uses its own image");
    }
}
