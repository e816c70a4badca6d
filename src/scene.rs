//! The galaxy scene context.
//!
//! [`GalaxyState`] is the CPU side of the scene: nucleus geometry, backdrop
//! rotation and the star particles. [`GalaxyScene`] owns that state together
//! with every GPU buffer, texture and bind group it needs. It is built once
//! after the GPU context exists, mutated once per frame by
//! [`GalaxyScene::update`] and released when dropped.

use cgmath::{Matrix4, Rad, Vector3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wgpu::util::DeviceExt;

use crate::{
    config::GalaxyConfig,
    context::Context,
    data_structures::{geometry, texture::Texture, vertex::SpriteInstance},
    nucleus::Nucleus,
    pipelines::{basic::ObjectUniform, sprite::SpriteUniform},
    render::{Mesh, Render, Sprites},
    stars::{MovingStars, StarLayer},
};

/// Which material an incoming image belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Background,
    Nucleus,
    MovingStars,
    StarLayer(usize),
}

/// Constant spin of the backdrop around all three axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spin {
    pub rotation: Vector3<f32>,
    pub step: f32,
}

impl Spin {
    pub fn new(step: f32) -> Self {
        Self {
            rotation: Vector3::new(0.0, 0.0, 0.0),
            step,
        }
    }

    pub fn advance(&mut self) {
        self.rotation += Vector3::new(self.step, self.step, self.step);
    }

    /// Euler rotation applied in x, y, z order.
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
    }
}

pub struct GalaxyState {
    pub nucleus: Nucleus,
    pub spin: Spin,
    pub moving_stars: MovingStars,
    pub star_layers: Vec<StarLayer>,
}

impl GalaxyState {
    pub fn new<R: Rng + ?Sized>(config: &GalaxyConfig, rng: &mut R) -> Self {
        let nucleus = Nucleus::new(&config.nucleus, rng.random());
        let moving_stars = MovingStars::new(rng, &config.moving_stars);
        let star_layers = config
            .star_layers
            .iter()
            .map(|layer| StarLayer::new(rng, layer))
            .collect();
        Self {
            nucleus,
            spin: Spin::new(config.background.rotation_per_frame),
            moving_stars,
            star_layers,
        }
    }

    /// One frame of simulation at `t_ms` milliseconds.
    pub fn advance(&mut self, t_ms: f64) {
        self.spin.advance();
        self.nucleus.deform(t_ms);
        self.moving_stars.step();
    }
}

/// Random source for star placement: seeded if the config asks for it.
pub fn scene_rng(config: &GalaxyConfig) -> ChaCha8Rng {
    let seed = config.seed.unwrap_or_else(|| rand::rng().random());
    log::info!("placing stars with seed {seed}");
    ChaCha8Rng::seed_from_u64(seed)
}

struct Material {
    #[allow(unused)]
    texture: Texture,
    bind_group: wgpu::BindGroup,
}

impl Material {
    fn new(ctx: &Context, texture: Texture, label: &str) -> Self {
        let sampler = texture
            .sampler
            .clone()
            .unwrap_or_else(|| crate::data_structures::texture::create_default_sampler(&ctx.device));
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &ctx.layouts.texture,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some(label),
        });
        Self {
            texture,
            bind_group,
        }
    }

    fn placeholder(ctx: &Context, label: &str) -> Self {
        Self::new(ctx, Texture::placeholder(&ctx.device, &ctx.queue), label)
    }
}

fn uniform_bind_group<T: bytemuck::Pod>(
    ctx: &Context,
    layout: &wgpu::BindGroupLayout,
    value: T,
    label: &str,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = ctx
        .device
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[value]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
    let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some(label),
    });
    (buffer, bind_group)
}

struct MeshObject {
    vertex: wgpu::Buffer,
    index: wgpu::Buffer,
    amount: u32,
    object: wgpu::Buffer,
    object_bind_group: wgpu::BindGroup,
    material: Material,
}

impl MeshObject {
    fn new(ctx: &Context, geometry: &geometry::Geometry, label: &str) -> Self {
        let vertex = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Vertex Buffer")),
                contents: bytemuck::cast_slice(&geometry.vertices),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        let index = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Index Buffer")),
                contents: bytemuck::cast_slice(&geometry.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
        use cgmath::SquareMatrix;
        let (object, object_bind_group) = uniform_bind_group(
            ctx,
            &ctx.layouts.object,
            ObjectUniform {
                model: Matrix4::identity().into(),
            },
            &format!("{label} Object"),
        );
        Self {
            vertex,
            index,
            amount: geometry.indices.len() as u32,
            object,
            object_bind_group,
            material: Material::placeholder(ctx, label),
        }
    }

    fn as_mesh(&self) -> Mesh<'_> {
        Mesh {
            vertex: &self.vertex,
            index: &self.index,
            amount: self.amount,
            material: &self.material.bind_group,
            object: &self.object_bind_group,
        }
    }
}

struct SpriteObject {
    instance: wgpu::Buffer,
    amount: u32,
    #[allow(unused)]
    params: wgpu::Buffer,
    params_bind_group: wgpu::BindGroup,
    material: Material,
}

impl SpriteObject {
    fn new(ctx: &Context, positions: &[SpriteInstance], size: f32, label: &str) -> Self {
        let instance = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} Instance Buffer")),
                contents: bytemuck::cast_slice(positions),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
        let (params, params_bind_group) = uniform_bind_group(
            ctx,
            &ctx.layouts.sprite,
            SpriteUniform::new(size),
            &format!("{label} Sprite"),
        );
        Self {
            instance,
            amount: positions.len() as u32,
            params,
            params_bind_group,
            material: Material::placeholder(ctx, label),
        }
    }

    fn as_sprites(&self) -> Sprites<'_> {
        Sprites {
            instance: &self.instance,
            amount: self.amount,
            material: &self.material.bind_group,
            params: &self.params_bind_group,
        }
    }
}

pub struct GalaxyScene {
    state: GalaxyState,
    nucleus: MeshObject,
    background: MeshObject,
    moving_stars: SpriteObject,
    star_layers: Vec<SpriteObject>,
}

impl GalaxyScene {
    /// Builds the scene graph. Every material starts out plain white until its
    /// image is delivered through [`GalaxyScene::apply_texture`].
    pub fn new(ctx: &Context, config: &GalaxyConfig) -> Self {
        let mut rng = scene_rng(config);
        let state = GalaxyState::new(config, &mut rng);

        let nucleus = MeshObject::new(ctx, state.nucleus.geometry(), "Nucleus");
        let backdrop = geometry::uv_sphere(
            config.background.radius,
            config.background.width_segments,
            config.background.height_segments,
        );
        let background = MeshObject::new(ctx, &backdrop, "Background");
        let moving_stars = SpriteObject::new(
            ctx,
            state.moving_stars.positions(),
            state.moving_stars.size,
            "Moving Stars",
        );
        let star_layers = state
            .star_layers
            .iter()
            .enumerate()
            .map(|(i, layer)| {
                SpriteObject::new(ctx, layer.positions(), layer.size, &format!("Star Layer {i}"))
            })
            .collect();

        log::info!(
            "galaxy built: {} nucleus vertices, {} moving stars, {} star layers",
            state.nucleus.geometry().vertices.len(),
            state.moving_stars.len(),
            config.star_layers.len()
        );

        Self {
            state,
            nucleus,
            background,
            moving_stars,
            star_layers,
        }
    }

    /// Advances the simulation to `t_ms` and uploads whatever changed.
    pub fn update(&mut self, queue: &wgpu::Queue, t_ms: f64) {
        self.state.advance(t_ms);

        if self.state.nucleus.take_needs_update() {
            queue.write_buffer(
                &self.nucleus.vertex,
                0,
                bytemuck::cast_slice(&self.state.nucleus.geometry().vertices),
            );
        }
        if !self.state.moving_stars.is_empty() {
            queue.write_buffer(
                &self.moving_stars.instance,
                0,
                bytemuck::cast_slice(self.state.moving_stars.positions()),
            );
        }
        let spin = ObjectUniform {
            model: self.state.spin.matrix().into(),
        };
        queue.write_buffer(&self.background.object, 0, bytemuck::cast_slice(&[spin]));
    }

    /// Decodes `bytes` and swaps it in as the texture of `slot`.
    pub fn apply_texture(
        &mut self,
        ctx: &Context,
        slot: TextureSlot,
        bytes: &[u8],
        label: &str,
    ) -> anyhow::Result<()> {
        let target = match slot {
            TextureSlot::Background => &mut self.background.material,
            TextureSlot::Nucleus => &mut self.nucleus.material,
            TextureSlot::MovingStars => &mut self.moving_stars.material,
            TextureSlot::StarLayer(i) => match self.star_layers.get_mut(i) {
                Some(layer) => &mut layer.material,
                None => anyhow::bail!("no star layer {i} for texture {label}"),
            },
        };
        let texture = Texture::from_bytes(&ctx.device, &ctx.queue, bytes, label)?;
        *target = Material::new(ctx, texture, label);
        Ok(())
    }

    pub fn render(&self) -> Render<'_> {
        let mut renders = vec![
            Render::Background(self.background.as_mesh()),
            Render::Lit(self.nucleus.as_mesh()),
            Render::Sprites(self.moving_stars.as_sprites()),
        ];
        renders.extend(
            self.star_layers
                .iter()
                .map(|layer| Render::Sprites(layer.as_sprites())),
        );
        Render::Composed(renders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NucleusConfig;

    fn small_config() -> GalaxyConfig {
        GalaxyConfig {
            nucleus: NucleusConfig {
                detail: 2,
                ..Default::default()
            },
            seed: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn test_spin_advances_every_axis() {
        let mut spin = Spin::new(0.002);
        for _ in 0..10 {
            spin.advance();
        }
        for axis in [spin.rotation.x, spin.rotation.y, spin.rotation.z] {
            assert!((axis - 0.02).abs() < 1e-6);
        }
    }

    #[test]
    fn test_state_matches_config() {
        let config = small_config();
        let state = GalaxyState::new(&config, &mut scene_rng(&config));
        assert_eq!(state.moving_stars.len(), 50);
        let layer_sizes: Vec<_> = state.star_layers.iter().map(|l| l.positions().len()).collect();
        assert_eq!(layer_sizes, vec![20, 5, 5]);
    }

    #[test]
    fn test_same_seed_same_stars() {
        let config = small_config();
        let a = GalaxyState::new(&config, &mut scene_rng(&config));
        let b = GalaxyState::new(&config, &mut scene_rng(&config));
        assert_eq!(a.moving_stars.positions(), b.moving_stars.positions());
    }

    #[test]
    fn test_advance_touches_all_parts() {
        let config = small_config();
        let mut state = GalaxyState::new(&config, &mut scene_rng(&config));
        let stars_before = state.moving_stars.positions().to_vec();
        state.advance(16.0);
        assert!(state.nucleus.take_needs_update());
        assert!((state.spin.rotation.x - 0.002).abs() < 1e-7);
        assert_ne!(state.moving_stars.positions(), stars_before.as_slice());
    }
}
