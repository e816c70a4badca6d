//! Render composition and pipeline batching.
//!
//! The scene describes what to draw as a [`Render`] tree. [`draw`] flattens
//! it into per-pipeline batches and issues them in a fixed order: the backdrop
//! first, then the opaque nucleus, then the blended sprites so that they
//! composite over everything that writes depth.

use crate::context::Context;
use crate::pipelines::sprite::SPRITE_VERTICES;

/// An indexed, textured mesh with its own transform.
pub struct Mesh<'a> {
    pub vertex: &'a wgpu::Buffer,
    pub index: &'a wgpu::Buffer,
    pub amount: u32,
    pub material: &'a wgpu::BindGroup,
    pub object: &'a wgpu::BindGroup,
}

/// A batch of point sprites sharing texture and size.
pub struct Sprites<'a> {
    pub instance: &'a wgpu::Buffer,
    pub amount: u32,
    pub material: &'a wgpu::BindGroup,
    pub params: &'a wgpu::BindGroup,
}

/// Specifies how a scene object should be rendered.
///
/// - `Background(Mesh)` renders the inside of a mesh, unlit
/// - `Lit(Mesh)` renders a mesh with the scene light
/// - `Sprites(Sprites)` renders blended camera facing quads
/// - `Composed(Vec<Render>)` renders all of its children
pub enum Render<'a> {
    Background(Mesh<'a>),
    Lit(Mesh<'a>),
    Sprites(Sprites<'a>),
    Composed(Vec<Render<'a>>),
}

#[derive(Default)]
struct Batches<'a> {
    backgrounds: Vec<Mesh<'a>>,
    lit: Vec<Mesh<'a>>,
    sprites: Vec<Sprites<'a>>,
}

impl<'a> Render<'a> {
    fn collect(self, batches: &mut Batches<'a>) {
        match self {
            Render::Background(mesh) => batches.backgrounds.push(mesh),
            Render::Lit(mesh) => batches.lit.push(mesh),
            Render::Sprites(sprites) => batches.sprites.push(sprites),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.collect(batches)),
        }
    }
}

fn draw_mesh(render_pass: &mut wgpu::RenderPass<'_>, ctx: &Context, mesh: &Mesh<'_>) {
    render_pass.set_bind_group(0, mesh.material, &[]);
    render_pass.set_bind_group(1, &ctx.camera.bind_group, &[]);
    render_pass.set_bind_group(2, mesh.object, &[]);
    render_pass.set_vertex_buffer(0, mesh.vertex.slice(..));
    render_pass.set_index_buffer(mesh.index.slice(..), wgpu::IndexFormat::Uint32);
    render_pass.draw_indexed(0..mesh.amount, 0, 0..1);
}

/// Records `render` into `render_pass`, batched by pipeline.
pub fn draw(ctx: &Context, render_pass: &mut wgpu::RenderPass<'_>, render: Render<'_>) {
    let mut batches = Batches::default();
    render.collect(&mut batches);

    render_pass.set_pipeline(&ctx.pipelines.background);
    for mesh in &batches.backgrounds {
        draw_mesh(render_pass, ctx, mesh);
    }

    render_pass.set_pipeline(&ctx.pipelines.nucleus);
    render_pass.set_bind_group(3, &ctx.light.bind_group, &[]);
    for mesh in &batches.lit {
        draw_mesh(render_pass, ctx, mesh);
    }

    render_pass.set_pipeline(&ctx.pipelines.sprite);
    for sprites in &batches.sprites {
        if sprites.amount == 0 {
            log::warn!("skipping a sprite batch without instances");
            continue;
        }
        render_pass.set_bind_group(0, sprites.material, &[]);
        render_pass.set_bind_group(1, &ctx.camera.bind_group, &[]);
        render_pass.set_bind_group(2, sprites.params, &[]);
        render_pass.set_vertex_buffer(0, sprites.instance.slice(..));
        render_pass.draw(0..SPRITE_VERTICES, 0..sprites.amount);
    }
}
