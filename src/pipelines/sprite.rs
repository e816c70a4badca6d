//! Point sprites: camera facing textured quads, one instance per particle.

use crate::{
    data_structures::vertex::{SpriteInstance, Vertex},
    pipelines::basic::{PipelineOptions, mk_render_pipeline, uniform_layout},
};

/// Quad corners emitted per sprite instance.
pub const SPRITE_VERTICES: u32 = 6;

/// World space edge length of a sprite layer. Padded to 16 bytes for WebGL.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteUniform {
    pub size: f32,
    _padding: [f32; 3],
}

impl SpriteUniform {
    pub fn new(size: f32) -> Self {
        Self {
            size,
            _padding: [0.0; 3],
        }
    }
}

pub fn mk_sprite_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    uniform_layout(device, wgpu::ShaderStages::VERTEX, "sprite_bind_group_layout")
}

pub fn mk_sprite_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    texture_layout: &wgpu::BindGroupLayout,
    camera_layout: &wgpu::BindGroupLayout,
    sprite_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Sprite Pipeline Layout"),
        bind_group_layouts: &[Some(texture_layout), Some(camera_layout), Some(sprite_layout)],
        immediate_size: 0,
    });
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Sprite Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("sprite.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &layout,
        config.format,
        PipelineOptions::blended(),
        &[SpriteInstance::desc()],
        shader,
    )
}
