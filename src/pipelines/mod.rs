//! Render pipelines and their WGSL shaders.
//!
//! - `basic`: shared pipeline builder, nucleus and backdrop pipelines
//! - `light`: the point light uniform used to shade the nucleus
//! - `sprite`: billboarded point sprites for the star layers

pub mod basic;
pub mod light;
pub mod sprite;

/// Every pipeline the galaxy draws with, built once at startup.
#[derive(Debug)]
pub struct Pipelines {
    pub nucleus: wgpu::RenderPipeline,
    pub background: wgpu::RenderPipeline,
    pub sprite: wgpu::RenderPipeline,
}

/// Bind group layouts that scene objects need to build their bind groups.
#[derive(Debug)]
pub struct Layouts {
    pub texture: wgpu::BindGroupLayout,
    pub object: wgpu::BindGroupLayout,
    pub sprite: wgpu::BindGroupLayout,
}
