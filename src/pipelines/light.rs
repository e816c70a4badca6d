use wgpu::util::DeviceExt;

use crate::pipelines::basic::uniform_layout;

/// A single point light plus an ambient term, bound at group 3 of the nucleus.
#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 3],
    // Packs into the vec3 padding
    pub ambient: f32,
    pub color: [f32; 3],
    pub shininess: f32,
}

impl Default for LightUniform {
    fn default() -> Self {
        Self {
            position: [80.0, 120.0, 160.0],
            ambient: 0.35,
            color: [1.0, 1.0, 1.0],
            shininess: 48.0,
        }
    }
}

impl LightResources {
    pub fn new(uniform: LightUniform, device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Light Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group_layout =
            uniform_layout(device, wgpu::ShaderStages::FRAGMENT, "light_bind_group_layout");
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("light_bind_group"),
        });
        Self {
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }
}
