//! Camera, projection and the orbit controller.
//!
//! The [`Camera`] looks at a target point. The [`OrbitController`] turns mouse
//! input into rotations around that target, zoom and pans, and applies them
//! with damping once per frame. When idle it slowly auto-rotates.

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3, perspective};
use wgpu::util::DeviceExt;
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use crate::{config::OrbitConfig, stars::spherical_to_cartesian};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

const MIN_POLAR: f32 = 1.0e-4;

#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>>(position: P, target: P) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, Vector3::unit_y())
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).magnitude()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height.max(1) as f32,
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

/// The camera as seen by the shaders. The view matrix is needed on its own to
/// orient sprites towards the viewer.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view: [[f32; 4]; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view: Matrix4::identity().into(),
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        let view = camera.calc_matrix();
        self.view_position = camera.position.to_homogeneous().into();
        self.view = view.into();
        self.view_proj = (projection.calc_matrix() * view).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(
        device: &wgpu::Device,
        camera: Camera,
        controller: OrbitController,
        projection: &Projection,
    ) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("camera_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("camera_bind_group"),
        });

        Self {
            camera,
            controller,
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    /// Runs the controller for this frame and pushes the result to the GPU.
    pub fn update(&mut self, queue: &wgpu::Queue, projection: &Projection) {
        self.controller.update(&mut self.camera);
        self.uniform.update_view_proj(&self.camera, projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Drag {
    None,
    Rotate,
    Pan,
}

/// Orbit rig around a fixed target with inertia.
///
/// Input only accumulates deltas; [`OrbitController::update`] consumes a
/// damped share of them every frame and writes the camera position.
#[derive(Debug)]
pub struct OrbitController {
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    pan_speed: f32,
    pan_limit: f32,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pan_pixels: (f32, f32),
    pan_offset: Vector3<f32>,
    drag: Drag,
    cursor: Option<PhysicalPosition<f64>>,
    viewport_height: f32,
}

impl OrbitController {
    pub fn new(config: &OrbitConfig) -> Self {
        Self {
            min_distance: config.min_distance,
            max_distance: config.max_distance,
            damping_factor: config.damping_factor.clamp(0.0, 1.0),
            auto_rotate: config.auto_rotate,
            auto_rotate_speed: config.auto_rotate_speed,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            pan_limit: config.pan_limit.max(0.0),
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pan_pixels: (0.0, 0.0),
            pan_offset: Vector3::new(0.0, 0.0, 0.0),
            drag: Drag::None,
            cursor: None,
            viewport_height: 1.0,
        }
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height.max(1) as f32;
    }

    /// Auto rotation per frame: a full turn every 60 seconds at 60 fps and speed 1.
    fn auto_rotation_angle(&self) -> f32 {
        std::f32::consts::TAU / 60.0 / 60.0 * self.auto_rotate_speed
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    /// `delta > 0` moves the camera closer.
    pub fn zoom(&mut self, delta: f32) {
        self.scale *= 0.95_f32.powf(delta * self.zoom_speed);
    }

    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        let (dx, dy) = (dx as f32, dy as f32);
        match self.drag {
            Drag::Rotate => {
                let per_pixel = std::f32::consts::TAU / self.viewport_height * self.rotate_speed;
                self.rotate_left(dx * per_pixel);
                self.rotate_up(dy * per_pixel);
            }
            Drag::Pan => {
                self.pan_pixels.0 += dx * self.pan_speed;
                self.pan_pixels.1 += dy * self.pan_speed;
            }
            Drag::None => (),
        }
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (button, state) {
                    (MouseButton::Left, ElementState::Pressed) => Drag::Rotate,
                    (MouseButton::Right, ElementState::Pressed) => Drag::Pan,
                    (_, ElementState::Released) => Drag::None,
                    _ => self.drag,
                };
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(last) = self.cursor {
                    self.handle_mouse(position.x - last.x, position.y - last.y);
                }
                self.cursor = Some(*position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = Drag::None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                self.zoom(lines);
            }
            _ => (),
        }
    }

    /// Applies one frame of pending input (and auto rotation) to `camera`.
    pub fn update(&mut self, camera: &mut Camera) {
        if self.auto_rotate && self.drag == Drag::None {
            self.rotate_left(self.auto_rotation_angle());
        }

        let offset = camera.position - camera.target;
        let mut radius = offset.magnitude().max(f32::EPSILON);
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        let share = if self.damping_factor > 0.0 {
            self.damping_factor
        } else {
            1.0
        };
        theta += self.theta_delta * share;
        phi = (phi + self.phi_delta * share).clamp(MIN_POLAR, std::f32::consts::PI - MIN_POLAR);
        radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);

        if self.pan_pixels != (0.0, 0.0) {
            let forward = -offset.normalize();
            let right = forward.cross(Vector3::unit_y()).normalize();
            let up = right.cross(forward);
            let per_pixel = radius / self.viewport_height;
            self.pan_offset +=
                (-right * self.pan_pixels.0 + up * self.pan_pixels.1) * per_pixel;
            self.pan_pixels = (0.0, 0.0);
        }
        camera.target += self.pan_offset * share;
        let target = camera.target.to_vec();
        if target.magnitude() > self.pan_limit {
            camera.target = Point3::from_vec(target.normalize_to(self.pan_limit));
        }
        camera.position = camera.target + spherical_to_cartesian(radius, theta, phi);

        let keep = 1.0 - share;
        self.theta_delta *= keep;
        self.phi_delta *= keep;
        self.pan_offset *= keep;
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn still_config() -> OrbitConfig {
        OrbitConfig {
            auto_rotate: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_zoom_is_clamped_to_max_distance() {
        let mut camera = Camera::new((0.0, 0.0, 120.0), (0.0, 0.0, 0.0));
        let mut controller = OrbitController::new(&still_config());
        controller.zoom(-100.0);
        controller.update(&mut camera);
        assert!((camera.distance() - 140.0).abs() < 1e-3);

        controller.zoom(1000.0);
        controller.update(&mut camera);
        assert!((camera.distance() - 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_auto_rotate_keeps_distance() {
        let mut camera = Camera::new((0.0, 0.0, 120.0), (0.0, 0.0, 0.0));
        let mut controller = OrbitController::new(&OrbitConfig::default());
        let start = camera.position;
        for _ in 0..60 {
            controller.update(&mut camera);
        }
        assert!((camera.distance() - 120.0).abs() < 1e-2);
        assert!((camera.position - start).magnitude() > 0.1);
        assert!((camera.position.y).abs() < 1e-3, "auto rotation stays on the orbit plane");
    }

    #[test]
    fn test_damping_bleeds_out_rotation() {
        let mut camera = Camera::new((0.0, 0.0, 100.0), (0.0, 0.0, 0.0));
        let mut controller = OrbitController::new(&still_config());
        controller.rotate_left(1.0);
        controller.update(&mut camera);
        let first = camera.position;
        controller.update(&mut camera);
        let second = camera.position;
        for _ in 0..500 {
            controller.update(&mut camera);
        }
        let settled = camera.position;
        controller.update(&mut camera);
        assert!((second - first).magnitude() < (first - Point3::new(0.0, 0.0, 100.0)).magnitude());
        assert!((camera.position - settled).magnitude() < 1e-4);
    }

    #[test]
    fn test_pan_keeps_target_near_origin() {
        let config = OrbitConfig {
            damping_factor: 0.0,
            ..still_config()
        };
        let mut camera = Camera::new((0.0, 0.0, 140.0), (0.0, 0.0, 0.0));
        let mut controller = OrbitController::new(&config);
        controller.set_viewport_height(100);
        controller.drag = Drag::Pan;
        for _ in 0..50 {
            controller.handle_mouse(-500.0, 300.0);
            controller.update(&mut camera);
        }
        let target = camera.target.to_vec();
        assert!(target.magnitude() > config.pan_limit - 1e-3, "panning had no effect");
        assert!(target.magnitude() <= config.pan_limit + 1e-3);
        assert!(camera.position.to_vec().magnitude() < 150.0);
    }

    #[test]
    fn test_polar_angle_never_flips_over_pole() {
        let mut camera = Camera::new((0.0, 0.0, 100.0), (0.0, 0.0, 0.0));
        let mut controller = OrbitController::new(&OrbitConfig {
            damping_factor: 0.0,
            ..still_config()
        });
        controller.rotate_up(10.0);
        controller.update(&mut camera);
        assert!(camera.position.y > 99.0);
        assert!(camera.position.y <= 100.0);
    }
}
