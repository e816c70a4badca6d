//! galaxy-scene
//!
//! An animated 3D galaxy rendered with wgpu, natively in a window or in the
//! browser inside a container element. The scene consists of a noise deformed
//! nucleus, a slowly spinning textured backdrop, a cloud of stars falling
//! towards the centre and static star layers, viewed through an orbit camera.
//!
//! High-level modules
//! - `config`: tunable constants of the scene with their defaults
//! - `stars` / `nucleus`: the CPU side simulation, independent of the GPU
//! - `scene`: builds the objects, advances them per frame, uploads their data
//! - `camera`: orbit controller, projection and camera uniforms
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `pipelines`: nucleus, backdrop and sprite render pipelines
//! - `render`: render composition for efficient pipeline reuse
//! - `mount` / `resize`: attaching to a container and debouncing resizes
//! - `flow`: the event loop tying everything together
//!

pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod error;
pub mod flow;
pub mod mount;
pub mod nucleus;
pub mod pipelines;
pub mod render;
pub mod resize;
pub mod resources;
pub mod scene;
pub mod stars;

pub use config::GalaxyConfig;
pub use error::GalaxyError;
pub use flow::run;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Browser entry point: mounts the galaxy into `#container`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    run(GalaxyConfig::default()).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
