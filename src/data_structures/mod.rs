//! Scene data structures: geometry, textures and vertex layouts.
//!
//! - `geometry` builds the icosphere nucleus and the backdrop sphere
//! - `texture` contains the GPU texture wrapper and creation utilities
//! - `vertex` holds the vertex/instance layouts shared with the shaders

pub mod geometry;
pub mod texture;
pub mod vertex;
