use thiserror::Error;

/// Failures the galaxy guards against explicitly.
///
/// Everything else (asset decoding, IO) travels as `anyhow::Error` and is
/// logged where it surfaces.
#[derive(Debug, Error)]
pub enum GalaxyError {
    #[error("mount container `{0}` not found, the galaxy will not be rendered")]
    MissingContainer(String),
    #[error("could not attach the renderer to `{id}`: {reason}")]
    Attach { id: String, reason: String },
    #[error("no suitable GPU adapter: {0}")]
    Adapter(String),
    #[error("surface creation failed: {0}")]
    Surface(String),
}
