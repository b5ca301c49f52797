use std::path::PathBuf;

/// Why a texture could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// The image file was unreadable or in an unsupported format.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The render target refused the decoded pixels.
    #[error("failed to create texture from {}: {reason}", path.display())]
    Upload { path: PathBuf, reason: String },
}
