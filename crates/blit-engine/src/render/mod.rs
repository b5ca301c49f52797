//! GPU rendering subsystem.
//!
//! The sprite renderer replays a recorded `scene::DrawList` with wgpu. Texture
//! handles are created through `GpuTextureCreator` and released on drop.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - Vertex shader converts to NDC using a target-size uniform.

mod batch;
mod common;
mod ctx;
mod gpu_texture;
mod sprite;

pub use ctx::{RenderCtx, RenderTarget};
pub use gpu_texture::{GpuTexture, GpuTextureCreator, TextureFilter};
pub use sprite::SpriteRenderer;
