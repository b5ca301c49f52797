//! Textures: decoding, color keying and the owning texture wrapper.
//!
//! The wrapper is backend-agnostic. Anything that can turn decoded RGBA pixels
//! into a handle implements [`TextureCreator`]; the GPU implementation lives in
//! `render::gpu_texture`.

mod decode;
mod error;
mod wrapper;

pub use decode::{apply_color_key, decode_rgba};
pub use error::TextureError;
pub use wrapper::{Texture, TextureCreator};
