//! Paint model shared between the canvas and renderers.
//!
//! Scope:
//! - color representation (straight-alpha sRGB bytes)
//! - blend modes for textures and shapes

pub mod blend;
pub mod color;

pub use blend::BlendMode;
pub use color::Color;
