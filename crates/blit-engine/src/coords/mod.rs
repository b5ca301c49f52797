//! Coordinate and geometry types shared by the canvas, textures and renderers.
//!
//! Canonical CPU space:
//! - Integer logical pixels
//! - Origin top-left
//! - +X right, +Y down
//!
//! Renderers convert to NDC in shaders using a target-size uniform.

mod point;
mod rect;
mod size;

pub use point::Point;
pub use rect::Rect;
pub use size::Size;
