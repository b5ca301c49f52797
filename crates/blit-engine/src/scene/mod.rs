//! Scene (draw stream) types.
//!
//! Responsibilities:
//! - store renderer-agnostic draw commands in submission order
//! - track canvas state (draw color, viewport, clear color) the way an
//!   immediate-mode 2D renderer does
//! - resolve viewport-relative coordinates and clipping at record time

mod cmd;
mod list;

pub use cmd::{DrawCmd, TextureStyle};
pub use list::{DrawItem, DrawList};
