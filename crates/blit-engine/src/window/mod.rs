//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the window, wires them to the GPU layer and
//! walks the frame-loop lifecycle.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
