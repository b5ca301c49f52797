//! blit engine crate.
//!
//! Hardware-accelerated 2D rendering: a recorded SDL-style canvas, an RAII
//! texture wrapper, and the window/GPU runtime that replays the canvas each
//! frame.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod paint;
pub mod render;
pub mod scene;
pub mod texture;
