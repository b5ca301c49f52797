//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (the window's render target)
//! - acquiring frames and providing encoders/views for rendering

mod frame;
mod gpu;
mod surface;

pub use frame::{GpuFrame, SurfaceErrorAction};
pub use gpu::{Gpu, GpuInit};
