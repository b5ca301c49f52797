use winit::window::Window;

use crate::coords::Size;
use crate::input::{InputFrame, InputState};
use crate::render::{GpuTexture, GpuTextureCreator};
use crate::scene::DrawList;
use crate::time::FrameTime;

/// Window handle and metadata.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl WindowCtx<'_> {
    /// Window size in logical pixels; the canvas coordinate space.
    pub fn logical_size(&self) -> Size {
        logical_size(self.window)
    }
}

pub(crate) fn logical_size(window: &Window) -> Size {
    let logical: winit::dpi::LogicalSize<u32> = window.inner_size().to_logical(window.scale_factor());
    Size::new(logical.width, logical.height)
}

/// Context passed to `App::on_load`.
pub struct LoadCtx<'a> {
    pub window: WindowCtx<'a>,
    /// Texture factory of the active render target.
    pub textures: GpuTextureCreator<'a>,
}

/// Per-frame context passed to `App::on_frame`.
///
/// The canvas starts each frame with no items and the previous frame's draw
/// state; whatever is recorded is presented after the callback returns.
pub struct FrameCtx<'a> {
    pub window: WindowCtx<'a>,
    pub canvas: &'a mut DrawList<GpuTexture>,
    pub textures: GpuTextureCreator<'a>,
    pub input: &'a InputState,
    pub input_frame: &'a InputFrame,
    pub time: FrameTime,
}
