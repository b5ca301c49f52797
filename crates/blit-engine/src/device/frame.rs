/// Swapchain image being recorded this frame.
///
/// Acquired by `Gpu::begin_frame` and consumed by `Gpu::submit`. The next image
/// cannot be acquired while this one is alive, so it never outlives a redraw.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// What the frame loop does after `get_current_texture` fails.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// The surface was configured again; the next redraw can proceed.
    Reconfigured,
    /// Nothing to present this time (timeout, hidden window).
    SkipFrame,
    /// Out of memory or a lost device; the loop shuts down.
    Fatal,
}
