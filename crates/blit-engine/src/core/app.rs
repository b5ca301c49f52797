use winit::event::WindowEvent;

use super::ctx::{FrameCtx, LoadCtx};

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by the runtime.
///
/// Call order: `on_load` once after the render target exists, `on_frame` once
/// per presented frame while running, `on_unload` exactly once during shutdown
/// (also when loading was aborted).
pub trait App {
    /// Loads resources. Returning `Exit` skips the frame loop.
    fn on_load(&mut self, ctx: &mut LoadCtx<'_>) -> AppControl {
        let _ = ctx;
        AppControl::Continue
    }

    /// Called for every window event before the runtime handles it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Records the frame into `ctx.canvas`.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;

    /// Releases resources acquired in `on_load`.
    fn on_unload(&mut self) {}
}
