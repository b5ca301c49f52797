use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::core::{
    logical_size, App as CoreApp, AppControl, FrameCtx, Lifecycle, LoadCtx, LoopState, WindowCtx,
};
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::input::{InputEvent, InputFrame, InputState, Key, KeyState};
use crate::render::{GpuTexture, RenderCtx, RenderTarget, SpriteRenderer, TextureFilter};
use crate::scene::DrawList;
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    /// Sampling filter for scaled textures.
    pub filter: TextureFilter,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "blit".to_string(),
            initial_size: LogicalSize::new(640.0, 480.0),
            filter: TextureFilter::Linear,
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Runs `app` in a single window until it quits or the window is closed.
    ///
    /// Initialization and load failures are logged and end the loop; only a
    /// failure of the platform event loop itself is returned.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        // The platform may stop the loop without a final callback.
        state.stop();

        Ok(())
    }
}

#[self_referencing]
struct WindowEntry {
    input_state: InputState,
    input_frame: InputFrame,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Everything acquired during initialization.
///
/// Fields drop in declaration order: draw list, renderer, then GPU and window.
struct Session {
    canvas: DrawList<GpuTexture>,
    renderer: SpriteRenderer,
    entry: WindowEntry,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    lifecycle: Lifecycle,
    session: Option<Session>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            lifecycle: Lifecycle::new(),
            session: None,
        }
    }

    fn create_session(&self, event_loop: &ActiveEventLoop) -> Result<Session> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            input_state: InputState::default(),
            input_frame: InputFrame::default(),
            clock: FrameClock::default(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let renderer = entry
            .with_gpu(|gpu| SpriteRenderer::new(gpu.device(), gpu.queue(), self.config.filter))
            .context("failed to create sprite renderer")?;

        let canvas = DrawList::new(entry.with_window(|w| logical_size(w)));

        Ok(Session {
            canvas,
            renderer,
            entry,
        })
    }

    /// Uninitialized -> Initialized -> Loaded -> Running.
    fn start(&mut self, event_loop: &ActiveEventLoop) {
        let session = self.create_session(event_loop);
        if !self.initialized(session) {
            return;
        }

        let control = self.load();
        self.loaded(control);
    }

    /// Installs the session, or enters shutdown when initialization failed.
    fn initialized(&mut self, session: Result<Session>) -> bool {
        match session {
            Ok(session) => {
                self.session = Some(session);
                self.transition(LoopState::Initialized);
                true
            }
            Err(e) => {
                log::error!("initialization failed: {e:#}");
                self.lifecycle.begin_shutdown();
                false
            }
        }
    }

    /// Enters the frame loop unless loading asked to exit.
    fn loaded(&mut self, control: AppControl) {
        if control == AppControl::Exit {
            log::warn!("loading aborted; skipping the frame loop");
            self.lifecycle.begin_shutdown();
            return;
        }
        self.transition(LoopState::Loaded);
        self.transition(LoopState::Running);

        if let Some(session) = self.session.as_mut() {
            session.entry.with_clock_mut(|clock| clock.reset());
            session.entry.with_window(|w| w.request_redraw());
        }
    }

    fn load(&mut self) -> AppControl {
        let Some(session) = self.session.as_mut() else {
            return AppControl::Exit;
        };
        let (app, renderer) = (&mut self.app, &session.renderer);

        session.entry.with(|fields| {
            let mut ctx = LoadCtx {
                window: WindowCtx {
                    window: fields.window,
                },
                textures: renderer.texture_creator(fields.gpu.device(), fields.gpu.queue()),
            };
            app.on_load(&mut ctx)
        })
    }

    fn transition(&mut self, to: LoopState) {
        if let Err(e) = self.lifecycle.advance(to) {
            log::error!("{e}");
            self.lifecycle.begin_shutdown();
        }
    }

    /// ShuttingDown -> Terminated: releases resources in reverse acquisition order.
    fn finish_shutdown(&mut self) {
        if !self.lifecycle.is_shutting_down() {
            return;
        }

        self.app.on_unload();

        if let Some(mut session) = self.session.take() {
            session.canvas.end_frame();
            drop(session);
        }

        self.transition(LoopState::Terminated);
        log::info!("shut down");
    }

    /// Shuts down from whatever state the loop stopped in.
    fn stop(&mut self) {
        self.lifecycle.begin_shutdown();
        self.finish_shutdown();
    }

    fn redraw(&mut self) -> AppControl {
        let Some(session) = self.session.as_mut() else {
            return AppControl::Exit;
        };
        let Session {
            canvas,
            renderer,
            entry,
        } = session;
        let app = &mut self.app;

        entry.with_mut(|fields| {
            let time = fields.clock.tick();

            let control = {
                let mut ctx = FrameCtx {
                    window: WindowCtx {
                        window: fields.window,
                    },
                    canvas: &mut *canvas,
                    textures: renderer.texture_creator(fields.gpu.device(), fields.gpu.queue()),
                    input: fields.input_state,
                    input_frame: fields.input_frame,
                    time,
                };
                app.on_frame(&mut ctx)
            };

            // Per-frame deltas are consumed by the frame that saw them.
            fields.input_frame.clear();

            if control == AppControl::Exit {
                canvas.end_frame();
                return AppControl::Exit;
            }

            present(fields.window, fields.gpu, renderer, canvas)
        })
    }
}

fn present(
    window: &Window,
    gpu: &mut Gpu<'_>,
    renderer: &mut SpriteRenderer,
    canvas: &mut DrawList<GpuTexture>,
) -> AppControl {
    let mut frame = match gpu.begin_frame() {
        Ok(f) => f,
        Err(err) => {
            log::warn!("failed to acquire surface texture: {err}");
            canvas.end_frame();
            return match gpu.handle_surface_error(err) {
                SurfaceErrorAction::Fatal => AppControl::Exit,
                _ => AppControl::Continue,
            };
        }
    };

    {
        let rctx = RenderCtx::new(
            gpu.device(),
            gpu.queue(),
            gpu.surface_format(),
            canvas.target_size(),
            window.scale_factor() as f32,
        );
        let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
        renderer.render(&rctx, &mut target, canvas);
    }

    window.pre_present_notify();
    gpu.submit(frame);
    canvas.end_frame();

    AppControl::Continue
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.lifecycle.state() == LoopState::Uninitialized {
            self.start(event_loop);
        }

        if self.lifecycle.is_shutting_down() {
            self.finish_shutdown();
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.lifecycle.is_shutting_down() {
            self.finish_shutdown();
        }
        if self.lifecycle.is_terminated() {
            event_loop.exit();
            return;
        }

        // No frame limiting beyond the present mode.
        event_loop.set_control_flow(ControlFlow::Poll);

        if self.lifecycle.is_running() {
            if let Some(session) = self.session.as_ref() {
                session.entry.with_window(|w| w.request_redraw());
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if !self.lifecycle.is_running() {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if let Some(ev) = translate_input_event(&event) {
            session.entry.with_mut(|fields| {
                fields.input_state.apply_event(fields.input_frame, ev);
            });
        }

        if self.app.on_window_event(&event) == AppControl::Exit {
            self.lifecycle.begin_shutdown();
        }

        match &event {
            WindowEvent::CloseRequested => {
                log::info!("close requested");
                self.lifecycle.begin_shutdown();
            }

            WindowEvent::Resized(new_size) => {
                session.entry.with_gpu_mut(|gpu| gpu.resize(*new_size));
                let logical = session.entry.with_window(|w| logical_size(w));
                session.canvas.set_target_size(logical);
                session.entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = session.entry.with_window(|w| w.inner_size());
                session.entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                let logical = session.entry.with_window(|w| logical_size(w));
                session.canvas.set_target_size(logical);
            }

            WindowEvent::RedrawRequested => {
                if self.redraw() == AppControl::Exit {
                    self.lifecycle.begin_shutdown();
                }
            }

            _ => {}
        }

        if self.lifecycle.is_shutting_down() {
            self.finish_shutdown();
            event_loop.exit();
        }
    }
}

fn translate_input_event(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::Focused(f) => Some(InputEvent::Focused(*f)),

        WindowEvent::KeyboardInput { event, .. } => {
            let state = match event.state {
                ElementState::Pressed => KeyState::Pressed,
                ElementState::Released => KeyState::Released,
            };

            Some(InputEvent::Key {
                key: map_key(event.physical_key),
                state,
                repeat: event.repeat,
            })
        }

        _ => None,
    }
}

fn map_key(pk: PhysicalKey) -> Key {
    let PhysicalKey::Code(code) = pk else {
        // NativeKeyCode has no stable numeric form in winit 0.30.
        return Key::Unknown(0);
    };

    match code {
        KeyCode::Escape => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Space => Key::Space,

        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,

        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,

        KeyCode::Digit0 => Key::Digit0,
        KeyCode::Digit1 => Key::Digit1,
        KeyCode::Digit2 => Key::Digit2,
        KeyCode::Digit3 => Key::Digit3,
        KeyCode::Digit4 => Key::Digit4,
        KeyCode::Digit5 => Key::Digit5,
        KeyCode::Digit6 => Key::Digit6,
        KeyCode::Digit7 => Key::Digit7,
        KeyCode::Digit8 => Key::Digit8,
        KeyCode::Digit9 => Key::Digit9,

        other => Key::Unknown(other as u32),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingApp {
        unloads: u32,
    }

    impl CoreApp for CountingApp {
        fn on_frame(&mut self, _ctx: &mut FrameCtx<'_>) -> AppControl {
            AppControl::Continue
        }

        fn on_unload(&mut self) {
            self.unloads += 1;
        }
    }

    fn state() -> AppState<CountingApp> {
        AppState::new(
            RuntimeConfig::default(),
            GpuInit::default(),
            CountingApp::default(),
        )
    }

    fn running() -> AppState<CountingApp> {
        let mut state = state();
        state
            .lifecycle
            .advance(LoopState::Initialized)
            .expect("initialize");
        state.loaded(AppControl::Continue);
        assert_eq!(state.lifecycle.state(), LoopState::Running);
        state
    }

    #[test]
    fn finishing_before_shutdown_does_nothing() {
        let mut state = running();
        state.finish_shutdown();

        assert_eq!(state.lifecycle.state(), LoopState::Running);
        assert_eq!(state.app.unloads, 0);
    }

    #[test]
    fn close_then_every_later_call_site_unloads_once() {
        let mut state = running();

        // window_event: close requested, then its shutdown tail.
        state.lifecycle.begin_shutdown();
        state.finish_shutdown();
        // about_to_wait after the close.
        state.finish_shutdown();
        // A second close in the same batch.
        state.lifecycle.begin_shutdown();
        state.finish_shutdown();
        // run_app returned.
        state.stop();

        assert_eq!(state.app.unloads, 1);
        assert_eq!(state.lifecycle.state(), LoopState::Terminated);
    }

    #[test]
    fn loop_ending_without_a_callback_still_unloads() {
        let mut state = running();
        state.stop();
        state.stop();

        assert_eq!(state.app.unloads, 1);
        assert!(state.lifecycle.is_terminated());
    }

    #[test]
    fn initialization_failure_skips_loading_and_unloads_once() {
        let mut state = state();

        assert!(!state.initialized(Err(anyhow::anyhow!("no adapter"))));
        assert!(state.lifecycle.is_shutting_down());
        assert!(state.session.is_none());

        // resumed finishes, then run_app returns.
        state.finish_shutdown();
        state.stop();

        assert_eq!(state.app.unloads, 1);
        assert_eq!(state.lifecycle.state(), LoopState::Terminated);
    }

    #[test]
    fn aborted_load_skips_the_frame_loop_and_unloads_once() {
        let mut state = state();
        state
            .lifecycle
            .advance(LoopState::Initialized)
            .expect("initialize");

        state.loaded(AppControl::Exit);
        assert!(state.lifecycle.is_shutting_down());
        assert!(!state.lifecycle.is_running());

        state.finish_shutdown();
        state.finish_shutdown();
        state.stop();

        assert_eq!(state.app.unloads, 1);
        assert_eq!(state.lifecycle.state(), LoopState::Terminated);
    }

    #[test]
    fn loading_without_a_session_exits() {
        let mut state = state();
        assert_eq!(state.load(), AppControl::Exit);
        assert_eq!(state.app.unloads, 0);
    }

    #[test]
    fn letters_and_digits_map_to_engine_keys() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyQ)), Key::Q);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyD)), Key::D);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Digit7)), Key::Digit7);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::Escape)), Key::Escape);
    }

    #[test]
    fn unmapped_codes_are_unknown() {
        assert!(matches!(
            map_key(PhysicalKey::Code(KeyCode::F5)),
            Key::Unknown(_)
        ));
    }
}
