use std::path::PathBuf;

use blit_engine::core::{App, AppControl, FrameCtx, LoadCtx};
use blit_engine::render::GpuTexture;

use crate::scenario::{Player, Scenario};

/// Runs one scenario inside the engine runtime.
pub struct Tour {
    player: Player<GpuTexture>,
    assets: PathBuf,
}

impl Tour {
    pub fn new(scenario: Scenario, assets: impl Into<PathBuf>) -> Self {
        Self {
            player: Player::new(scenario),
            assets: assets.into(),
        }
    }
}

impl App for Tour {
    fn on_load(&mut self, ctx: &mut LoadCtx<'_>) -> AppControl {
        let outcome = self.player.load(&mut ctx.textures, &self.assets);
        if outcome.should_run() {
            AppControl::Continue
        } else {
            AppControl::Exit
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        for key in ctx.input_frame.key_presses() {
            self.player.handle_key(key);
        }

        self.player.draw(ctx.canvas, ctx.time.frame_index);
        AppControl::Continue
    }

    fn on_unload(&mut self) {
        self.player.unload();
        log::debug!("{}: textures released", self.player.scenario().name);
    }
}
