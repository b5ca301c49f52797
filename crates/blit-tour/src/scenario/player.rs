use std::path::Path;

use blit_engine::coords::Rect;
use blit_engine::input::Key;
use blit_engine::scene::DrawList;
use blit_engine::texture::{Texture, TextureCreator};

use super::{DrawOp, LoadPolicy, Position, Scenario};

/// Result of loading a scenario's textures.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadOutcome {
    Ready,
    /// Some textures failed; the scenario runs without them.
    Degraded { failed: usize },
    /// Some textures failed and the scenario's policy is to stop.
    Aborted { failed: usize },
}

impl LoadOutcome {
    pub fn should_run(self) -> bool {
        !matches!(self, LoadOutcome::Aborted { .. })
    }
}

/// Interprets one scenario against a canvas.
///
/// Owns one texture wrapper per declared texture; slots line up with
/// `Scenario::textures`.
pub struct Player<H> {
    scenario: Scenario,
    textures: Vec<Texture<H>>,
}

impl<H: Clone> Player<H> {
    pub fn new(scenario: Scenario) -> Self {
        let textures = scenario.textures.iter().map(|_| Texture::new()).collect();
        Self { scenario, textures }
    }

    #[inline]
    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn texture(&self, slot: usize) -> Option<&Texture<H>> {
        self.textures.get(slot)
    }

    /// Loads every declared texture from `assets`.
    ///
    /// Failures are logged by the wrapper; the scenario's policy decides the outcome.
    pub fn load<C>(&mut self, creator: &mut C, assets: &Path) -> LoadOutcome
    where
        C: TextureCreator<Handle = H>,
    {
        let mut failed = 0;
        for (spec, texture) in self.scenario.textures.iter().zip(&mut self.textures) {
            if texture.load(creator, assets.join(spec.path), spec.color_key).is_err() {
                failed += 1;
            }
        }

        match (failed, self.scenario.on_load_failure) {
            (0, _) => LoadOutcome::Ready,
            (failed, LoadPolicy::Continue) => {
                log::warn!("{}: {failed} texture(s) missing, continuing", self.scenario.name);
                LoadOutcome::Degraded { failed }
            }
            (failed, LoadPolicy::Abort) => {
                log::error!("{}: failed to load media", self.scenario.name);
                LoadOutcome::Aborted { failed }
            }
        }
    }

    /// Runs every binding triggered by `key`.
    pub fn handle_key(&mut self, key: Key) {
        for binding in self.scenario.bindings.iter().filter(|b| b.key == key) {
            let Some(texture) = self.textures.get_mut(binding.action.texture()) else {
                continue;
            };
            binding.action.apply(texture);
            log::debug!(
                "{key}: color {:?} alpha {}",
                texture.color(),
                texture.alpha()
            );
        }
    }

    /// Records one frame: clear to the background, then the draw script.
    pub fn draw(&mut self, canvas: &mut DrawList<H>, tick: u64) {
        canvas.set_viewport(None);
        canvas.set_draw_color(self.scenario.background);
        canvas.clear();

        for op in &self.scenario.script {
            match op {
                DrawOp::SetDrawColor(color) => canvas.set_draw_color(*color),
                DrawOp::Clear => canvas.clear(),
                DrawOp::FillRect(rect) => canvas.fill_rect(*rect),
                DrawOp::OutlineRect(rect) => canvas.draw_rect(*rect),
                DrawOp::Line(from, to) => canvas.draw_line(from.x, from.y, to.x, to.y),
                DrawOp::Points(points) => canvas.draw_points(points),
                DrawOp::SetViewport(viewport) => canvas.set_viewport(*viewport),
                DrawOp::Render { texture, x, y, clip } => {
                    if let Some(t) = self.textures.get(*texture) {
                        t.render(canvas, *x, *y, *clip);
                    }
                }
                DrawOp::Stretch { texture, clip, dst } => {
                    if let Some(t) = self.textures.get(*texture) {
                        t.render_to(canvas, *clip, *dst);
                    }
                }
                DrawOp::Animate {
                    texture,
                    animation,
                    clips,
                    position,
                } => {
                    let (Some(t), Some(clip)) =
                        (self.textures.get(*texture), clips.get(animation.frame_at(tick)))
                    else {
                        continue;
                    };
                    let (x, y) = place(*position, *clip, canvas.output_rect());
                    t.render(canvas, x, y, Some(*clip));
                }
                DrawOp::SetColorMod { texture, color } => {
                    if let Some(t) = self.textures.get_mut(*texture) {
                        t.set_color(color.r, color.g, color.b);
                    }
                }
                DrawOp::SetAlphaMod { texture, alpha } => {
                    if let Some(t) = self.textures.get_mut(*texture) {
                        t.set_alpha(*alpha);
                    }
                }
                DrawOp::SetBlendMode { texture, blend } => {
                    if let Some(t) = self.textures.get_mut(*texture) {
                        t.set_blend_mode(*blend);
                    }
                }
            }
        }
    }
}

impl<H> Player<H> {
    /// Releases every texture. Safe to call more than once.
    pub fn unload(&mut self) {
        for texture in &mut self.textures {
            texture.free();
        }
    }
}

fn place(position: Position, clip: Rect, output: Rect) -> (i32, i32) {
    match position {
        Position::At(p) => (p.x, p.y),
        Position::Centered => ((output.w - clip.w) / 2, (output.h - clip.h) / 2),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use blit_engine::coords::Size;
    use blit_engine::paint::Color;
    use blit_engine::scene::DrawCmd;
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::scenario::{find, TextureSpec};

    #[derive(Debug)]
    struct Handle {
        released: Rc<Cell<u32>>,
    }

    impl Drop for Handle {
        fn drop(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    #[derive(Default)]
    struct Creator {
        released: Rc<Cell<u32>>,
    }

    impl TextureCreator for Creator {
        type Handle = Rc<Handle>;

        fn create_texture(&mut self, _image: &RgbaImage, _label: &str) -> anyhow::Result<Rc<Handle>> {
            Ok(Rc::new(Handle {
                released: self.released.clone(),
            }))
        }
    }

    fn write_assets(scenario: &Scenario, w: u32, h: u32) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for spec in &scenario.textures {
            RgbaImage::from_pixel(w, h, Rgba([0x20, 0x40, 0x60, 0xFF]))
                .save(dir.path().join(spec.path))
                .unwrap();
        }
        dir
    }

    fn copies(canvas: &DrawList<Rc<Handle>>) -> Vec<(Rect, Rect)> {
        canvas
            .items()
            .iter()
            .filter_map(|i| match &i.cmd {
                DrawCmd::Copy { src, dst, .. } => Some((*src, *dst)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn sprite_sheet_corners_sample_each_quadrant() {
        let scenario = find("sprites").unwrap();
        let assets = write_assets(&scenario, 200, 200);
        let mut player = Player::new(scenario);
        assert_eq!(player.load(&mut Creator::default(), assets.path()), LoadOutcome::Ready);

        let mut canvas = DrawList::new(Size::new(640, 480));
        player.draw(&mut canvas, 0);

        assert_eq!(
            copies(&canvas),
            vec![
                (Rect::new(0, 0, 100, 100), Rect::new(0, 0, 100, 100)),
                (Rect::new(100, 0, 100, 100), Rect::new(540, 0, 100, 100)),
                (Rect::new(0, 100, 100, 100), Rect::new(0, 380, 100, 100)),
                (Rect::new(100, 100, 100, 100), Rect::new(540, 380, 100, 100)),
            ]
        );
        assert_eq!(canvas.clear_color(), Color::WHITE);
    }

    #[test]
    fn animation_steps_every_eight_ticks() {
        let scenario = find("animation").unwrap();
        let assets = write_assets(&scenario, 256, 205);
        let mut player = Player::new(scenario);
        player.load(&mut Creator::default(), assets.path());

        let mut canvas = DrawList::new(Size::new(640, 480));
        for tick in [0u64, 7, 8, 17, 31, 32, 100] {
            canvas.end_frame();
            player.draw(&mut canvas, tick);

            let frame = ((tick / 8) % 4) as i32;
            let (src, dst) = copies(&canvas)[0];
            assert_eq!(src, Rect::new(frame * 64, 0, 64, 205), "tick {tick}");
            assert_eq!(dst, Rect::new((640 - 64) / 2, (480 - 205) / 2, 64, 205));
        }
    }

    #[test]
    fn viewport_scenario_stretches_into_each_viewport() {
        let scenario = find("viewport").unwrap();
        let assets = write_assets(&scenario, 32, 32);
        let mut player = Player::new(scenario);
        player.load(&mut Creator::default(), assets.path());

        let mut canvas = DrawList::new(Size::new(640, 480));
        player.draw(&mut canvas, 0);

        let dsts: Vec<Rect> = copies(&canvas).into_iter().map(|(_, dst)| dst).collect();
        assert_eq!(
            dsts,
            vec![
                Rect::new(0, 0, 320, 240),
                Rect::new(320, 0, 320, 240),
                Rect::new(0, 240, 640, 240),
            ]
        );
        assert_eq!(canvas.viewport(), None);
    }

    #[test]
    fn missing_texture_follows_policy() {
        let dir = tempfile::tempdir().unwrap();

        let mut aborting = Player::<Rc<Handle>>::new(find("texture").unwrap());
        assert_eq!(
            aborting.load(&mut Creator::default(), dir.path()),
            LoadOutcome::Aborted { failed: 1 }
        );

        let mut lenient = find("texture").unwrap();
        lenient.on_load_failure = LoadPolicy::Continue;
        let mut player = Player::<Rc<Handle>>::new(lenient);
        let outcome = player.load(&mut Creator::default(), dir.path());
        assert!(outcome.should_run());

        let mut canvas = DrawList::new(Size::new(640, 480));
        player.draw(&mut canvas, 0);
        assert!(canvas.is_empty());
        assert_eq!(canvas.clear_color(), Color::CYAN);
    }

    #[test]
    fn bindings_modulate_the_bound_texture() {
        let scenario = find("alpha").unwrap();
        let mut player = Player::<Rc<Handle>>::new(scenario);

        player.handle_key(Key::S);
        player.handle_key(Key::S);
        player.handle_key(Key::Q);
        assert_eq!(player.texture(1).map(|t| t.alpha()), Some(255 - 64));
        assert_eq!(player.texture(0).map(|t| t.alpha()), Some(255));

        for _ in 0..10 {
            player.handle_key(Key::W);
        }
        assert_eq!(player.texture(1).map(|t| t.alpha()), Some(255));
    }

    #[test]
    fn script_modulation_and_clear_apply_in_order() {
        let mut scenario = find("modulation").unwrap();
        scenario.script = vec![
            DrawOp::SetDrawColor(Color::RED),
            DrawOp::FillRect(Rect::new(0, 0, 10, 10)),
            DrawOp::SetDrawColor(Color::BLUE),
            DrawOp::Clear,
            DrawOp::SetColorMod { texture: 0, color: Color::rgb(10, 20, 30) },
            DrawOp::SetAlphaMod { texture: 0, alpha: 128 },
            DrawOp::Animate {
                texture: 0,
                animation: blit_engine::time::SpriteAnimation::new(1, 1),
                clips: vec![Rect::new(0, 0, 4, 4)],
                position: Position::At(blit_engine::coords::Point::new(7, 9)),
            },
        ];
        let assets = write_assets(&scenario, 4, 4);
        let mut player = Player::new(scenario);
        player.load(&mut Creator::default(), assets.path());

        let mut canvas = DrawList::new(Size::new(640, 480));
        player.draw(&mut canvas, 3);

        assert_eq!(canvas.clear_color(), Color::BLUE);
        assert_eq!(canvas.len(), 1);
        let DrawCmd::Copy { dst, style, .. } = &canvas.items()[0].cmd else {
            panic!("expected a copy");
        };
        assert_eq!(*dst, Rect::new(7, 9, 4, 4));
        assert_eq!(style.color, Color::rgb(10, 20, 30));
        assert_eq!(style.alpha, 128);
    }

    #[test]
    fn unload_releases_every_handle_once() {
        let mut scenario = find("alpha").unwrap();
        scenario.textures.push(TextureSpec::plain("extra.png"));
        let assets = write_assets(&scenario, 4, 4);
        let mut creator = Creator::default();

        let mut player = Player::new(scenario);
        assert_eq!(player.load(&mut creator, assets.path()), LoadOutcome::Ready);

        player.unload();
        player.unload();
        drop(player);
        assert_eq!(creator.released.get(), 3);
    }
}
