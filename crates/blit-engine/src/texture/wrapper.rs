use std::path::Path;

use image::RgbaImage;

use crate::coords::Rect;
use crate::paint::{BlendMode, Color};
use crate::scene::{DrawList, TextureStyle};

use super::{apply_color_key, decode_rgba, TextureError};

/// Turns decoded pixels into backend texture handles.
///
/// Releasing a handle is the handle's own `Drop`; cloning must only add a
/// reference (recorded draw items hold clones until the frame is presented).
pub trait TextureCreator {
    type Handle: Clone;

    /// Uploads `image` to the render target's device.
    fn create_texture(&mut self, image: &RgbaImage, label: &str) -> anyhow::Result<Self::Handle>;
}

/// An owned, optionally-loaded texture plus its modulation state.
///
/// Invariant: either a handle is held and both dimensions are positive, or the
/// texture is empty and both dimensions are zero.
///
/// Modulation (color, alpha, blend mode) belongs to the wrapper, not the handle:
/// it may be set while empty and survives `free`/`load`.
#[derive(Debug)]
pub struct Texture<H> {
    handle: Option<H>,
    width: u32,
    height: u32,
    style: TextureStyle,
}

impl<H> Default for Texture<H> {
    fn default() -> Self {
        Self {
            handle: None,
            width: 0,
            height: 0,
            style: TextureStyle::default(),
        }
    }
}

impl<H> Texture<H> {
    /// Creates an empty texture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases the handle, if any, and resets the dimensions. Idempotent.
    pub fn free(&mut self) {
        if let Some(handle) = self.handle.take() {
            drop(handle);
            log::trace!("released {}x{} texture", self.width, self.height);
        }
        self.width = 0;
        self.height = 0;
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Backend handle, if loaded.
    #[inline]
    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    /// Sets the color modulation (tint) applied to subsequent renders.
    #[inline]
    pub fn set_color(&mut self, r: u8, g: u8, b: u8) {
        self.style.color = Color::rgb(r, g, b);
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.style.color
    }

    /// Sets the alpha modulation applied to subsequent renders.
    #[inline]
    pub fn set_alpha(&mut self, alpha: u8) {
        self.style.alpha = alpha;
    }

    #[inline]
    pub fn alpha(&self) -> u8 {
        self.style.alpha
    }

    #[inline]
    pub fn set_blend_mode(&mut self, blend: BlendMode) {
        self.style.blend = blend;
    }

    #[inline]
    pub fn blend_mode(&self) -> BlendMode {
        self.style.blend
    }

    #[inline]
    pub fn style(&self) -> TextureStyle {
        self.style
    }

    /// Full-texture rectangle in texel space.
    #[inline]
    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width as i32, self.height as i32)
    }
}

impl<H: Clone> Texture<H> {
    /// Loads the image at `path`, replacing any texture held before.
    ///
    /// When `color_key` is set, pixels with exactly that RGB become transparent.
    /// On failure the texture is left empty and the error is logged.
    pub fn load<C>(
        &mut self,
        creator: &mut C,
        path: impl AsRef<Path>,
        color_key: Option<Color>,
    ) -> Result<(), TextureError>
    where
        C: TextureCreator<Handle = H>,
    {
        let path = path.as_ref();
        self.free();

        let result = decode_rgba(path).and_then(|mut image| {
            if let Some(key) = color_key {
                let keyed = apply_color_key(&mut image, key);
                log::debug!("{}: {keyed} pixels keyed out", path.display());
            }
            self.load_image(creator, &image, &path.display().to_string())
                .map_err(|e| TextureError::Upload {
                    path: path.to_path_buf(),
                    reason: format!("{e:#}"),
                })
        });

        match &result {
            Ok(()) => log::info!("loaded {} ({}x{})", path.display(), self.width, self.height),
            Err(e) => log::error!("{e}"),
        }

        result
    }

    /// Uploads already-decoded pixels, replacing any texture held before.
    pub fn load_image<C>(
        &mut self,
        creator: &mut C,
        image: &RgbaImage,
        label: &str,
    ) -> anyhow::Result<()>
    where
        C: TextureCreator<Handle = H>,
    {
        self.free();

        let (width, height) = image.dimensions();
        anyhow::ensure!(width > 0 && height > 0, "image has zero size");

        let handle = creator.create_texture(image, label)?;

        self.handle = Some(handle);
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Renders the texture (or the `clip` region of it) with its top-left at `(x, y)`.
    ///
    /// The destination takes the clip's size when a clip is given, else the
    /// texture's size. Records nothing when the texture is empty.
    pub fn render(&self, canvas: &mut DrawList<H>, x: i32, y: i32, clip: Option<Rect>) {
        let src = clip.unwrap_or_else(|| self.bounds());
        self.render_to(canvas, Some(src), Some(Rect::new(x, y, src.w, src.h)));
    }

    /// Renders `clip` (or the whole texture) stretched into `dst`.
    ///
    /// `dst = None` stretches over the canvas output area (viewport or target).
    pub fn render_to(&self, canvas: &mut DrawList<H>, clip: Option<Rect>, dst: Option<Rect>) {
        let Some(handle) = self.handle.as_ref() else {
            log::trace!("render on an empty texture ignored");
            return;
        };
        let src = clip.unwrap_or_else(|| self.bounds());
        canvas.copy(handle.clone(), src, dst, self.style);
    }
}

impl<H> Drop for Texture<H> {
    fn drop(&mut self) {
        self.free();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::PathBuf;
    use std::rc::Rc;

    use image::Rgba;

    use super::*;
    use crate::coords::Size;
    use crate::scene::DrawCmd;

    /// Handle whose release bumps a shared counter.
    #[derive(Debug)]
    struct MockHandle {
        released: Rc<Cell<u32>>,
    }

    impl Drop for MockHandle {
        fn drop(&mut self) {
            self.released.set(self.released.get() + 1);
        }
    }

    #[derive(Default)]
    struct MockCreator {
        created: u32,
        released: Rc<Cell<u32>>,
        fail_with: Option<&'static str>,
    }

    impl TextureCreator for MockCreator {
        type Handle = Rc<MockHandle>;

        fn create_texture(&mut self, _image: &RgbaImage, _label: &str) -> anyhow::Result<Self::Handle> {
            if let Some(reason) = self.fail_with {
                anyhow::bail!(reason);
            }
            self.created += 1;
            Ok(Rc::new(MockHandle { released: self.released.clone() }))
        }
    }

    fn write_png(dir: &tempfile::TempDir, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.path().join(name);
        RgbaImage::from_pixel(w, h, Rgba([0xFF, 0x00, 0xFF, 0xFF]))
            .save(&path)
            .unwrap();
        path
    }

    fn canvas() -> DrawList<Rc<MockHandle>> {
        DrawList::new(Size::new(640, 480))
    }

    fn copy_rects(canvas: &DrawList<Rc<MockHandle>>) -> Vec<(Rect, Rect)> {
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
    fn load_records_image_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "sheet.png", 120, 45);
        let mut creator = MockCreator::default();

        let mut tex = Texture::new();
        tex.load(&mut creator, &path, None).unwrap();

        assert!(tex.is_loaded());
        assert_eq!((tex.width(), tex.height()), (120, 45));
        assert_eq!(creator.created, 1);
    }

    #[test]
    fn decode_failure_leaves_texture_empty() {
        let mut creator = MockCreator::default();
        let mut tex = Texture::new();

        let err = tex.load(&mut creator, "missing.png", None).unwrap_err();

        assert!(matches!(err, TextureError::Decode { .. }));
        assert!(!tex.is_loaded());
        assert_eq!((tex.width(), tex.height()), (0, 0));
        assert_eq!(creator.created, 0);
    }

    #[test]
    fn upload_failure_releases_previous_and_leaves_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "a.png", 8, 8);
        let mut creator = MockCreator::default();

        let mut tex = Texture::new();
        tex.load(&mut creator, &path, None).unwrap();

        creator.fail_with = Some("device lost");
        let err = tex.load(&mut creator, &path, None).unwrap_err();

        assert!(matches!(err, TextureError::Upload { ref reason, .. } if reason == "device lost"));
        assert!(!tex.is_loaded());
        assert_eq!((tex.width(), tex.height()), (0, 0));
        assert_eq!(creator.released.get(), 1);
    }

    #[test]
    fn reload_releases_previous_handle_first() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(&dir, "a.png", 8, 8);
        let b = write_png(&dir, "b.png", 16, 4);
        let mut creator = MockCreator::default();

        let mut tex = Texture::new();
        tex.load(&mut creator, &a, None).unwrap();
        tex.load(&mut creator, &b, None).unwrap();

        assert_eq!(creator.released.get(), 1);
        assert_eq!((tex.width(), tex.height()), (16, 4));
    }

    #[test]
    fn free_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "a.png", 8, 8);
        let mut creator = MockCreator::default();

        let mut tex = Texture::new();
        tex.load(&mut creator, &path, None).unwrap();
        tex.free();
        tex.free();

        assert!(!tex.is_loaded());
        assert_eq!((tex.width(), tex.height()), (0, 0));
        assert_eq!(creator.released.get(), 1);
    }

    #[test]
    fn drop_releases_handle_exactly_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "a.png", 8, 8);
        let mut creator = MockCreator::default();
        let released = creator.released.clone();

        {
            let mut tex = Texture::new();
            tex.load(&mut creator, &path, None).unwrap();
            tex.free();
            tex.load(&mut creator, &path, None).unwrap();
        }

        assert_eq!(creator.created, 2);
        assert_eq!(released.get(), 2);
    }

    #[test]
    fn recorded_copy_keeps_handle_alive_until_frame_ends() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "a.png", 8, 8);
        let mut creator = MockCreator::default();
        let mut canvas = canvas();

        let mut tex = Texture::new();
        tex.load(&mut creator, &path, None).unwrap();
        tex.render(&mut canvas, 0, 0, None);
        drop(tex);

        assert_eq!(creator.released.get(), 0);
        canvas.end_frame();
        assert_eq!(creator.released.get(), 1);
    }

    #[test]
    fn color_key_makes_matching_pixels_transparent() {
        struct Inspect(Option<RgbaImage>);
        impl TextureCreator for Inspect {
            type Handle = ();
            fn create_texture(&mut self, image: &RgbaImage, _: &str) -> anyhow::Result<()> {
                self.0 = Some(image.clone());
                Ok(())
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyed.png");
        RgbaImage::from_fn(2, 1, |x, _| {
            if x == 0 { Rgba([0, 0xFF, 0xFF, 0xFF]) } else { Rgba([9, 9, 9, 0xFF]) }
        })
        .save(&path)
        .unwrap();

        let mut creator = Inspect(None);
        let mut tex = Texture::new();
        tex.load(&mut creator, &path, Some(Color::CYAN)).unwrap();

        let uploaded = creator.0.unwrap();
        assert_eq!(uploaded.get_pixel(0, 0).0[3], 0);
        assert_eq!(uploaded.get_pixel(1, 0).0[3], 0xFF);
    }

    #[test]
    fn render_without_clip_uses_texture_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "a.png", 64, 205);
        let mut creator = MockCreator::default();
        let mut canvas = canvas();

        let mut tex = Texture::new();
        tex.load(&mut creator, &path, None).unwrap();
        tex.render(&mut canvas, 240, 190, None);

        assert_eq!(copy_rects(&canvas), vec![(Rect::new(0, 0, 64, 205), Rect::new(240, 190, 64, 205))]);
    }

    #[test]
    fn render_with_clip_uses_clip_size_at_any_position() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "a.png", 300, 300);
        let mut creator = MockCreator::default();
        let mut canvas = canvas();

        let mut tex = Texture::new();
        tex.load(&mut creator, &path, None).unwrap();
        let clip = Rect::new(100, 0, 37, 21);
        for (x, y) in [(0, 0), (-50, 900), (603, 459)] {
            tex.render(&mut canvas, x, y, Some(clip));
        }

        for (src, dst) in copy_rects(&canvas) {
            assert_eq!(src, clip);
            assert_eq!((dst.w, dst.h), (37, 21));
        }
    }

    #[test]
    fn sprite_sheet_quadrants_render_at_full_clip_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "dots.png", 200, 200);
        let mut creator = MockCreator::default();
        let mut canvas = canvas();

        let mut tex = Texture::new();
        tex.load(&mut creator, &path, None).unwrap();

        let clips = [
            Rect::new(0, 0, 100, 100),
            Rect::new(100, 0, 100, 100),
            Rect::new(0, 100, 100, 100),
            Rect::new(100, 100, 100, 100),
        ];
        let spots = [(0, 0), (540, 0), (0, 380), (540, 380)];
        for (clip, (x, y)) in clips.iter().zip(spots) {
            tex.render(&mut canvas, x, y, Some(*clip));
        }

        let rects = copy_rects(&canvas);
        assert_eq!(rects.len(), 4);
        for ((src, dst), (clip, (x, y))) in rects.iter().zip(clips.iter().zip(spots)) {
            assert_eq!(src, clip);
            assert_eq!(*dst, Rect::new(x, y, 100, 100));
        }
    }

    #[test]
    fn render_on_empty_texture_records_nothing() {
        let mut canvas = canvas();
        let mut tex: Texture<Rc<MockHandle>> = Texture::new();
        tex.set_color(10, 20, 30);
        tex.render(&mut canvas, 0, 0, None);
        tex.render_to(&mut canvas, None, None);
        assert!(canvas.is_empty());
    }

    #[test]
    fn modulation_is_carried_into_recorded_copies() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "a.png", 8, 8);
        let mut creator = MockCreator::default();
        let mut canvas = canvas();

        let mut tex = Texture::new();
        tex.set_alpha(128);
        tex.load(&mut creator, &path, None).unwrap();
        tex.set_color(255, 128, 0);
        tex.set_blend_mode(BlendMode::Add);
        tex.render_to(&mut canvas, None, None);

        let DrawCmd::Copy { style, dst, .. } = &canvas.items()[0].cmd else {
            panic!("expected a copy");
        };
        assert_eq!(*dst, Rect::new(0, 0, 640, 480));
        assert_eq!(style.color, Color::rgb(255, 128, 0));
        assert_eq!(style.alpha, 128);
        assert_eq!(style.blend, BlendMode::Add);
    }
}
