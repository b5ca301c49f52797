use crate::coords::{Point, Rect, Size};
use crate::paint::{BlendMode, Color};

use super::{DrawCmd, TextureStyle};

/// A single draw item: command + clip rect.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawItem<H> {
    pub cmd: DrawCmd<H>,
    /// Scissor rect in logical pixels. `None` = no clipping (draw everywhere).
    pub clip_rect: Option<Rect>,
}

/// Recorded draw stream for a frame, plus the canvas state that shapes it.
///
/// The API mirrors an immediate-mode 2D renderer: a current draw color, an
/// optional viewport, `clear`, shape primitives and texture copies. Nothing is
/// drawn here; a backend replays [`items`](Self::items) in order when the frame
/// is presented.
///
/// # Viewports
///
/// While a viewport is set, coordinates passed to drawing calls are relative to
/// the viewport origin and every recorded item is clipped to the viewport.
///
/// ```ignore
/// canvas.set_viewport(Some(Rect::new(320, 0, 320, 240)));
/// canvas.fill_rect(Rect::new(0, 0, 10, 10)); // lands at (320, 0)
/// canvas.set_viewport(None);
/// ```
///
/// Draw state (color, blend mode, viewport, clear color) persists across frames;
/// only the recorded items are discarded by [`end_frame`](Self::end_frame).
#[derive(Debug)]
pub struct DrawList<H> {
    items: Vec<DrawItem<H>>,

    target: Size,
    draw_color: Color,
    draw_blend: BlendMode,
    viewport: Option<Rect>,
    clear_color: Color,
}

impl<H> Default for DrawList<H> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            target: Size::default(),
            draw_color: Color::BLACK,
            draw_blend: BlendMode::None,
            viewport: None,
            clear_color: Color::BLACK,
        }
    }
}

impl<H> DrawList<H> {
    #[inline]
    pub fn new(target: Size) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    // ── state ─────────────────────────────────────────────────────────────

    /// Updates the logical size of the render target (after resizes).
    #[inline]
    pub fn set_target_size(&mut self, size: Size) {
        self.target = size;
    }

    #[inline]
    pub fn target_size(&self) -> Size {
        self.target
    }

    #[inline]
    pub fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
    }

    #[inline]
    pub fn draw_color(&self) -> Color {
        self.draw_color
    }

    /// Blend mode used by fills, outlines, lines and points.
    #[inline]
    pub fn set_draw_blend_mode(&mut self, blend: BlendMode) {
        self.draw_blend = blend;
    }

    #[inline]
    pub fn draw_blend_mode(&self) -> BlendMode {
        self.draw_blend
    }

    /// Sets (or with `None`, resets) the active viewport.
    ///
    /// A viewport with non-positive size is stored as given; everything recorded
    /// under it is clipped away.
    #[inline]
    pub fn set_viewport(&mut self, viewport: Option<Rect>) {
        self.viewport = viewport.map(Rect::normalized);
    }

    #[inline]
    pub fn viewport(&self) -> Option<Rect> {
        self.viewport
    }

    /// The area drawing calls currently address, in local coordinates.
    ///
    /// This is the viewport size when one is active, else the whole target.
    #[inline]
    pub fn output_rect(&self) -> Rect {
        match self.viewport {
            Some(v) => Rect::new(0, 0, v.w, v.h),
            None => Rect::from_size(self.target),
        }
    }

    #[inline]
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    // ── recording ─────────────────────────────────────────────────────────

    /// Clears the whole target with the current draw color.
    ///
    /// Ignores the viewport. Everything recorded earlier in the frame is
    /// overwritten, so it is discarded.
    pub fn clear(&mut self) {
        self.items.clear();
        self.clear_color = self.draw_color;
    }

    /// Fills `rect` with the draw color.
    pub fn fill_rect(&mut self, rect: Rect) {
        let rect = rect.normalized();
        if rect.is_empty() {
            return;
        }
        self.push(DrawCmd::Fill {
            rect,
            color: self.draw_color,
            blend: self.draw_blend,
        });
    }

    /// Draws a one-pixel outline just inside `rect`.
    pub fn draw_rect(&mut self, rect: Rect) {
        let r = rect.normalized();
        if r.is_empty() {
            return;
        }

        // Thin rects degenerate to a filled rect; no edge is drawn twice.
        if r.w <= 2 || r.h <= 2 {
            self.fill_rect(r);
            return;
        }

        self.fill_rect(Rect::new(r.x, r.y, r.w, 1));
        self.fill_rect(Rect::new(r.x, r.bottom() - 1, r.w, 1));
        self.fill_rect(Rect::new(r.x, r.y + 1, 1, r.h - 2));
        self.fill_rect(Rect::new(r.right() - 1, r.y + 1, 1, r.h - 2));
    }

    /// Draws a one-pixel line from `(x1, y1)` to `(x2, y2)`, both ends inclusive.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (from, to) = (Point::new(x1, y1), Point::new(x2, y2));

        // Axis-aligned lines are exact fills.
        if from.y == to.y || from.x == to.x {
            let x = from.x.min(to.x);
            let y = from.y.min(to.y);
            let w = (from.x - to.x).abs() + 1;
            let h = (from.y - to.y).abs() + 1;
            self.fill_rect(Rect::new(x, y, w, h));
            return;
        }

        self.push(DrawCmd::Line {
            from,
            to,
            color: self.draw_color,
            blend: self.draw_blend,
        });
    }

    /// Draws a single pixel.
    #[inline]
    pub fn draw_point(&mut self, x: i32, y: i32) {
        self.fill_rect(Rect::new(x, y, 1, 1));
    }

    pub fn draw_points(&mut self, points: &[Point]) {
        for p in points {
            self.draw_point(p.x, p.y);
        }
    }

    /// Records a copy of `src` from `texture` into `dst`.
    ///
    /// `dst = None` stretches over the whole output area (viewport or target).
    /// Empty source or destination rects record nothing.
    pub fn copy(&mut self, texture: H, src: Rect, dst: Option<Rect>, style: TextureStyle) {
        let dst = dst.unwrap_or_else(|| self.output_rect());
        if src.is_empty() || dst.is_empty() {
            return;
        }
        self.push(DrawCmd::Copy { texture, src, dst, style });
    }

    fn push(&mut self, cmd: DrawCmd<H>) {
        let item = match self.viewport {
            None => DrawItem { cmd, clip_rect: None },
            Some(v) => DrawItem {
                cmd: cmd.translated(v.origin()),
                clip_rect: Some(v),
            },
        };
        self.items.push(item);
    }

    // ── consumption ───────────────────────────────────────────────────────

    /// Returns items in submission order.
    #[inline]
    pub fn items(&self) -> &[DrawItem<H>] {
        &self.items
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Discards recorded items after presentation. Keeps capacity and draw state.
    #[inline]
    pub fn end_frame(&mut self) {
        self.items.clear();
    }
}
