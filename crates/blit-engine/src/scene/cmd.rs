use crate::coords::{Point, Rect};
use crate::paint::{BlendMode, Color};

/// Per-draw modulation applied to a texture copy.
///
/// Modulation tints the sampled texels without touching the stored pixels:
/// `out.rgb = texel.rgb * color.rgb / 255`, `out.a = texel.a * alpha / 255`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TextureStyle {
    pub color: Color,
    pub alpha: u8,
    pub blend: BlendMode,
}

impl Default for TextureStyle {
    fn default() -> Self {
        // Decoded images always carry an alpha channel, so they blend by default.
        Self {
            color: Color::WHITE,
            alpha: 0xFF,
            blend: BlendMode::Blend,
        }
    }
}

/// Renderer-agnostic draw command.
///
/// Coordinates are absolute target coordinates (viewport offsets already applied).
/// `H` is the texture handle type of the backend recording the command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd<H> {
    /// Solid rectangle. Points and outline edges are recorded as fills.
    Fill {
        rect: Rect,
        color: Color,
        blend: BlendMode,
    },
    /// One-pixel line between two points (inclusive).
    Line {
        from: Point,
        to: Point,
        color: Color,
        blend: BlendMode,
    },
    /// Copy of `src` (texel space) from `texture` into `dst`.
    Copy {
        texture: H,
        src: Rect,
        dst: Rect,
        style: TextureStyle,
    },
}

impl<H> DrawCmd<H> {
    #[inline]
    pub fn blend(&self) -> BlendMode {
        match self {
            DrawCmd::Fill { blend, .. } | DrawCmd::Line { blend, .. } => *blend,
            DrawCmd::Copy { style, .. } => style.blend,
        }
    }

    /// Returns the command with all target coordinates moved by `offset`.
    pub(crate) fn translated(self, offset: Point) -> Self {
        match self {
            DrawCmd::Fill { rect, color, blend } => DrawCmd::Fill {
                rect: rect.translated(offset),
                color,
                blend,
            },
            DrawCmd::Line { from, to, color, blend } => DrawCmd::Line {
                from: from + offset,
                to: to + offset,
                color,
                blend,
            },
            DrawCmd::Copy { texture, src, dst, style } => DrawCmd::Copy {
                texture,
                src,
                dst: dst.translated(offset),
                style,
            },
        }
    }
}
