//! CPU side of the sprite pipeline: draw items → instances + draw batches.

use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::coords::{Point, Rect, Size};
use crate::paint::{BlendMode, Color};
use crate::scene::{DrawCmd, DrawItem};

/// Instance data layout (56 bytes):
///
///  offset  0  origin   [f32; 2]   loc 1
///  offset  8  axis_x   [f32; 2]   loc 2
///  offset 16  axis_y   [f32; 2]   loc 3
///  offset 24  uv_min   [f32; 2]   loc 4
///  offset 32  uv_max   [f32; 2]   loc 5
///  offset 40  color    [f32; 4]   loc 6
///
/// A quad corner `q` in `[0, 1]²` lands at `origin + q.x * axis_x + q.y * axis_y`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(super) struct SpriteInstance {
    pub origin: [f32; 2],
    pub axis_x: [f32; 2],
    pub axis_y: [f32; 2],
    pub uv_min: [f32; 2],
    pub uv_max: [f32; 2],
    pub color: [f32; 4],
}

impl SpriteInstance {
    const ATTRS: [wgpu::VertexAttribute; 6] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // axis_x
        3 => Float32x2, // axis_y
        4 => Float32x2, // uv_min
        5 => Float32x2, // uv_max
        6 => Float32x4  // color
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }

    /// Axis-aligned quad sampling the whole (white) texture.
    fn solid(rect: Rect, color: Color) -> Self {
        Self {
            origin: [rect.x as f32, rect.y as f32],
            axis_x: [rect.w as f32, 0.0],
            axis_y: [0.0, rect.h as f32],
            uv_min: [0.0, 0.0],
            uv_max: [1.0, 1.0],
            color: color.to_linear(),
        }
    }

    /// One-pixel-thick quad covering the pixel centers from `from` to `to`.
    fn line(from: Point, to: Point, color: Color) -> Self {
        let (x0, y0) = (from.x as f32 + 0.5, from.y as f32 + 0.5);
        let (dx, dy) = ((to.x - from.x) as f32, (to.y - from.y) as f32);
        let len = (dx * dx + dy * dy).sqrt();
        let (ux, uy) = if len > 0.0 { (dx / len, dy / len) } else { (1.0, 0.0) };
        let (nx, ny) = (-uy, ux);

        // Extend half a pixel past both endpoints so they are inclusive.
        Self {
            origin: [x0 - 0.5 * ux - 0.5 * nx, y0 - 0.5 * uy - 0.5 * ny],
            axis_x: [ux * (len + 1.0), uy * (len + 1.0)],
            axis_y: [nx, ny],
            uv_min: [0.0, 0.0],
            uv_max: [1.0, 1.0],
            color: color.to_linear(),
        }
    }

    /// Copy of texel rect `src` from a `texture`-sized image into `dst`.
    fn copy(src: Rect, dst: Rect, texture: Size, tint: Color, alpha: u8) -> Self {
        let tw = texture.width.max(1) as f32;
        let th = texture.height.max(1) as f32;
        let [r, g, b, _] = tint.to_linear();
        Self {
            origin: [dst.x as f32, dst.y as f32],
            axis_x: [dst.w as f32, 0.0],
            axis_y: [0.0, dst.h as f32],
            uv_min: [src.x as f32 / tw, src.y as f32 / th],
            uv_max: [src.right() as f32 / tw, src.bottom() as f32 / th],
            color: [r, g, b, alpha as f32 / 255.0],
        }
    }
}

/// A run of consecutive instances sharing texture, blend mode and clip.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Batch<H> {
    /// `None` samples the built-in white texture.
    pub texture: Option<H>,
    pub blend: BlendMode,
    pub clip: Option<Rect>,
    pub instances: Range<u32>,
}

/// Encodes draw items in submission order.
///
/// `texture_size` reports the texel size of a handle (used to normalize UVs).
pub(super) fn encode<H, F>(items: &[DrawItem<H>], texture_size: F) -> (Vec<SpriteInstance>, Vec<Batch<H>>)
where
    H: Clone + PartialEq,
    F: Fn(&H) -> Size,
{
    let mut instances = Vec::with_capacity(items.len());
    let mut batches: Vec<Batch<H>> = Vec::new();

    for item in items {
        let (instance, texture) = match &item.cmd {
            DrawCmd::Fill { rect, color, .. } => (SpriteInstance::solid(*rect, *color), None),
            DrawCmd::Line { from, to, color, .. } => (SpriteInstance::line(*from, *to, *color), None),
            DrawCmd::Copy { texture, src, dst, style } => (
                SpriteInstance::copy(*src, *dst, texture_size(texture), style.color, style.alpha),
                Some(texture),
            ),
        };

        let index = instances.len() as u32;
        instances.push(instance);

        let blend = item.cmd.blend();
        let extends_last = batches.last().is_some_and(|b| {
            b.blend == blend && b.clip == item.clip_rect && b.texture.as_ref() == texture
        });

        if extends_last {
            if let Some(last) = batches.last_mut() {
                last.instances.end = index + 1;
            }
        } else {
            batches.push(Batch {
                texture: texture.cloned(),
                blend,
                clip: item.clip_rect,
                instances: index..index + 1,
            });
        }
    }

    (instances, batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{DrawList, TextureStyle};

    fn sheet_size(_: &u32) -> Size {
        Size::new(200, 200)
    }

    #[test]
    fn copy_uvs_select_the_clip_region() {
        let mut list: DrawList<u32> = DrawList::new(Size::new(640, 480));
        list.copy(1, Rect::new(100, 100, 100, 100), Some(Rect::new(540, 380, 100, 100)), TextureStyle::default());

        let (instances, _) = encode(list.items(), sheet_size);
        let inst = instances[0];
        assert_eq!(inst.uv_min, [0.5, 0.5]);
        assert_eq!(inst.uv_max, [1.0, 1.0]);
        assert_eq!(inst.origin, [540.0, 380.0]);
        assert_eq!(inst.axis_x, [100.0, 0.0]);
        assert_eq!(inst.axis_y, [0.0, 100.0]);
    }

    #[test]
    fn alpha_modulation_is_linear() {
        let mut list: DrawList<u32> = DrawList::new(Size::new(640, 480));
        let style = TextureStyle { alpha: 51, ..TextureStyle::default() };
        list.copy(1, Rect::new(0, 0, 1, 1), None, style);

        let (instances, _) = encode(list.items(), sheet_size);
        assert!((instances[0].color[3] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn consecutive_compatible_items_share_a_batch() {
        let mut list: DrawList<u32> = DrawList::new(Size::new(640, 480));
        list.set_draw_color(Color::YELLOW);
        for y in (0..16).step_by(4) {
            list.draw_point(320, y);
        }
        list.copy(1, Rect::new(0, 0, 10, 10), None, TextureStyle::default());
        list.copy(1, Rect::new(0, 0, 10, 10), None, TextureStyle::default());
        list.copy(2, Rect::new(0, 0, 10, 10), None, TextureStyle::default());

        let (instances, batches) = encode(list.items(), sheet_size);
        assert_eq!(instances.len(), 7);
        let runs: Vec<_> = batches.iter().map(|b| (b.texture, b.instances.clone())).collect();
        assert_eq!(runs, vec![(None, 0..4), (Some(1), 4..6), (Some(2), 6..7)]);
    }

    #[test]
    fn viewport_change_splits_batches() {
        let mut list: DrawList<u32> = DrawList::new(Size::new(640, 480));
        list.set_viewport(Some(Rect::new(0, 0, 320, 240)));
        list.copy(1, Rect::new(0, 0, 10, 10), None, TextureStyle::default());
        list.set_viewport(Some(Rect::new(320, 0, 320, 240)));
        list.copy(1, Rect::new(0, 0, 10, 10), None, TextureStyle::default());

        let (_, batches) = encode(list.items(), sheet_size);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[1].clip, Some(Rect::new(320, 0, 320, 240)));
    }

    #[test]
    fn diagonal_line_covers_both_endpoints() {
        let inst = SpriteInstance::line(Point::new(0, 0), Point::new(3, 4), Color::BLUE);
        let len = (inst.axis_x[0].powi(2) + inst.axis_x[1].powi(2)).sqrt();
        assert!((len - 6.0).abs() < 1e-5);
        let thickness = (inst.axis_y[0].powi(2) + inst.axis_y[1].powi(2)).sqrt();
        assert!((thickness - 1.0).abs() < 1e-5);
    }
}
