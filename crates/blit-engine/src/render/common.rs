//! Shared GPU types and utilities for the sprite pipeline.

use bytemuck::{Pod, Zeroable};

use crate::coords::{Rect, Size};

// ── target-size uniform ───────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct TargetUniform {
    pub size: [f32; 2],
    pub _pad: [f32; 2], // 16-byte alignment
}

/// Minimum binding size for the target uniform buffer (16 bytes, never zero).
pub(super) fn target_ubo_min_binding_size() -> Option<std::num::NonZeroU64> {
    std::num::NonZeroU64::new(std::mem::size_of::<TargetUniform>() as u64)
}

// ── quad vertex ───────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(super) struct QuadVertex {
    pub pos: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub(super) const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.0, 0.0] },
    QuadVertex { pos: [1.0, 0.0] },
    QuadVertex { pos: [1.0, 1.0] },
    QuadVertex { pos: [0.0, 1.0] },
];

pub(super) const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

// ── scissor rect ──────────────────────────────────────────────────────────

/// Converts a logical-pixel clip rect to physical scissor rect arguments for wgpu.
///
/// Returns `None` if the clipped area is empty (the draw call must be skipped).
/// `clip = None` means "no scissor" and returns the full target rect.
pub(super) fn logical_clip_to_scissor(
    clip: Option<Rect>,
    target: Size,
    scale: f32,
) -> Option<(u32, u32, u32, u32)> {
    let phys_w = ((target.width as f32 * scale).round() as u32).max(1);
    let phys_h = ((target.height as f32 * scale).round() as u32).max(1);

    let (x, y, w, h) = match clip {
        None => (0, 0, phys_w, phys_h),
        Some(r) => {
            let r = r.normalized();
            let to_phys = |v: i32, max: u32| ((v as f32 * scale).round().max(0.0) as u32).min(max);
            let x = to_phys(r.x, phys_w);
            let y = to_phys(r.y, phys_h);
            let x2 = to_phys(r.right(), phys_w);
            let y2 = to_phys(r.bottom(), phys_h);
            (x, y, x2.saturating_sub(x), y2.saturating_sub(y))
        }
    };

    if w == 0 || h == 0 { None } else { Some((x, y, w, h)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: Size = Size::new(640, 480);

    #[test]
    fn no_clip_is_full_physical_target() {
        assert_eq!(logical_clip_to_scissor(None, TARGET, 2.0), Some((0, 0, 1280, 960)));
    }

    #[test]
    fn clip_is_scaled_to_physical_pixels() {
        let clip = Rect::new(320, 0, 320, 240);
        assert_eq!(logical_clip_to_scissor(Some(clip), TARGET, 1.5), Some((480, 0, 480, 360)));
    }

    #[test]
    fn clip_outside_target_is_skipped() {
        let clip = Rect::new(700, 10, 50, 50);
        assert_eq!(logical_clip_to_scissor(Some(clip), TARGET, 1.0), None);
    }

    #[test]
    fn clip_is_clamped_to_target() {
        let clip = Rect::new(-10, 400, 100, 200);
        assert_eq!(logical_clip_to_scissor(Some(clip), TARGET, 1.0), Some((0, 400, 90, 80)));
    }
}
