/// How a draw call combines its source color with the target.
///
/// Follows the classic 2D renderer semantics:
/// - `None`:  `dst = src`
/// - `Blend`: `dst.rgb = src.rgb * src.a + dst.rgb * (1 - src.a)`
/// - `Add`:   `dst.rgb = src.rgb * src.a + dst.rgb`
/// - `Mod`:   `dst.rgb = src.rgb * dst.rgb`
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    #[default]
    None,
    Blend,
    Add,
    Mod,
}

impl BlendMode {
    pub const ALL: [BlendMode; 4] = [BlendMode::None, BlendMode::Blend, BlendMode::Add, BlendMode::Mod];

    /// Pipeline slot for this mode.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            BlendMode::None => 0,
            BlendMode::Blend => 1,
            BlendMode::Add => 2,
            BlendMode::Mod => 3,
        }
    }

    /// Fixed-function blend state for this mode (straight-alpha sources).
    ///
    /// `None` disables blending entirely.
    pub fn to_wgpu(self) -> Option<wgpu::BlendState> {
        let component = |src_factor, dst_factor| wgpu::BlendComponent {
            src_factor,
            dst_factor,
            operation: wgpu::BlendOperation::Add,
        };

        match self {
            BlendMode::None => None,
            BlendMode::Blend => Some(wgpu::BlendState {
                color: component(wgpu::BlendFactor::SrcAlpha, wgpu::BlendFactor::OneMinusSrcAlpha),
                alpha: component(wgpu::BlendFactor::One, wgpu::BlendFactor::OneMinusSrcAlpha),
            }),
            BlendMode::Add => Some(wgpu::BlendState {
                color: component(wgpu::BlendFactor::SrcAlpha, wgpu::BlendFactor::One),
                alpha: component(wgpu::BlendFactor::Zero, wgpu::BlendFactor::One),
            }),
            BlendMode::Mod => Some(wgpu::BlendState {
                color: component(wgpu::BlendFactor::Zero, wgpu::BlendFactor::Src),
                alpha: component(wgpu::BlendFactor::Zero, wgpu::BlendFactor::One),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense_and_ordered() {
        for (i, mode) in BlendMode::ALL.iter().enumerate() {
            assert_eq!(mode.index(), i);
        }
    }

    #[test]
    fn none_disables_blending() {
        assert!(BlendMode::None.to_wgpu().is_none());
        assert!(BlendMode::Blend.to_wgpu().is_some());
    }
}
