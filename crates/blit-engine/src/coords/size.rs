/// Render target size in logical pixels.
///
/// Renderers treat this as the coordinate basis when converting positions to NDC.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }
}
