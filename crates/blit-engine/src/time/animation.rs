/// Frame-stepped sprite animation.
///
/// Advances one sprite frame every `ticks_per_frame` presented frames and wraps
/// around after the last one. Without vsync the speed depends on the frame rate.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SpriteAnimation {
    frames: u32,
    ticks_per_frame: u32,
}

impl SpriteAnimation {
    /// Both arguments are clamped to at least 1.
    pub fn new(frames: u32, ticks_per_frame: u32) -> Self {
        Self {
            frames: frames.max(1),
            ticks_per_frame: ticks_per_frame.max(1),
        }
    }

    #[inline]
    pub fn frames(&self) -> u32 {
        self.frames
    }

    #[inline]
    pub fn ticks_per_frame(&self) -> u32 {
        self.ticks_per_frame
    }

    /// Sprite frame shown at `tick`: `floor(tick / ticks_per_frame) mod frames`.
    #[inline]
    pub fn frame_at(&self, tick: u64) -> usize {
        ((tick / self.ticks_per_frame as u64) % self.frames as u64) as usize
    }

    /// Ticks in one full cycle.
    #[inline]
    pub fn period(&self) -> u64 {
        self.frames as u64 * self.ticks_per_frame as u64
    }
}
