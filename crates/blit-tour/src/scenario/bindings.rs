use blit_engine::input::Key;
use blit_engine::texture::Texture;

use super::TextureSlot;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

/// Modulation change applied to a texture on a key press.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
    AdjustColor {
        texture: TextureSlot,
        channel: Channel,
        delta: i16,
    },
    AdjustAlpha {
        texture: TextureSlot,
        delta: i16,
    },
}

impl Action {
    pub fn texture(self) -> TextureSlot {
        match self {
            Action::AdjustColor { texture, .. } | Action::AdjustAlpha { texture, .. } => texture,
        }
    }

    /// Applies the change; components saturate at 0 and 255.
    pub fn apply<H>(self, texture: &mut Texture<H>) {
        match self {
            Action::AdjustColor { channel, delta, .. } => {
                let c = texture.color();
                let (r, g, b) = match channel {
                    Channel::Red => (saturating_adjust(c.r, delta), c.g, c.b),
                    Channel::Green => (c.r, saturating_adjust(c.g, delta), c.b),
                    Channel::Blue => (c.r, c.g, saturating_adjust(c.b, delta)),
                };
                texture.set_color(r, g, b);
            }
            Action::AdjustAlpha { delta, .. } => {
                texture.set_alpha(saturating_adjust(texture.alpha(), delta));
            }
        }
    }
}

/// A key press (auto-repeats included) that triggers `action`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Binding {
    pub key: Key,
    pub action: Action,
}

impl Binding {
    pub const fn new(key: Key, action: Action) -> Self {
        Self { key, action }
    }
}

fn saturating_adjust(value: u8, delta: i16) -> u8 {
    (value as i16 + delta).clamp(0, u8::MAX as i16) as u8
}
