//! Scenarios: data-described draw scripts run by one frame loop.
//!
//! A scenario names the textures it needs, what to do when one fails to load,
//! which keys adjust texture modulation, and the ordered draw operations
//! replayed every frame.

mod bindings;
mod catalog;
mod player;

pub use bindings::{Action, Binding, Channel};
pub use catalog::{catalog, find, names, DEFAULT_SCENARIO};
pub use player::{LoadOutcome, Player};

use blit_engine::coords::{Point, Rect};
use blit_engine::paint::{BlendMode, Color};
use blit_engine::time::SpriteAnimation;

/// Index into [`Scenario::textures`].
pub type TextureSlot = usize;

/// An image the scenario loads before running.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSpec {
    /// Path relative to the asset directory.
    pub path: &'static str,
    /// Pixels with exactly this RGB become transparent.
    pub color_key: Option<Color>,
}

impl TextureSpec {
    pub const fn plain(path: &'static str) -> Self {
        Self { path, color_key: None }
    }

    pub const fn keyed(path: &'static str, key: Color) -> Self {
        Self {
            path,
            color_key: Some(key),
        }
    }
}

/// What happens when a texture fails to load.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoadPolicy {
    /// Run anyway; draws of the empty texture are skipped.
    Continue,
    /// Skip the frame loop and shut down.
    Abort,
}

/// Where an animated sprite is placed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Position {
    At(Point),
    /// Centered in the current output area using the frame's clip size.
    Centered,
}

/// One step of a draw script.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    SetDrawColor(Color),
    Clear,
    FillRect(Rect),
    OutlineRect(Rect),
    Line(Point, Point),
    Points(Vec<Point>),
    SetViewport(Option<Rect>),
    Render {
        texture: TextureSlot,
        x: i32,
        y: i32,
        clip: Option<Rect>,
    },
    Stretch {
        texture: TextureSlot,
        clip: Option<Rect>,
        dst: Option<Rect>,
    },
    Animate {
        texture: TextureSlot,
        animation: SpriteAnimation,
        clips: Vec<Rect>,
        position: Position,
    },
    SetColorMod {
        texture: TextureSlot,
        color: Color,
    },
    SetAlphaMod {
        texture: TextureSlot,
        alpha: u8,
    },
    SetBlendMode {
        texture: TextureSlot,
        blend: BlendMode,
    },
}

impl DrawOp {
    /// Texture slot the operation touches, if any.
    pub fn texture(&self) -> Option<TextureSlot> {
        match self {
            DrawOp::Render { texture, .. }
            | DrawOp::Stretch { texture, .. }
            | DrawOp::Animate { texture, .. }
            | DrawOp::SetColorMod { texture, .. }
            | DrawOp::SetAlphaMod { texture, .. }
            | DrawOp::SetBlendMode { texture, .. } => Some(*texture),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: &'static str,
    pub title: &'static str,
    pub width: u32,
    pub height: u32,
    /// Clear color set at the start of every frame.
    pub background: Color,
    pub vsync: bool,
    pub textures: Vec<TextureSpec>,
    pub on_load_failure: LoadPolicy,
    pub bindings: Vec<Binding>,
    pub script: Vec<DrawOp>,
}
