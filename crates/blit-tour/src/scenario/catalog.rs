use blit_engine::coords::{Point, Rect};
use blit_engine::input::Key;
use blit_engine::paint::{BlendMode, Color};
use blit_engine::time::SpriteAnimation;

use super::{
    Action, Binding, Channel, DrawOp, LoadPolicy, Position, Scenario, TextureSlot, TextureSpec,
};

pub const DEFAULT_SCENARIO: &str = "animation";

const SCREEN_W: i32 = 640;
const SCREEN_H: i32 = 480;

/// All built-in scenarios, in tour order.
pub fn catalog() -> Vec<Scenario> {
    vec![
        texture(),
        geometry(),
        viewport(),
        color_key(),
        sprites(),
        modulation(),
        alpha(),
        animation(),
    ]
}

pub fn find(name: &str) -> Option<Scenario> {
    catalog().into_iter().find(|s| s.name == name)
}

pub fn names() -> Vec<&'static str> {
    catalog().iter().map(|s| s.name).collect()
}

fn base(name: &'static str, title: &'static str, background: Color) -> Scenario {
    Scenario {
        name,
        title,
        width: SCREEN_W as u32,
        height: SCREEN_H as u32,
        background,
        vsync: false,
        textures: Vec::new(),
        on_load_failure: LoadPolicy::Abort,
        bindings: Vec::new(),
        script: Vec::new(),
    }
}

fn texture() -> Scenario {
    Scenario {
        textures: vec![TextureSpec::plain("texture.png")],
        script: vec![DrawOp::Stretch {
            texture: 0,
            clip: None,
            dst: None,
        }],
        ..base("texture", "blit: texture loading", Color::CYAN)
    }
}

fn geometry() -> Scenario {
    let (w, h) = (SCREEN_W, SCREEN_H);
    let dotted: Vec<Point> = (0..h).step_by(4).map(|y| Point::new(w / 2, y)).collect();

    Scenario {
        on_load_failure: LoadPolicy::Continue,
        script: vec![
            DrawOp::SetDrawColor(Color::RED),
            DrawOp::FillRect(Rect::new(w / 4, h / 4, w / 2, h / 2)),
            DrawOp::SetDrawColor(Color::GREEN),
            DrawOp::OutlineRect(Rect::new(w / 6, h / 6, w * 2 / 3, h * 2 / 3)),
            DrawOp::SetDrawColor(Color::BLUE),
            DrawOp::Line(Point::new(0, h / 2), Point::new(w, h / 2)),
            DrawOp::SetDrawColor(Color::YELLOW),
            DrawOp::Points(dotted),
        ],
        ..base("geometry", "blit: geometry rendering", Color::WHITE)
    }
}

fn viewport() -> Scenario {
    let (w, h) = (SCREEN_W, SCREEN_H);
    let stretch = DrawOp::Stretch {
        texture: 0,
        clip: None,
        dst: None,
    };

    Scenario {
        textures: vec![TextureSpec::plain("viewport.png")],
        script: vec![
            DrawOp::SetViewport(Some(Rect::new(0, 0, w / 2, h / 2))),
            stretch.clone(),
            DrawOp::SetViewport(Some(Rect::new(w / 2, 0, w / 2, h / 2))),
            stretch.clone(),
            DrawOp::SetViewport(Some(Rect::new(0, h / 2, w, h / 2))),
            stretch,
            DrawOp::SetViewport(None),
        ],
        ..base("viewport", "blit: viewports", Color::WHITE)
    }
}

fn color_key() -> Scenario {
    Scenario {
        textures: vec![
            TextureSpec::plain("background.png"),
            TextureSpec::keyed("foo.png", Color::CYAN),
        ],
        script: vec![
            render(0, 0, 0, None),
            render(1, 240, 190, None),
        ],
        ..base("color_key", "blit: color keying", Color::WHITE)
    }
}

fn sprites() -> Scenario {
    let (w, h) = (SCREEN_W, SCREEN_H);
    let clips = [
        Rect::new(0, 0, 100, 100),
        Rect::new(100, 0, 100, 100),
        Rect::new(0, 100, 100, 100),
        Rect::new(100, 100, 100, 100),
    ];

    Scenario {
        textures: vec![TextureSpec::keyed("dots.png", Color::CYAN)],
        script: vec![
            render(0, 0, 0, Some(clips[0])),
            render(0, w - clips[1].w, 0, Some(clips[1])),
            render(0, 0, h - clips[2].h, Some(clips[2])),
            render(0, w - clips[3].w, h - clips[3].h, Some(clips[3])),
        ],
        ..base("sprites", "blit: clip rendering and sprite sheets", Color::WHITE)
    }
}

fn modulation() -> Scenario {
    let adjust = |key, channel, delta| {
        Binding::new(
            key,
            Action::AdjustColor {
                texture: 0,
                channel,
                delta,
            },
        )
    };

    Scenario {
        textures: vec![TextureSpec::plain("colors.png")],
        bindings: vec![
            adjust(Key::Q, Channel::Red, 32),
            adjust(Key::W, Channel::Green, 32),
            adjust(Key::E, Channel::Blue, 32),
            adjust(Key::A, Channel::Red, -32),
            adjust(Key::S, Channel::Green, -32),
            adjust(Key::D, Channel::Blue, -32),
        ],
        script: vec![render(0, 0, 0, None)],
        ..base("modulation", "blit: color modulation", Color::WHITE)
    }
}

fn alpha() -> Scenario {
    Scenario {
        textures: vec![
            TextureSpec::plain("fadein.png"),
            TextureSpec::plain("fadeout.png"),
        ],
        bindings: vec![
            Binding::new(Key::W, Action::AdjustAlpha { texture: 1, delta: 32 }),
            Binding::new(Key::S, Action::AdjustAlpha { texture: 1, delta: -32 }),
        ],
        script: vec![
            DrawOp::SetBlendMode {
                texture: 1,
                blend: BlendMode::Blend,
            },
            render(0, 0, 0, None),
            render(1, 0, 0, None),
        ],
        ..base("alpha", "blit: alpha blending", Color::WHITE)
    }
}

fn animation() -> Scenario {
    let clips = (0..4).map(|i| Rect::new(i * 64, 0, 64, 205)).collect();

    Scenario {
        vsync: true,
        textures: vec![TextureSpec::keyed("foo_walk.png", Color::CYAN)],
        script: vec![DrawOp::Animate {
            texture: 0,
            animation: SpriteAnimation::new(4, 8),
            clips,
            position: Position::Centered,
        }],
        ..base("animation", "blit: animated sprites and vsync", Color::WHITE)
    }
}

fn render(texture: TextureSlot, x: i32, y: i32, clip: Option<Rect>) -> DrawOp {
    DrawOp::Render { texture, x, y, clip }
}
