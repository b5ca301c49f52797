//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per render loop; `tick()` once per presented frame
//! - `SpriteAnimation` maps the clock's frame index to a sprite-sheet frame

mod animation;
mod frame_clock;

pub use animation::SpriteAnimation;
pub use frame_clock::{FrameClock, FrameTime};
