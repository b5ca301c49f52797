//! Core engine-facing contracts.
//!
//! This module defines the interface between the runtime (platform loop) and
//! applications, plus the frame-loop lifecycle the runtime walks through.

mod app;
mod ctx;
mod lifecycle;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, LoadCtx, WindowCtx};
pub use lifecycle::{Lifecycle, LoopState, TransitionError};

pub(crate) use ctx::logical_size;
