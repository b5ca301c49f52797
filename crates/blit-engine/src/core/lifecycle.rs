use thiserror::Error;

/// Frame-loop states, in acquisition order.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Uninitialized,
    /// Window, device and render target exist.
    Initialized,
    /// `App::on_load` has run.
    Loaded,
    Running,
    ShuttingDown,
    Terminated,
}

impl LoopState {
    /// Whether `self -> to` is a legal edge.
    ///
    /// Any state before `ShuttingDown` may go straight to it.
    pub fn can_advance_to(self, to: LoopState) -> bool {
        use LoopState::*;
        matches!(
            (self, to),
            (Uninitialized, Initialized)
                | (Initialized, Loaded)
                | (Loaded, Running)
                | (Uninitialized | Initialized | Loaded | Running, ShuttingDown)
                | (ShuttingDown, Terminated)
        )
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Error)]
#[error("illegal frame loop transition {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: LoopState,
    pub to: LoopState,
}

/// Tracks the frame-loop state and rejects illegal transitions.
#[derive(Debug)]
pub struct Lifecycle {
    state: LoopState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: LoopState::Uninitialized,
        }
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    #[inline]
    pub fn is_shutting_down(&self) -> bool {
        self.state == LoopState::ShuttingDown
    }

    #[inline]
    pub fn is_terminated(&self) -> bool {
        self.state == LoopState::Terminated
    }

    pub fn advance(&mut self, to: LoopState) -> Result<(), TransitionError> {
        if !self.state.can_advance_to(to) {
            return Err(TransitionError {
                from: self.state,
                to,
            });
        }

        log::debug!("frame loop {:?} -> {:?}", self.state, to);
        self.state = to;
        Ok(())
    }

    /// Enters `ShuttingDown` from any pre-shutdown state.
    ///
    /// Returns `false` when shutdown is already underway or finished.
    pub fn begin_shutdown(&mut self) -> bool {
        self.advance(LoopState::ShuttingDown).is_ok()
    }
}
