//! Commands that touch engine-owned state.
//!
//! Plain controls live on the [`ParamSurface`](crate::ParamSurface). Anything
//! that mutates filter, echo or playhead state is queued here instead and
//! drained by the audio thread at the next block boundary.

use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::params::Seek;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum EngineCommand {
    /// Clear filter memory and echo history. Playback continues.
    ClearEffects,
    /// Move the playhead (clamped into the source).
    Seek(Seek),
}

pub trait CommandReceiver {
    fn pop(&mut self) -> Option<EngineCommand>;
}

#[cfg(feature = "rtrb")]
impl CommandReceiver for Consumer<EngineCommand> {
    fn pop(&mut self) -> Option<EngineCommand> {
        Consumer::pop(self).ok()
    }
}

impl CommandReceiver for VecDeque<EngineCommand> {
    fn pop(&mut self) -> Option<EngineCommand> {
        self.pop_front()
    }
}
