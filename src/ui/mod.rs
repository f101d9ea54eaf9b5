//! A single-threaded UI scheduler.
//!
//! All view state lives in one value owned by a `UiLoop`. Storage and network work run on
//! background workers and hand their results back to the loop through a `UiHandle`. Views are
//! identified by a `ViewToken`; a result addressed to a token whose view has been torn down is
//! dropped instead of being applied.

mod scheduler;

pub use scheduler::{UiHandle, UiLoop, UiTask};

/// Identifies one mounted instance of a view. A view that is torn down and mounted again gets a
/// new token, so results addressed to the old instance can be recognized and discarded.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ViewToken(u64);

/// Hands out `ViewToken`s. Tokens are never reused.
#[derive(Debug, Default)]
pub struct ViewTokens {
    next: u64,
}

impl ViewTokens {
    pub fn issue(&mut self) -> ViewToken {
        self.next += 1;
        ViewToken(self.next)
    }
}
