//! # Sink lifecycle states.
//!
//! ```text
//! Starting ──(coordinator created + subscribed, or forwarding off)──► Active
//! Active   ──(run end received)──────────────────────────────────────► Terminating
//! Terminating ──(report + base termination done)─────────────────────► Terminated
//! ```
//!
//! Transitions only move forward; anything else is rejected.

use std::fmt;

/// Current phase of a sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SinkState {
    Starting,
    Active,
    Terminating,
    Terminated,
}

impl SinkState {
    /// Moves to `next` if it is the immediate successor.
    ///
    /// Returns `false` (and leaves the state untouched) otherwise.
    pub(crate) fn advance(&mut self, next: SinkState) -> bool {
        let allowed = matches!(
            (*self, next),
            (SinkState::Starting, SinkState::Active)
                | (SinkState::Active, SinkState::Terminating)
                | (SinkState::Terminating, SinkState::Terminated)
        );
        if allowed {
            *self = next;
        }
        allowed
    }

    /// True once a run end has been accepted.
    #[inline]
    pub fn is_ending(self) -> bool {
        self >= SinkState::Terminating
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SinkState::Starting => "starting",
            SinkState::Active => "active",
            SinkState::Terminating => "terminating",
            SinkState::Terminated => "terminated",
        }
    }
}

impl fmt::Display for SinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_forward_steps_are_allowed() {
        let mut s = SinkState::Starting;
        assert!(!s.advance(SinkState::Terminating));
        assert!(s.advance(SinkState::Active));
        assert!(!s.advance(SinkState::Active));
        assert!(s.advance(SinkState::Terminating));
        assert!(s.is_ending());
        assert!(!s.advance(SinkState::Active));
        assert!(s.advance(SinkState::Terminated));
        assert_eq!(s, SinkState::Terminated);
    }
}
