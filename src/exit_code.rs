//! Recommended process exit code derived from an aggregated run.

use std::fmt;

/// Exit code recommended by a sink: `0` for a passing run, `1` otherwise.
///
/// An indeterminate run (no verdict at all) is a failure: a test run with
/// no data is not a success.
///
/// # Example
/// ```
/// use multinode_sink::ExitCode;
///
/// assert_eq!(ExitCode::from_passed(Some(true)).code(), 0);
/// assert_eq!(ExitCode::from_passed(Some(false)).code(), 1);
/// assert_eq!(ExitCode::from_passed(None).code(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExitCode {
    Success,
    Failure,
}

impl ExitCode {
    /// Maps an aggregated verdict to an exit code.
    #[inline]
    pub fn from_passed(passed: Option<bool>) -> Self {
        if passed.unwrap_or(false) {
            ExitCode::Success
        } else {
            ExitCode::Failure
        }
    }

    /// Integer value (`0` or `1`).
    #[inline]
    pub fn code(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::Failure => 1,
        }
    }

    #[inline]
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => std::process::ExitCode::SUCCESS,
            ExitCode::Failure => std::process::ExitCode::FAILURE,
        }
    }
}
