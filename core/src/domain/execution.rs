//! Remote command execution result.

use crate::error::Error;

/// Outcome of a command executed inside a container.
///
/// The exit code and the error are independent: a transport failure can be
/// reported together with whatever exit code was observed.
#[derive(Debug)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub error: Option<Error>,
}

impl ExecutionResult {
    pub fn new(exit_code: i32, error: Option<Error>) -> Self {
        Self { exit_code, error }
    }

    /// Exit code 0 without an error is the only success.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0 && self.error.is_none()
    }
}
