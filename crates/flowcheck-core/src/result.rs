use std::process::ExitStatus;
use std::process::Output;
use std::time::Duration;

use serde::Serialize;

use crate::assertions::ResultAssert;

/// Exit code recorded for a child that terminated without one (killed by a signal).
pub const NO_EXIT_CODE: i32 = -1;

/// Outcome of one finished external process. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    command_line: String,
    exit_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stdout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stderr: Option<String>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    duration: Duration,
}

impl ExecutionResult {
    pub fn new(
        command_line: impl Into<String>,
        exit_code: i32,
        stdout: Option<String>,
        stderr: Option<String>,
    ) -> Self {
        Self {
            command_line: command_line.into(),
            exit_code,
            signal: None,
            stdout,
            stderr,
            duration: Duration::ZERO,
        }
    }

    pub(crate) fn from_status(
        command_line: String,
        status: ExitStatus,
        duration: Duration,
    ) -> Self {
        Self {
            command_line,
            exit_code: status.code().unwrap_or(NO_EXIT_CODE),
            signal: termination_signal(&status),
            stdout: None,
            stderr: None,
            duration,
        }
    }

    pub(crate) fn from_output(command_line: String, output: Output, duration: Duration) -> Self {
        Self {
            stdout: Some(String::from_utf8_lossy(&output.stdout).into_owned()),
            stderr: Some(String::from_utf8_lossy(&output.stderr).into_owned()),
            ..Self::from_status(command_line, output.status, duration)
        }
    }

    /// Program and argument tokens as they were handed to the process.
    pub fn command_line(&self) -> &str {
        &self.command_line
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Signal that terminated the child, on platforms that report one.
    pub fn signal(&self) -> Option<i32> {
        self.signal
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Captured standard output; `None` when output was passed through.
    pub fn stdout(&self) -> Option<&str> {
        self.stdout.as_deref()
    }

    /// Captured standard error; `None` when output was passed through.
    pub fn stderr(&self) -> Option<&str> {
        self.stderr.as_deref()
    }

    pub fn is_captured(&self) -> bool {
        self.stdout.is_some()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Starts an assertion chain over this result.
    pub fn should(&self) -> ResultAssert<'_> {
        ResultAssert::new(self)
    }
}

fn serialize_millis<S: serde::Serializer>(
    duration: &Duration,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

#[cfg(unix)]
fn termination_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
