//! Harness errors with structured context.
//!
//! Nothing here is retried: every error is fatal to the test that raised it.
//! A non-zero exit code from the tool under test is never an error, it is
//! data carried by [`ExecutionResult`](crate::ExecutionResult).

use std::fmt;
use std::io;
use std::path::PathBuf;

use flowcheck_common::error_codes::{self, ErrorCategory};
use serde_json::{Value, json};
use thiserror::Error;

use crate::result::ExecutionResult;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Failed to create workspace at {}: {source}", .path.display())]
    WorkspaceCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove workspace {}: {source}", .path.display())]
    WorkspaceRemoval {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Working directory does not exist: {}", .path.display())]
    MissingWorkingDirectory { path: PathBuf },

    #[error("Failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Tool '{tool}' not found")]
    ToolNotFound { tool: String },

    #[error("Template not found: {}", .path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("Failed to copy template entry {}: {source}", .path.display())]
    TemplateCopy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Assertion(#[from] AssertionViolation),
}

impl HarnessError {
    pub fn code(&self) -> i32 {
        match self {
            HarnessError::WorkspaceCreation { .. } => error_codes::WORKSPACE_CREATION,
            HarnessError::WorkspaceRemoval { .. } => error_codes::WORKSPACE_REMOVAL,
            HarnessError::MissingWorkingDirectory { .. } => error_codes::MISSING_WORKING_DIRECTORY,
            HarnessError::Launch { .. } => error_codes::LAUNCH_FAILED,
            HarnessError::ToolNotFound { .. } => error_codes::TOOL_NOT_FOUND,
            HarnessError::TemplateNotFound { .. } => error_codes::TEMPLATE_NOT_FOUND,
            HarnessError::TemplateCopy { .. } => error_codes::TEMPLATE_COPY,
            HarnessError::Assertion(_) => error_codes::ASSERTION_FAILED,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        error_codes::category_for_code(self.code())
    }

    pub fn context(&self) -> Value {
        match self {
            HarnessError::WorkspaceCreation { path, source }
            | HarnessError::WorkspaceRemoval { path, source }
            | HarnessError::TemplateCopy { path, source } => json!({
                "path": path.display().to_string(),
                "reason": source.to_string()
            }),
            HarnessError::MissingWorkingDirectory { path }
            | HarnessError::TemplateNotFound { path } => json!({
                "path": path.display().to_string()
            }),
            HarnessError::Launch { program, source } => json!({
                "program": program,
                "reason": source.to_string(),
                "io_kind": format!("{:?}", source.kind())
            }),
            HarnessError::ToolNotFound { tool } => json!({ "tool": tool }),
            HarnessError::Assertion(violation) => violation.to_json(),
        }
    }

    pub fn suggestion(&self) -> String {
        match self {
            HarnessError::WorkspaceCreation { .. } => {
                "Check that the workspace root exists, is writable and has free space. Override it with FLOWCHECK_WORKSPACE_ROOT.".to_string()
            }
            HarnessError::WorkspaceRemoval { .. } => {
                "A child process may still hold files open in the workspace. Remove the directory manually.".to_string()
            }
            HarnessError::MissingWorkingDirectory { .. } => {
                "Create the directory before running the command, or point the invocation at a workspace.".to_string()
            }
            HarnessError::Launch { .. } => {
                "Check that the program exists and is executable.".to_string()
            }
            HarnessError::ToolNotFound { .. } => {
                "Install the tool, add it to PATH, or pass an explicit path with --tool / FLOWCHECK_TOOL.".to_string()
            }
            HarnessError::TemplateNotFound { .. } => {
                "Check the assets root (--assets / FLOWCHECK_ASSETS) contains the template directory.".to_string()
            }
            HarnessError::TemplateCopy { .. } => {
                "Check permissions on the template and the workspace root.".to_string()
            }
            HarnessError::Assertion(_) => {
                "Inspect the captured output above; rerun with --keep-workspaces to examine the workspace.".to_string()
            }
        }
    }

    /// Always false: a failed launch or assertion is reported, never retried.
    pub fn is_retryable(&self) -> bool {
        false
    }

    pub fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn to_json(&self) -> Value {
        json!({
            "code": self.code(),
            "message": self.to_string(),
            "category": self.category().as_str(),
            "context": self.context(),
            "suggestion": self.suggestion(),
            "retryable": self.is_retryable()
        })
    }
}

/// An unmet expectation, carrying everything needed to debug it.
#[derive(Clone, PartialEq, Eq)]
pub struct AssertionViolation {
    message: String,
    expected: Option<String>,
    actual: Option<String>,
    command_line: Option<String>,
    exit_code: Option<i32>,
    stdout: Option<String>,
    stderr: Option<String>,
}

impl AssertionViolation {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expected: None,
            actual: None,
            command_line: None,
            exit_code: None,
            stdout: None,
            stderr: None,
        }
    }

    pub fn expected(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    pub fn actual(mut self, actual: impl Into<String>) -> Self {
        self.actual = Some(actual.into());
        self
    }

    /// Attaches the command line, exit code and captured output of `result`.
    pub fn with_result(mut self, result: &ExecutionResult) -> Self {
        self.command_line = Some(result.command_line().to_string());
        self.exit_code = Some(result.exit_code());
        self.stdout = result.stdout().map(str::to_string);
        self.stderr = result.stderr().map(str::to_string);
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn expected_value(&self) -> Option<&str> {
        self.expected.as_deref()
    }

    pub fn actual_value(&self) -> Option<&str> {
        self.actual.as_deref()
    }

    pub fn command_line(&self) -> Option<&str> {
        self.command_line.as_deref()
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn stdout(&self) -> Option<&str> {
        self.stdout.as_deref()
    }

    pub fn stderr(&self) -> Option<&str> {
        self.stderr.as_deref()
    }

    pub fn to_json(&self) -> Value {
        json!({
            "message": self.message,
            "expected": self.expected,
            "actual": self.actual,
            "command": self.command_line,
            "exit_code": self.exit_code,
            "stdout": self.stdout,
            "stderr": self.stderr
        })
    }
}

impl fmt::Display for AssertionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(expected) = &self.expected {
            write!(f, "\n  expected: {}", expected)?;
        }
        if let Some(actual) = &self.actual {
            write!(f, "\n  actual:   {}", actual)?;
        }
        if let Some(command_line) = &self.command_line {
            write!(f, "\n  command:  {}", command_line)?;
        }
        if let Some(code) = self.exit_code {
            write!(f, "\n  exit code: {}", code)?;
        }
        if let Some(stdout) = &self.stdout {
            write!(f, "\n--- stdout ---\n{}", stdout.trim_end())?;
        }
        if let Some(stderr) = &self.stderr {
            write!(f, "\n--- stderr ---\n{}", stderr.trim_end())?;
        }
        Ok(())
    }
}

// Test bodies return `Result`, and the test harness prints errors with
// `Debug`; show the full diagnostic rather than a struct dump.
impl fmt::Debug for AssertionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl std::error::Error for AssertionViolation {}
