//! One configured launch of the tool under test.
//!
//! Arguments are forwarded to the child exactly as given: there is no shell
//! in between, so globs, pipes, redirects and quotes reach the program as
//! literal text.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Stdio;
use std::time::Instant;

use serde::Serialize;

use crate::error::HarnessError;
use crate::result::ExecutionResult;

/// Sub-command family of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Scaffolds a new project (`new`).
    New,
    Restore,
    Build,
    Run,
    Clean,
    /// No preconfigured sub-command; the caller supplies every token.
    Custom,
}

impl CommandKind {
    pub fn subcommand(&self) -> Option<&'static str> {
        match self {
            CommandKind::New => Some("new"),
            CommandKind::Restore => Some("restore"),
            CommandKind::Build => Some("build"),
            CommandKind::Run => Some("run"),
            CommandKind::Clean => Some("clean"),
            CommandKind::Custom => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.subcommand().unwrap_or("custom")
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the child's output reaches the host console or the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Inherit,
    Capture,
}

/// Splits a whitespace-delimited argument string into tokens.
///
/// No quoting or escaping is interpreted; an empty or blank string yields no
/// tokens.
pub fn split_args(args: &str) -> Vec<String> {
    args.split_whitespace().map(str::to_string).collect()
}

#[derive(Debug, Clone)]
pub struct CommandInvocation {
    program: PathBuf,
    kind: CommandKind,
    working_directory: Option<PathBuf>,
    environment: BTreeMap<String, String>,
}

impl CommandInvocation {
    pub fn new(program: impl Into<PathBuf>, kind: CommandKind) -> Self {
        Self {
            program: program.into(),
            kind,
            working_directory: None,
            environment: BTreeMap::new(),
        }
    }

    pub fn with_working_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(path.into());
        self
    }

    /// Sets an environment variable for the child only. A later call for the
    /// same name replaces the earlier value.
    pub fn with_environment_variable(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.environment.insert(name.into(), value.into());
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn working_directory(&self) -> Option<&Path> {
        self.working_directory.as_deref()
    }

    pub fn environment(&self) -> &BTreeMap<String, String> {
        &self.environment
    }

    /// Sub-command token (if any) followed by `extra`, in order.
    pub fn tokens<I, S>(&self, extra: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kind
            .subcommand()
            .map(str::to_string)
            .into_iter()
            .chain(extra.into_iter().map(Into::into))
            .collect()
    }

    /// Runs with output passed through to the host console.
    pub fn execute(&self, args: &str) -> Result<ExecutionResult, HarnessError> {
        self.execute_args(split_args(args))
    }

    /// Runs with stdout and stderr captured into the result.
    pub fn execute_with_captured_output(
        &self,
        args: &str,
    ) -> Result<ExecutionResult, HarnessError> {
        self.execute_args_with_captured_output(split_args(args))
    }

    pub fn execute_args<I, S>(&self, args: I) -> Result<ExecutionResult, HarnessError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spawn(self.tokens(args), OutputMode::Inherit)
    }

    pub fn execute_args_with_captured_output<I, S>(
        &self,
        args: I,
    ) -> Result<ExecutionResult, HarnessError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spawn(self.tokens(args), OutputMode::Capture)
    }

    fn command_line(&self, tokens: &[String]) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(tokens.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn spawn(
        &self,
        tokens: Vec<String>,
        mode: OutputMode,
    ) -> Result<ExecutionResult, HarnessError> {
        let mut command = Command::new(&self.program);
        command
            .args(tokens.iter().map(OsStr::new))
            .envs(&self.environment)
            .stdin(Stdio::null());

        if let Some(dir) = &self.working_directory {
            if !dir.is_dir() {
                return Err(HarnessError::MissingWorkingDirectory { path: dir.clone() });
            }
            command.current_dir(dir);
        }

        let command_line = self.command_line(&tokens);
        tracing::debug!(
            command = %command_line,
            kind = %self.kind,
            cwd = ?self.working_directory,
            env = ?self.environment.keys().collect::<Vec<_>>(),
            captured = mode == OutputMode::Capture,
            "launching"
        );

        let launch_error = |source| HarnessError::Launch {
            program: self.program.display().to_string(),
            source,
        };

        let started = Instant::now();
        let result = match mode {
            OutputMode::Inherit => {
                let status = command
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .map_err(launch_error)?;
                ExecutionResult::from_status(command_line, status, started.elapsed())
            }
            OutputMode::Capture => {
                let output = command.output().map_err(launch_error)?;
                ExecutionResult::from_output(command_line, output, started.elapsed())
            }
        };

        tracing::debug!(
            command = %result.command_line(),
            exit_code = result.exit_code(),
            duration_ms = result.duration().as_millis() as u64,
            "finished"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_split_args_preserves_order() {
        assert_eq!(
            split_args("console --no-restore  -o  out"),
            vec!["console", "--no-restore", "-o", "out"]
        );
    }

    #[test]
    fn test_split_args_empty() {
        assert!(split_args("").is_empty());
        assert!(split_args("   \t\n").is_empty());
    }

    #[test]
    fn test_split_args_keeps_shell_syntax_literal() {
        assert_eq!(
            split_args("*.dll | grep \"x y\" > out"),
            vec!["*.dll", "|", "grep", "\"x", "y\"", ">", "out"]
        );
    }

    #[test]
    fn test_tokens_prefix_subcommand() {
        let invocation = CommandInvocation::new("dotnet", CommandKind::Restore);
        assert_eq!(
            invocation.tokens(["/p:SkipInvalidConfigurations=true"]),
            vec!["restore", "/p:SkipInvalidConfigurations=true"]
        );
    }

    #[test]
    fn test_custom_kind_has_no_subcommand() {
        let invocation = CommandInvocation::new("dotnet", CommandKind::Custom);
        assert_eq!(invocation.tokens(["-d", "portable"]), vec!["-d", "portable"]);
        assert_eq!(CommandKind::Custom.to_string(), "custom");
    }

    #[test]
    fn test_environment_last_write_wins() {
        let invocation = CommandInvocation::new("dotnet", CommandKind::Run)
            .with_environment_variable("DOTNET_ROOT", "/first")
            .with_environment_variable("OTHER", "x")
            .with_environment_variable("DOTNET_ROOT", "/second");
        assert_eq!(invocation.environment().len(), 2);
        assert_eq!(invocation.environment()["DOTNET_ROOT"], "/second");
    }

    #[test]
    fn test_missing_working_directory_fails_before_launch() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let err = CommandInvocation::new("definitely-not-a-real-program", CommandKind::Build)
            .with_working_directory(&missing)
            .execute("")
            .unwrap_err();
        assert!(matches!(err, HarnessError::MissingWorkingDirectory { path } if path == missing));
    }

    #[test]
    fn test_unknown_program_is_launch_error() {
        let err = CommandInvocation::new("flowcheck-no-such-program-7c1e", CommandKind::Build)
            .execute_with_captured_output("")
            .unwrap_err();
        assert!(matches!(err, HarnessError::Launch { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_a_result_not_an_error() {
        let result = CommandInvocation::new("sh", CommandKind::Custom)
            .execute_args_with_captured_output(["-c", "echo oops >&2; exit 3"])
            .unwrap();
        assert_eq!(result.exit_code(), 3);
        assert_eq!(result.stderr(), Some("oops\n"));
        assert_eq!(result.stdout(), Some(""));
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_killed_child_records_signal() {
        let captured = CommandInvocation::new("sh", CommandKind::Custom)
            .execute_args_with_captured_output(["-c", "kill -9 $$"])
            .unwrap();
        let inherited = CommandInvocation::new("sh", CommandKind::Custom)
            .execute_args(["-c", "kill -9 $$"])
            .unwrap();

        for result in [&captured, &inherited] {
            assert_eq!(result.exit_code(), crate::result::NO_EXIT_CODE);
            assert_eq!(result.exit_code(), -1);
            assert_eq!(result.signal(), Some(9));
            assert!(!result.success());

            let violation = result.should().pass().unwrap_err();
            assert_eq!(violation.exit_code(), Some(-1));
            assert!(violation.to_string().contains("terminated by signal 9"));
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_inherited_output_is_not_captured() {
        let result = CommandInvocation::new("sh", CommandKind::Custom)
            .execute_args(["-c", "exit 0"])
            .unwrap();
        assert!(result.success());
        assert!(!result.is_captured());
    }

    #[cfg(unix)]
    #[test]
    fn test_child_sees_later_environment_value() {
        let result = CommandInvocation::new("sh", CommandKind::Custom)
            .with_environment_variable("FLOWCHECK_SAMPLE_VAR", "first")
            .with_environment_variable("FLOWCHECK_SAMPLE_VAR", "second")
            .execute_args_with_captured_output(["-c", "printf %s \"$FLOWCHECK_SAMPLE_VAR\""])
            .unwrap();
        assert_eq!(result.stdout(), Some("second"));
        assert!(std::env::var("FLOWCHECK_SAMPLE_VAR").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), b"here").unwrap();
        let result = CommandInvocation::new("cat", CommandKind::Custom)
            .with_working_directory(dir.path())
            .execute_with_captured_output("marker.txt")
            .unwrap();
        assert_eq!(result.stdout(), Some("here"));
        assert_eq!(result.command_line(), "cat marker.txt");
    }

    proptest! {
        #[test]
        fn prop_split_args_recovers_joined_tokens(
            tokens in proptest::collection::vec("[^\\s]{1,8}", 0..8),
        ) {
            let joined = tokens.join(" ");
            prop_assert_eq!(split_args(&joined), tokens);
        }
    }
}
