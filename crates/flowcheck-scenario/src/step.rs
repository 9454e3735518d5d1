use std::path::PathBuf;

use flowcheck_core::{CommandKind, Search, split_args};
use serde::Serialize;

const NO_RESTORE_FLAG: &str = "--no-restore";
const SKIP_INVALID_CONFIGURATIONS: &str = "/p:SkipInvalidConfigurations=true";

/// One stage of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    /// `new <args> [--no-restore]`
    Scaffold { args: String, skip_restore: bool },
    /// `restore <args> [/p:SkipInvalidConfigurations=true]`
    Restore {
        args: String,
        skip_invalid_configurations: bool,
    },
    Build { args: String },
    Clean { args: String },
    /// `run <args>`, optionally pointing the runtime-root variable at the
    /// tool's own directory.
    Run {
        args: String,
        expect_stdout: Option<String>,
        runtime_root: bool,
    },
    /// Generic invocation with no preconfigured sub-command (`-d portable`).
    Tool {
        args: String,
        expect_stdout: Option<String>,
    },
    /// Files matching `pattern` under `dir` (relative to the workspace)
    /// must be present, or absent when `present` is false.
    ExpectArtifacts {
        dir: PathBuf,
        pattern: String,
        search: Search,
        present: bool,
    },
}

impl Step {
    pub fn scaffold(args: &str, skip_restore: bool) -> Self {
        Step::Scaffold {
            args: args.to_string(),
            skip_restore,
        }
    }

    pub fn restore(args: &str, skip_invalid_configurations: bool) -> Self {
        Step::Restore {
            args: args.to_string(),
            skip_invalid_configurations,
        }
    }

    pub fn build(args: &str) -> Self {
        Step::Build {
            args: args.to_string(),
        }
    }

    pub fn clean(args: &str) -> Self {
        Step::Clean {
            args: args.to_string(),
        }
    }

    pub fn run(args: &str, expect_stdout: Option<&str>, runtime_root: bool) -> Self {
        Step::Run {
            args: args.to_string(),
            expect_stdout: expect_stdout.map(str::to_string),
            runtime_root,
        }
    }

    pub fn tool(args: &str, expect_stdout: Option<&str>) -> Self {
        Step::Tool {
            args: args.to_string(),
            expect_stdout: expect_stdout.map(str::to_string),
        }
    }

    pub fn expect_artifacts(dir: impl Into<PathBuf>, pattern: &str, search: Search) -> Self {
        Step::ExpectArtifacts {
            dir: dir.into(),
            pattern: pattern.to_string(),
            search,
            present: true,
        }
    }

    pub fn expect_no_artifacts(dir: impl Into<PathBuf>, pattern: &str, search: Search) -> Self {
        Step::ExpectArtifacts {
            dir: dir.into(),
            pattern: pattern.to_string(),
            search,
            present: false,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Step::Scaffold { .. } => "scaffold",
            Step::Restore { .. } => "restore",
            Step::Build { .. } => "build",
            Step::Clean { .. } => "clean",
            Step::Run { .. } => "run",
            Step::Tool { .. } => "tool",
            Step::ExpectArtifacts { .. } => "expect_artifacts",
        }
    }

    /// Command family launched by this step; `None` for filesystem checks.
    pub fn command_kind(&self) -> Option<CommandKind> {
        match self {
            Step::Scaffold { .. } => Some(CommandKind::New),
            Step::Restore { .. } => Some(CommandKind::Restore),
            Step::Build { .. } => Some(CommandKind::Build),
            Step::Clean { .. } => Some(CommandKind::Clean),
            Step::Run { .. } => Some(CommandKind::Run),
            Step::Tool { .. } => Some(CommandKind::Custom),
            Step::ExpectArtifacts { .. } => None,
        }
    }

    /// Caller tokens handed to the invocation, after the sub-command.
    pub fn arguments(&self) -> Vec<String> {
        match self {
            Step::Scaffold { args, skip_restore } => {
                with_flag(split_args(args), *skip_restore, NO_RESTORE_FLAG)
            }
            Step::Restore {
                args,
                skip_invalid_configurations,
            } => with_flag(
                split_args(args),
                *skip_invalid_configurations,
                SKIP_INVALID_CONFIGURATIONS,
            ),
            Step::Build { args }
            | Step::Clean { args }
            | Step::Run { args, .. }
            | Step::Tool { args, .. } => split_args(args),
            Step::ExpectArtifacts { .. } => Vec::new(),
        }
    }

    pub fn expected_stdout(&self) -> Option<&str> {
        match self {
            Step::Run { expect_stdout, .. } | Step::Tool { expect_stdout, .. } => {
                expect_stdout.as_deref()
            }
            _ => None,
        }
    }

    pub fn sets_runtime_root(&self) -> bool {
        matches!(self, Step::Run { runtime_root: true, .. })
    }

    /// Run and tool steps always capture; their output is what they check.
    pub fn requires_capture(&self) -> bool {
        matches!(self, Step::Run { .. } | Step::Tool { .. })
    }

    pub fn description(&self) -> String {
        match self {
            Step::ExpectArtifacts {
                dir,
                pattern,
                present,
                ..
            } => {
                let verb = if *present { "expect" } else { "expect no" };
                format!("{} {} in {}", verb, pattern, dir.display())
            }
            _ => {
                let kind = self.command_kind().and_then(|k| k.subcommand());
                kind.into_iter()
                    .map(str::to_string)
                    .chain(self.arguments())
                    .collect::<Vec<_>>()
                    .join(" ")
            }
        }
    }
}

fn with_flag(mut tokens: Vec<String>, enabled: bool, flag: &str) -> Vec<String> {
    if enabled && !tokens.iter().any(|t| t == flag) {
        tokens.push(flag.to_string());
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaffold_appends_no_restore_once() {
        assert_eq!(
            Step::scaffold("console", true).arguments(),
            vec!["console", "--no-restore"]
        );
        assert_eq!(
            Step::scaffold("console --no-restore", true).arguments(),
            vec!["console", "--no-restore"]
        );
        assert_eq!(Step::scaffold("console", false).arguments(), vec!["console"]);
    }

    #[test]
    fn test_restore_skip_invalid_configurations() {
        assert_eq!(
            Step::restore("", true).arguments(),
            vec!["/p:SkipInvalidConfigurations=true"]
        );
        assert!(Step::restore("", false).arguments().is_empty());
    }

    #[test]
    fn test_tool_step_is_custom_invocation() {
        let step = Step::tool("-d portable", Some("Hello Portable World!"));
        assert_eq!(step.command_kind(), Some(CommandKind::Custom));
        assert_eq!(step.arguments(), vec!["-d", "portable"]);
        assert_eq!(step.expected_stdout(), Some("Hello Portable World!"));
        assert!(step.requires_capture());
        assert_eq!(step.description(), "-d portable");
    }

    #[test]
    fn test_run_step_runtime_root() {
        assert!(Step::run("", None, true).sets_runtime_root());
        assert!(!Step::run("", None, false).sets_runtime_root());
        assert!(!Step::build("").sets_runtime_root());
        assert!(!Step::build("").requires_capture());
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(Step::build("-c Debug").description(), "build -c Debug");
        assert_eq!(
            Step::expect_no_artifacts("bin", "*.dll", Search::AllDirectories).description(),
            "expect no *.dll in bin"
        );
        assert_eq!(
            Step::expect_artifacts("bin", "*.dll", Search::AllDirectories).command_kind(),
            None
        );
    }

    #[test]
    fn test_serializes_with_step_tag() {
        let json = serde_json::to_value(Step::restore("", true)).unwrap();
        assert_eq!(json["step"], "restore");
        assert_eq!(json["skip_invalid_configurations"], true);

        let step = Step::expect_artifacts("bin", "*.dll", Search::AllDirectories);
        let json = serde_json::to_value(step).unwrap();
        assert_eq!(json["search"], "all_directories");
    }
}
