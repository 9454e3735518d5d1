use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
pub use clap_complete::Shell;

const LONG_ABOUT: &str = r#"flowcheck runs end-to-end workflow scenarios against a build tool CLI.

Each scenario gets a fresh workspace directory, drives the tool through a
sequence of sub-commands (new, restore, build, run, clean, -d <tool>) and
checks exit codes, captured output and the files left behind. Workspaces are
removed afterwards unless --keep-workspaces is given.

CONFIGURATION:
    FLOWCHECK_TOOL              Tool under test (default: dotnet on PATH)
    FLOWCHECK_ASSETS            Directory holding project templates (default: ./assets)
    FLOWCHECK_WORKSPACE_ROOT    Where workspaces are created (default: system temp dir)
    FLOWCHECK_KEEP_WORKSPACES   Keep workspaces after the run (1/true)
    FLOWCHECK_MAX_PARALLELISM   Scenarios run at once (default: 1)
    FLOWCHECK_LOG               Write logs to this file instead of stderr
    RUST_LOG                    Log filter (default: warn; -v adds flowcheck=debug)

EXAMPLES:
    flowcheck list
    flowcheck run
    flowcheck run new-restore-build-run-clean --tool ~/.dotnet/dotnet
    flowcheck run --include-disabled --jobs 4 --json"#;

#[derive(Parser)]
#[command(name = "flowcheck")]
#[command(author, version)]
#[command(about = "Run end-to-end workflow scenarios against a build tool CLI")]
#[command(long_about = LONG_ABOUT)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    ///
    /// Any non-empty NO_COLOR value other than 0/false/no/off disables color.
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Enable verbose output (debug logging of every launched command)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Returns the effective output format, considering --json shorthand.
    pub fn effective_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the built-in scenarios
    List,

    /// Run scenarios against the tool under test
    #[command(long_about = r#"Run scenarios against the tool under test.

With no names, every built-in scenario runs. Disabled scenarios are reported
as skipped unless --include-disabled is given.

Exit status is 0 when every executed scenario passed, 1 when any failed an
assertion, and a sysexits code when the harness itself could not run one
(69 tool or template not found, 73 workspace not creatable, 74 launch error).

EXAMPLES:
    flowcheck run
    flowcheck run run-tools-in-project --assets ./assets
    flowcheck run --tool /usr/share/dotnet/dotnet --keep-workspaces"#)]
    Run(RunArgs),

    /// Generate shell completion scripts
    #[command(long_about = r#"Generate shell completion scripts.

EXAMPLES:
    flowcheck completions bash > ~/.local/share/bash-completion/completions/flowcheck
    flowcheck completions zsh > /usr/local/share/zsh/site-functions/_flowcheck"#)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Scenarios to run (default: all)
    pub names: Vec<String>,

    /// Tool under test, as a name on PATH or a path
    #[arg(long, env = "FLOWCHECK_TOOL")]
    pub tool: Option<String>,

    /// Directory holding project templates
    #[arg(long, env = "FLOWCHECK_ASSETS")]
    pub assets: Option<PathBuf>,

    /// Maximum number of scenarios running at once
    #[arg(
        short,
        long,
        env = "FLOWCHECK_MAX_PARALLELISM",
        value_parser = clap::value_parser!(u16).range(1..)
    )]
    pub jobs: Option<u16>,

    /// Also run scenarios disabled for known defects
    #[arg(long)]
    pub include_disabled: bool,

    /// Leave workspaces on disk for inspection
    #[arg(long)]
    pub keep_workspaces: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
