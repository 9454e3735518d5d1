//! Log output for the flowcheck binary.
//!
//! Events go to stderr, or to the file named by `FLOWCHECK_LOG`. `RUST_LOG`
//! overrides the filter entirely; otherwise everything is logged at `warn`
//! and `--verbose` raises only flowcheck's own crates to `debug`, so a
//! verbose run shows every launched command without dependency noise.
//! Scenario workers log inside a `scenario{name=..}` span.

use std::io::IsTerminal;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Environment variable naming a file that receives log output instead of stderr.
pub const LOG_FILE_ENV: &str = "FLOWCHECK_LOG";

/// Target prefix shared by every flowcheck crate (`flowcheck_core`, ...).
const CRATE_TARGET: &str = "flowcheck";

/// Filter directives used when `RUST_LOG` is unset.
pub fn default_directives(verbose: bool) -> String {
    if verbose {
        format!("warn,{}=debug", CRATE_TARGET)
    } else {
        "warn".to_string()
    }
}

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    File(PathBuf),
}

impl LogSink {
    pub fn from_env() -> Self {
        match std::env::var_os(LOG_FILE_ENV) {
            Some(path) if !path.is_empty() => LogSink::File(PathBuf::from(path)),
            _ => LogSink::Stderr,
        }
    }

    fn is_terminal(&self) -> bool {
        matches!(self, LogSink::Stderr) && std::io::stderr().is_terminal()
    }

    // A file that cannot be opened falls back to stderr rather than losing
    // the run's diagnostics.
    fn open(&self) -> (BoxMakeWriter, Option<WorkerGuard>) {
        let LogSink::File(path) = self else {
            return (BoxMakeWriter::new(std::io::stderr), None);
        };
        match std::fs::OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                let (writer, guard) = tracing_appender::non_blocking(file);
                (BoxMakeWriter::new(writer), Some(guard))
            }
            Err(err) => {
                eprintln!("Warning: cannot open log file {}: {}", path.display(), err);
                (BoxMakeWriter::new(std::io::stderr), None)
            }
        }
    }
}

/// Flushes buffered file output when dropped; hold it until exit.
#[derive(Debug)]
pub struct TelemetryGuard {
    _flush: Option<WorkerGuard>,
}

/// Installs the global subscriber. A second call leaves the first in place.
pub fn init_tracing(verbose: bool) -> TelemetryGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
    let sink = LogSink::from_env();
    let (writer, flush) = sink.open();

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_thread_names(true)
        .with_ansi(sink.is_terminal())
        .with_writer(writer)
        .try_init()
        .is_ok();

    TelemetryGuard {
        _flush: if installed { flush } else { None },
    }
}
