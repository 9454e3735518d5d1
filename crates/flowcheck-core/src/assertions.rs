//! Chainable assertions over execution results and directories.
//!
//! Every assertion returns `Result<Self, AssertionViolation>`, so a chain
//! written with `?` stops at the first unmet expectation and reports that
//! one:
//!
//! ```ignore
//! result.should().pass()?.and().have_stdout_containing("Hello World!")?;
//! ```

use std::path::Path;
use std::path::PathBuf;

use predicates::Predicate;
use predicates::boolean::PredicateBooleanExt;

use crate::error::AssertionViolation;
use crate::pattern::FilePattern;
use crate::pattern::Search;
use crate::result::ExecutionResult;

pub type AssertResult<T> = Result<T, AssertionViolation>;

/// Maximum number of paths listed in a directory assertion diagnostic.
const MAX_LISTED_PATHS: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct ResultAssert<'a> {
    result: &'a ExecutionResult,
}

impl<'a> ResultAssert<'a> {
    pub fn new(result: &'a ExecutionResult) -> Self {
        Self { result }
    }

    /// Reads naturally between chained assertions.
    pub fn and(self) -> Self {
        self
    }

    pub fn pass(self) -> AssertResult<Self> {
        if self.result.success() {
            return Ok(self);
        }
        Err(AssertionViolation::new("Expected command to pass, but it failed")
            .expected("exit code 0")
            .actual(describe_exit(self.result))
            .with_result(self.result))
    }

    pub fn fail(self) -> AssertResult<Self> {
        if !self.result.success() {
            return Ok(self);
        }
        Err(AssertionViolation::new("Expected command to fail, but it passed")
            .expected("non-zero exit code")
            .actual("exit code 0")
            .with_result(self.result))
    }

    pub fn have_exit_code(self, expected: i32) -> AssertResult<Self> {
        if self.result.exit_code() == expected {
            return Ok(self);
        }
        Err(AssertionViolation::new("Unexpected exit code")
            .expected(format!("exit code {}", expected))
            .actual(describe_exit(self.result))
            .with_result(self.result))
    }

    /// Literal, case-sensitive containment.
    pub fn have_stdout_containing(self, expected: &str) -> AssertResult<Self> {
        let predicate = predicates::str::contains(expected);
        self.check_stream(Stream::Stdout, &predicate, format!("stdout containing {:?}", expected))
    }

    pub fn not_have_stdout_containing(self, unexpected: &str) -> AssertResult<Self> {
        let predicate = predicates::str::contains(unexpected).not();
        self.check_stream(
            Stream::Stdout,
            &predicate,
            format!("stdout not containing {:?}", unexpected),
        )
    }

    pub fn have_stderr_containing(self, expected: &str) -> AssertResult<Self> {
        let predicate = predicates::str::contains(expected);
        self.check_stream(Stream::Stderr, &predicate, format!("stderr containing {:?}", expected))
    }

    /// Checks captured stdout against any `predicates` predicate.
    pub fn have_stdout_matching<P>(self, predicate: P) -> AssertResult<Self>
    where
        P: Predicate<str>,
    {
        let description = format!("stdout matching {}", predicate);
        self.check_stream(Stream::Stdout, &predicate, description)
    }

    fn check_stream<P>(self, stream: Stream, predicate: &P, expected: String) -> AssertResult<Self>
    where
        P: Predicate<str> + ?Sized,
    {
        let text = match stream {
            Stream::Stdout => self.result.stdout(),
            Stream::Stderr => self.result.stderr(),
        };

        let Some(text) = text else {
            return Err(AssertionViolation::new(format!(
                "Cannot inspect {}: output was not captured",
                stream.name()
            ))
            .expected(expected)
            .actual("output passed through to the console")
            .with_result(self.result));
        };

        if predicate.eval(text) {
            return Ok(self);
        }

        Err(
            AssertionViolation::new(format!("Unexpected {} content", stream.name()))
                .expected(expected)
                .actual(format!("{} of {} bytes", stream.name(), text.len()))
                .with_result(self.result),
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    fn name(&self) -> &'static str {
        match self {
            Stream::Stdout => "stdout",
            Stream::Stderr => "stderr",
        }
    }
}

fn describe_exit(result: &ExecutionResult) -> String {
    match result.signal() {
        Some(signal) => format!(
            "exit code {} (terminated by signal {})",
            result.exit_code(),
            signal
        ),
        None => format!("exit code {}", result.exit_code()),
    }
}

/// Assertions over the files inside a directory.
#[derive(Debug, Clone)]
pub struct DirectoryAssert {
    path: PathBuf,
}

/// Starts an assertion chain over `path`.
pub fn directory(path: impl Into<PathBuf>) -> DirectoryAssert {
    DirectoryAssert { path: path.into() }
}

impl DirectoryAssert {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn and(self) -> Self {
        self
    }

    pub fn exist(self) -> AssertResult<Self> {
        if self.path.is_dir() {
            return Ok(self);
        }
        Err(AssertionViolation::new("Expected directory to exist")
            .expected(self.path.display().to_string())
            .actual("no such directory"))
    }

    /// At least one file whose name matches `pattern`.
    pub fn have_files_matching(self, pattern: &str, search: Search) -> AssertResult<Self> {
        let pattern = compile(pattern)?;
        let found = pattern.find_files(&self.path, search);
        if !found.is_empty() {
            return Ok(self);
        }

        let actual = if self.path.is_dir() {
            let visible = FilePattern::new("*")
                .map(|all| all.find_files(&self.path, search))
                .unwrap_or_default();
            format!("no matching files; present: {}", list_paths(&self.path, &visible))
        } else {
            "directory does not exist".to_string()
        };

        Err(AssertionViolation::new(format!(
            "Expected {} to contain files matching '{}' ({})",
            self.path.display(),
            pattern,
            describe_search(search)
        ))
        .expected(format!("at least one file matching '{}'", pattern))
        .actual(actual))
    }

    /// No file whose name matches `pattern`. A missing directory passes;
    /// an unreadable subtree does not, since it may hide a match.
    pub fn not_have_files_matching(self, pattern: &str, search: Search) -> AssertResult<Self> {
        let pattern = compile(pattern)?;
        let scan = pattern.scan(&self.path, search);
        if scan.matches.is_empty() && scan.unreadable.is_empty() {
            return Ok(self);
        }

        let actual = if scan.matches.is_empty() {
            format!("could not read: {}", list_paths(&self.path, &scan.unreadable))
        } else {
            format!(
                "{} matching file(s): {}",
                scan.matches.len(),
                list_paths(&self.path, &scan.matches)
            )
        };

        Err(AssertionViolation::new(format!(
            "Expected {} to contain no files matching '{}' ({})",
            self.path.display(),
            pattern,
            describe_search(search)
        ))
        .expected(format!("no files matching '{}'", pattern))
        .actual(actual))
    }
}

fn compile(pattern: &str) -> AssertResult<FilePattern> {
    FilePattern::new(pattern).map_err(|err| {
        AssertionViolation::new(format!("Invalid file pattern '{}'", pattern))
            .actual(err.to_string())
    })
}

fn describe_search(search: Search) -> &'static str {
    match search {
        Search::TopDirectoryOnly => "top directory only",
        Search::AllDirectories => "all directories",
    }
}

fn list_paths(root: &Path, paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "(empty)".to_string();
    }
    let mut listed: Vec<String> = paths
        .iter()
        .take(MAX_LISTED_PATHS)
        .map(|p| p.strip_prefix(root).unwrap_or(p).display().to_string())
        .collect();
    if paths.len() > MAX_LISTED_PATHS {
        listed.push(format!("... {} more", paths.len() - MAX_LISTED_PATHS));
    }
    listed.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use predicates::prelude::*;
    use predicates::reflection::PredicateReflection;
    use std::cell::Cell;
    use std::fmt;
    use std::fs;

    struct Counting<'a>(&'a Cell<usize>);

    impl fmt::Display for Counting<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("counting")
        }
    }

    impl PredicateReflection for Counting<'_> {}

    impl Predicate<str> for Counting<'_> {
        fn eval(&self, _variable: &str) -> bool {
            self.0.set(self.0.get() + 1);
            true
        }
    }

    fn captured(code: i32, stdout: &str) -> ExecutionResult {
        ExecutionResult::new("tool run", code, Some(stdout.to_string()), Some(String::new()))
    }

    #[test]
    fn test_pass_on_zero_exit() {
        let result = captured(0, "");
        assert!(result.should().pass().is_ok());
        assert!(result.should().fail().is_err());
    }

    #[test]
    fn test_pass_failure_carries_output() {
        let result = ExecutionResult::new(
            "tool build",
            1,
            Some("Build FAILED.".into()),
            Some("error CS1002".into()),
        );
        let violation = result.should().pass().unwrap_err();
        assert_eq!(violation.exit_code(), Some(1));
        assert_eq!(violation.command_line(), Some("tool build"));
        assert_eq!(violation.stdout(), Some("Build FAILED."));
        assert_eq!(violation.stderr(), Some("error CS1002"));
        let text = violation.to_string();
        assert!(text.contains("Build FAILED."));
        assert!(text.contains("error CS1002"));
    }

    #[test]
    fn test_fail_on_nonzero_exit() {
        assert!(captured(2, "").should().fail().is_ok());
    }

    #[test]
    fn test_have_exit_code() {
        let result = captured(3, "");
        assert!(result.should().have_exit_code(3).is_ok());
        let violation = result.should().have_exit_code(0).unwrap_err();
        assert_eq!(violation.expected_value(), Some("exit code 0"));
        assert_eq!(violation.actual_value(), Some("exit code 3"));
    }

    #[test]
    fn test_stdout_containing_is_literal_and_case_sensitive() {
        let result = captured(0, "Hello World!\n");
        assert!(result.should().have_stdout_containing("Hello World!").is_ok());
        assert!(result.should().have_stdout_containing("hello world!").is_err());
        assert!(result.should().have_stdout_containing("Hello.*").is_err());
    }

    #[test]
    fn test_not_have_stdout_containing() {
        let result = captured(0, "Hello World!\n");
        assert!(result.should().not_have_stdout_containing("error").is_ok());
        assert!(result.should().not_have_stdout_containing("World").is_err());
    }

    #[test]
    fn test_stdout_assertion_on_uncaptured_result() {
        let result = ExecutionResult::new("tool run", 0, None, None);
        let violation = result.should().have_stdout_containing("x").unwrap_err();
        assert!(violation.message().contains("not captured"));
    }

    #[test]
    fn test_stderr_containing() {
        let result = ExecutionResult::new(
            "tool",
            1,
            Some(String::new()),
            Some("fatal: nope".into()),
        );
        assert!(result.should().have_stderr_containing("fatal").is_ok());
    }

    #[test]
    fn test_stdout_matching_predicate() {
        let result = captured(0, "Restored 3 packages\n");
        let pred = predicate::str::is_match(r"Restored \d+ packages").unwrap();
        assert!(result.should().have_stdout_matching(pred).is_ok());
    }

    #[test]
    fn test_chain_passes_through() {
        let result = captured(0, "Hello World!\n");
        let chained = result
            .should()
            .pass()
            .and_then(|a| a.and().have_stdout_containing("Hello"))
            .and_then(|a| a.and().have_stdout_containing("World"));
        assert!(chained.is_ok());
    }

    #[test]
    fn test_chain_short_circuits_on_first_failure() {
        let evaluated = Cell::new(0);
        let result = captured(1, "Hello World!\n");

        let outcome = result
            .should()
            .pass()
            .and_then(|a| a.and().have_stdout_matching(Counting(&evaluated)));

        let violation = outcome.unwrap_err();
        assert_eq!(evaluated.get(), 0);
        assert_eq!(violation.expected_value(), Some("exit code 0"));
    }

    #[test]
    fn test_question_mark_chain_reports_first_violation() {
        fn check(result: &ExecutionResult) -> AssertResult<()> {
            result
                .should()
                .have_stdout_containing("missing")?
                .and()
                .fail()?;
            Ok(())
        }

        let violation = check(&captured(0, "present")).unwrap_err();
        assert!(violation.expected_value().unwrap().contains("missing"));
    }

    #[test]
    fn test_have_files_matching_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        fs::create_dir_all(bin.join("Debug/net8.0")).unwrap();
        fs::write(bin.join("Debug/net8.0/app.dll"), b"").unwrap();

        assert!(
            directory(&bin)
                .have_files_matching("*.dll", Search::AllDirectories)
                .is_ok()
        );
        assert!(
            directory(&bin)
                .have_files_matching("*.dll", Search::TopDirectoryOnly)
                .is_err()
        );
        assert!(
            directory(&bin)
                .not_have_files_matching("*.dll", Search::TopDirectoryOnly)
                .is_ok()
        );
    }

    #[test]
    fn test_not_have_files_matching_lists_offenders() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("left.dll"), b"").unwrap();

        let violation = directory(dir.path())
            .not_have_files_matching("*.dll", Search::AllDirectories)
            .unwrap_err();
        assert!(violation.actual_value().unwrap().contains("left.dll"));
    }

    #[cfg(unix)]
    #[test]
    fn test_not_have_files_matching_rejects_unreadable_subtree() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("Debug");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("app.dll"), b"").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        let outcome = directory(dir.path())
            .not_have_files_matching("*.dll", Search::AllDirectories);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o700)).unwrap();

        // Privileged users see the file itself; either way the check fails.
        let violation = outcome.unwrap_err();
        let actual = violation.actual_value().unwrap();
        assert!(actual.contains("could not read: Debug") || actual.contains("app.dll"));
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");

        let violation = directory(&bin)
            .have_files_matching("*.dll", Search::AllDirectories)
            .unwrap_err();
        assert_eq!(violation.actual_value(), Some("directory does not exist"));
        assert!(
            directory(&bin)
                .not_have_files_matching("*.dll", Search::AllDirectories)
                .is_ok()
        );
        assert!(directory(&bin).exist().is_err());
    }
}
