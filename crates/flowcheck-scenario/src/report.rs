//! Serialisable outcomes of scenario and suite runs.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use flowcheck_core::ExecutionResult;
use serde::Serialize;

use crate::error::{ErrorSummary, ScenarioError};
use crate::step::Step;

/// Exit code for a suite in which a scenario failed an assertion.
pub const FAILED_EXIT_CODE: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Passed,
    /// A step's assertion was not met.
    Failed,
    /// The harness itself could not run the scenario.
    Errored,
    /// Disabled and not requested.
    Skipped,
}

impl ScenarioStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioStatus::Passed => "passed",
            ScenarioStatus::Failed => "failed",
            ScenarioStatus::Errored => "errored",
            ScenarioStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub step: &'static str,
    pub description: String,
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl StepReport {
    pub(crate) fn new(index: usize, step: &Step, duration: Duration) -> Self {
        Self {
            index,
            step: step.name(),
            description: step.description(),
            passed: true,
            command_line: None,
            exit_code: None,
            duration_ms: duration.as_millis() as u64,
            failure: None,
        }
    }

    pub(crate) fn with_result(mut self, result: &ExecutionResult) -> Self {
        self.command_line = Some(result.command_line().to_string());
        self.exit_code = Some(result.exit_code());
        self
    }

    pub(crate) fn with_verdict<T, E: std::fmt::Display>(mut self, verdict: Result<T, E>) -> Self {
        if let Err(violation) = verdict {
            self.passed = false;
            self.failure = Some(violation.to_string());
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub status: ScenarioStatus,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub steps: Vec<StepReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorSummary>,
    /// Set when the workspace was kept for inspection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>,
}

impl ScenarioReport {
    pub(crate) fn completed(
        name: &str,
        started_at: DateTime<Utc>,
        duration: Duration,
        steps: Vec<StepReport>,
    ) -> Self {
        let status = if steps.iter().all(|s| s.passed) {
            ScenarioStatus::Passed
        } else {
            ScenarioStatus::Failed
        };
        Self {
            name: name.to_string(),
            status,
            started_at,
            duration_ms: duration.as_millis() as u64,
            steps,
            skip_reason: None,
            error: None,
            workspace: None,
        }
    }

    pub fn skipped(name: &str, reason: &str) -> Self {
        Self {
            name: name.to_string(),
            status: ScenarioStatus::Skipped,
            started_at: Utc::now(),
            duration_ms: 0,
            steps: Vec::new(),
            skip_reason: Some(reason.to_string()),
            error: None,
            workspace: None,
        }
    }

    pub fn errored(
        name: &str,
        error: &ScenarioError,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> Self {
        Self {
            name: name.to_string(),
            status: ScenarioStatus::Errored,
            started_at,
            duration_ms: duration.as_millis() as u64,
            steps: Vec::new(),
            skip_reason: None,
            error: Some(error.summary()),
            workspace: None,
        }
    }

    /// The step that stopped the scenario, if one failed.
    pub fn failed_step(&self) -> Option<&StepReport> {
        self.steps.iter().find(|s| !s.passed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub passed: usize,
    pub failed: usize,
    pub errored: usize,
    pub skipped: usize,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn new(
        started_at: DateTime<Utc>,
        duration: Duration,
        scenarios: Vec<ScenarioReport>,
    ) -> Self {
        let count = |status| scenarios.iter().filter(|s| s.status == status).count();
        Self {
            started_at,
            duration_ms: duration.as_millis() as u64,
            passed: count(ScenarioStatus::Passed),
            failed: count(ScenarioStatus::Failed),
            errored: count(ScenarioStatus::Errored),
            skipped: count(ScenarioStatus::Skipped),
            scenarios,
        }
    }

    /// True when nothing failed or errored; skipped scenarios do not count.
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errored == 0
    }

    /// Process exit code: the first harness error's sysexits code, else 1
    /// for any assertion failure, else 0.
    pub fn exit_code(&self) -> i32 {
        if let Some(code) = self
            .scenarios
            .iter()
            .find_map(|s| s.error.as_ref().map(|e| e.exit_code))
        {
            return code;
        }
        if self.failed > 0 {
            return FAILED_EXIT_CODE;
        }
        0
    }
}
