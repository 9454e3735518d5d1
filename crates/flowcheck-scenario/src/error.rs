use flowcheck_common::error_codes::{self, ErrorCategory};
use flowcheck_core::HarnessError;
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Unknown scenario '{name}'")]
    UnknownScenario { name: String, available: Vec<String> },

    #[error("Scenario '{scenario}' aborted: {source}")]
    Aborted {
        scenario: String,
        #[source]
        source: HarnessError,
    },

    #[error("Worker running scenario '{scenario}' panicked")]
    WorkerPanicked { scenario: String },
}

impl ScenarioError {
    /// Wraps a harness error raised while running `scenario`; for `map_err`.
    pub fn aborted(scenario: &str) -> impl FnOnce(HarnessError) -> Self + '_ {
        move |source| ScenarioError::Aborted {
            scenario: scenario.to_string(),
            source,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ScenarioError::UnknownScenario { .. } => error_codes::SCENARIO_NOT_FOUND,
            ScenarioError::Aborted { source, .. } => source.code(),
            ScenarioError::WorkerPanicked { .. } => error_codes::GENERIC_ERROR,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        error_codes::category_for_code(self.code())
    }

    pub fn context(&self) -> Value {
        match self {
            ScenarioError::UnknownScenario { name, available } => json!({
                "scenario": name,
                "available": available
            }),
            ScenarioError::Aborted { scenario, source } => json!({
                "scenario": scenario,
                "cause": source.context()
            }),
            ScenarioError::WorkerPanicked { scenario } => json!({ "scenario": scenario }),
        }
    }

    pub fn suggestion(&self) -> String {
        match self {
            ScenarioError::UnknownScenario { available, .. } => {
                format!(
                    "Available scenarios: {}. Run 'flowcheck list' to see them all.",
                    available.join(", ")
                )
            }
            ScenarioError::Aborted { source, .. } => source.suggestion(),
            ScenarioError::WorkerPanicked { .. } => {
                "This is a bug in flowcheck. Rerun with --jobs 1 and -v to narrow it down."
                    .to_string()
            }
        }
    }

    pub fn is_retryable(&self) -> bool {
        false
    }

    pub fn exit_code(&self) -> i32 {
        self.category().exit_code()
    }

    pub fn summary(&self) -> ErrorSummary {
        ErrorSummary {
            code: self.code(),
            category: self.category().as_str().to_string(),
            message: self.to_string(),
            suggestion: self.suggestion(),
            exit_code: self.exit_code(),
        }
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

/// Serialisable snapshot of an error that stopped a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorSummary {
    pub code: i32,
    pub category: String,
    pub message: String,
    pub suggestion: String,
    pub exit_code: i32,
}
