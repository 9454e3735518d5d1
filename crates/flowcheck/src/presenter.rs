use serde_json::Value;
use serde_json::json;

use flowcheck_common::Colors;
use flowcheck_scenario::{Scenario, ScenarioReport, ScenarioStatus, SuiteReport};

use crate::commands::OutputFormat;

/// Trait for presenting output to the user.
///
/// Handlers describe what happened; the presenter decides whether that
/// becomes coloured text or a JSON document on stdout.
pub trait Presenter {
    /// Present the scenario catalog.
    fn present_scenarios(&self, scenarios: &[Scenario]);

    /// Present the outcome of a suite run.
    fn present_suite(&self, report: &SuiteReport);

    /// Present a dim/info message. JSON output omits it.
    fn present_info(&self, message: &str);

    /// Present a structured error.
    fn present_error(&self, error: &Value);
}

/// Text presenter for human-readable output.
pub struct TextPresenter;

impl TextPresenter {
    fn present_scenario_report(&self, report: &ScenarioReport) {
        match report.status {
            ScenarioStatus::Passed => {
                println!(
                    "{} {} {}",
                    Colors::success("✓"),
                    Colors::scenario(&report.name),
                    Colors::dim(&format!("({} ms)", report.duration_ms))
                );
            }
            ScenarioStatus::Failed => {
                println!(
                    "{} {} {}",
                    Colors::error("✗"),
                    Colors::scenario(&report.name),
                    Colors::dim(&format!("({} ms)", report.duration_ms))
                );
                if let Some(step) = report.failed_step() {
                    println!("  step {}: {}", step.index + 1, step.description);
                    if let Some(failure) = &step.failure {
                        for line in failure.lines() {
                            println!("    {}", line);
                        }
                    }
                }
            }
            ScenarioStatus::Errored => {
                println!("{} {}", Colors::error("!"), Colors::scenario(&report.name));
                if let Some(error) = &report.error {
                    println!("  {} {}", Colors::error("Error:"), error.message);
                    println!("  {} {}", Colors::dim("Suggestion:"), error.suggestion);
                }
            }
            ScenarioStatus::Skipped => {
                println!(
                    "{} {} {}",
                    Colors::warning("-"),
                    Colors::scenario(&report.name),
                    Colors::dim(&format!(
                        "skipped: {}",
                        report.skip_reason.as_deref().unwrap_or("disabled")
                    ))
                );
            }
        }
        if let Some(workspace) = &report.workspace {
            println!("  {} {}", Colors::dim("workspace kept at"), workspace.display());
        }
    }
}

impl Presenter for TextPresenter {
    fn present_scenarios(&self, scenarios: &[Scenario]) {
        println!("{}", Colors::bold("Scenarios:"));
        for scenario in scenarios {
            println!("  {}", Colors::scenario(scenario.name()));
            if !scenario.description().is_empty() {
                println!("    {}", scenario.description());
            }
            if let Some(template) = scenario.template() {
                println!("    {} {}", Colors::dim("template:"), template);
            }
            if let Some(reason) = scenario.disabled_reason() {
                println!("    {} {}", Colors::warning("disabled:"), reason);
            }
        }
    }

    fn present_suite(&self, report: &SuiteReport) {
        for scenario in &report.scenarios {
            self.present_scenario_report(scenario);
        }
        println!();

        let summary = format!(
            "{} passed, {} failed, {} errored, {} skipped in {} ms",
            report.passed, report.failed, report.errored, report.skipped, report.duration_ms
        );
        if report.all_passed() {
            println!("{}", Colors::success(&summary));
        } else {
            println!("{}", Colors::error(&summary));
        }
    }

    fn present_info(&self, message: &str) {
        println!("{}", Colors::dim(message));
    }

    fn present_error(&self, error: &Value) {
        let message = error["message"].as_str().unwrap_or("unknown error");
        eprintln!("{} {}", Colors::error("Error:"), message);
        if let Some(suggestion) = error["suggestion"].as_str() {
            eprintln!("{} {}", Colors::dim("Suggestion:"), suggestion);
        }
    }
}

/// JSON presenter for machine-readable output.
pub struct JsonPresenter;

impl JsonPresenter {
    fn print(value: &Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

impl Presenter for JsonPresenter {
    fn present_scenarios(&self, scenarios: &[Scenario]) {
        Self::print(&json!({ "scenarios": scenarios }));
    }

    fn present_suite(&self, report: &SuiteReport) {
        Self::print(&serde_json::to_value(report).unwrap_or_default());
    }

    fn present_info(&self, _message: &str) {}

    fn present_error(&self, error: &Value) {
        Self::print(&json!({ "error": error }));
    }
}

pub fn create_presenter(format: &OutputFormat) -> Box<dyn Presenter> {
    match format {
        OutputFormat::Json => Box::new(JsonPresenter),
        OutputFormat::Text => Box::new(TextPresenter),
    }
}
