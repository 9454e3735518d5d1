//! Runs one scenario inside a fresh workspace.

use std::time::Instant;

use chrono::Utc;
use flowcheck_core::{
    AssertResult, ExecutionResult, HarnessConfig, HarnessError, ToolUnderTest, Workspace,
    runtime_root_variable,
};

use crate::error::ScenarioError;
use crate::report::{ScenarioReport, StepReport};
use crate::scenario::Scenario;
use crate::step::Step;

/// What happens to the output of steps that do not need it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputPolicy {
    /// Stream it to the console as the tool writes it.
    #[default]
    PassThrough,
    /// Capture everything, keeping the console free for structured output.
    CaptureAll,
}

#[derive(Debug, Clone, Copy)]
pub struct ScenarioDriver<'a> {
    tool: &'a ToolUnderTest,
    config: &'a HarnessConfig,
    output: OutputPolicy,
}

impl<'a> ScenarioDriver<'a> {
    pub fn new(tool: &'a ToolUnderTest, config: &'a HarnessConfig) -> Self {
        Self {
            tool,
            config,
            output: OutputPolicy::default(),
        }
    }

    pub fn with_output_policy(mut self, output: OutputPolicy) -> Self {
        self.output = output;
        self
    }

    pub fn tool(&self) -> &ToolUnderTest {
        self.tool
    }

    pub fn config(&self) -> &HarnessConfig {
        self.config
    }

    /// Runs every step in order, stopping at the first that fails.
    ///
    /// A failed assertion is reported in the returned report; an error means
    /// the harness could not carry the scenario out at all.
    pub fn run(&self, scenario: &Scenario) -> Result<ScenarioReport, ScenarioError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let aborted = ScenarioError::aborted(scenario.name());

        let mut workspace = Workspace::create_in(&self.config.workspace_root).map_err(aborted)?;
        workspace.set_retain(self.config.keep_workspaces);
        tracing::info!(
            scenario = scenario.name(),
            workspace = %workspace.path().display(),
            "scenario started"
        );

        if let Some(template) = scenario.template() {
            workspace
                .seed_from(self.config.assets_root.join(template))
                .map_err(ScenarioError::aborted(scenario.name()))?;
        }

        let mut steps = Vec::with_capacity(scenario.steps().len());
        for (index, step) in scenario.steps().iter().enumerate() {
            let report = self
                .run_step(&workspace, index, step)
                .map_err(ScenarioError::aborted(scenario.name()))?;
            let passed = report.passed;
            tracing::debug!(
                scenario = scenario.name(),
                step = %report.description,
                passed,
                duration_ms = report.duration_ms,
                "step finished"
            );
            steps.push(report);
            if !passed {
                break;
            }
        }

        let mut report =
            ScenarioReport::completed(scenario.name(), started_at, clock.elapsed(), steps);
        if workspace.is_retained() {
            report.workspace = Some(workspace.path().to_path_buf());
        }
        tracing::info!(
            scenario = scenario.name(),
            status = %report.status,
            duration_ms = report.duration_ms,
            "scenario finished"
        );
        Ok(report)
    }

    fn run_step(
        &self,
        workspace: &Workspace,
        index: usize,
        step: &Step,
    ) -> Result<StepReport, HarnessError> {
        let started = Instant::now();

        if let Step::ExpectArtifacts {
            dir,
            pattern,
            search,
            present,
        } = step
        {
            let check = workspace.dir(dir);
            let verdict = if *present {
                check.have_files_matching(pattern, *search)
            } else {
                check.not_have_files_matching(pattern, *search)
            };
            return Ok(StepReport::new(index, step, started.elapsed()).with_verdict(verdict));
        }

        let Some(kind) = step.command_kind() else {
            return Ok(StepReport::new(index, step, started.elapsed()));
        };

        let mut invocation = workspace.invoke(self.tool, kind);
        if step.sets_runtime_root() {
            if let Some(root) = self.tool.runtime_root() {
                invocation = invocation
                    .with_environment_variable(runtime_root_variable(), root.display().to_string());
            }
        }

        let result = if step.requires_capture() || self.output == OutputPolicy::CaptureAll {
            invocation.execute_args_with_captured_output(step.arguments())?
        } else {
            invocation.execute_args(step.arguments())?
        };

        Ok(StepReport::new(index, step, started.elapsed())
            .with_result(&result)
            .with_verdict(check_result(&result, step.expected_stdout())))
    }
}

fn check_result(result: &ExecutionResult, expect_stdout: Option<&str>) -> AssertResult<()> {
    let passed = result.should().pass()?;
    if let Some(expected) = expect_stdout {
        passed.and().have_stdout_containing(expected)?;
    }
    Ok(())
}
