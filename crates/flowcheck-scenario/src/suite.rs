//! Runs a list of scenarios, serially or in bounded parallel batches.

use std::thread;
use std::time::Instant;

use chrono::Utc;

use crate::driver::ScenarioDriver;
use crate::error::ScenarioError;
use crate::report::{ScenarioReport, SuiteReport};
use crate::scenario::Scenario;

#[derive(Debug, Clone, Copy)]
pub struct SuiteRunner<'a> {
    driver: ScenarioDriver<'a>,
    max_parallelism: usize,
    include_disabled: bool,
}

impl<'a> SuiteRunner<'a> {
    /// Takes `max_parallelism` from the driver's config.
    pub fn new(driver: ScenarioDriver<'a>) -> Self {
        Self {
            max_parallelism: driver.config().max_parallelism.max(1),
            driver,
            include_disabled: false,
        }
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_parallelism(mut self, max: usize) -> Self {
        self.max_parallelism = max.max(1);
        self
    }

    /// Runs disabled scenarios instead of reporting them as skipped.
    pub fn with_include_disabled(mut self, include: bool) -> Self {
        self.include_disabled = include;
        self
    }

    pub fn max_parallelism(&self) -> usize {
        self.max_parallelism
    }

    /// Reports come back in the order the scenarios were given.
    pub fn run(&self, scenarios: &[Scenario]) -> SuiteReport {
        let started_at = Utc::now();
        let clock = Instant::now();
        tracing::info!(
            scenarios = scenarios.len(),
            max_parallelism = self.max_parallelism,
            include_disabled = self.include_disabled,
            "suite started"
        );

        let mut reports = Vec::with_capacity(scenarios.len());
        for batch in scenarios.chunks(self.max_parallelism) {
            if batch.len() == 1 {
                reports.push(self.run_one(&batch[0]));
            } else {
                reports.extend(self.run_batch(batch));
            }
        }

        let report = SuiteReport::new(started_at, clock.elapsed(), reports);
        tracing::info!(
            passed = report.passed,
            failed = report.failed,
            errored = report.errored,
            skipped = report.skipped,
            duration_ms = report.duration_ms,
            "suite finished"
        );
        report
    }

    fn run_batch(&self, batch: &[Scenario]) -> Vec<ScenarioReport> {
        thread::scope(|scope| {
            let handles: Vec<_> = batch
                .iter()
                .map(|scenario| scope.spawn(move || self.run_one(scenario)))
                .collect();

            handles
                .into_iter()
                .zip(batch)
                .map(|(handle, scenario)| {
                    handle.join().unwrap_or_else(|_| {
                        let err = ScenarioError::WorkerPanicked {
                            scenario: scenario.name().to_string(),
                        };
                        tracing::error!(error = %err, "scenario worker panicked");
                        ScenarioReport::errored(
                            scenario.name(),
                            &err,
                            Utc::now(),
                            Default::default(),
                        )
                    })
                })
                .collect()
        })
    }

    fn run_one(&self, scenario: &Scenario) -> ScenarioReport {
        let _span = tracing::info_span!("scenario", name = scenario.name()).entered();
        if let Some(reason) = scenario.disabled_reason() {
            if !self.include_disabled {
                tracing::info!(reason, "scenario skipped");
                return ScenarioReport::skipped(scenario.name(), reason);
            }
        }

        let started_at = Utc::now();
        let clock = Instant::now();
        self.driver.run(scenario).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "scenario aborted");
            ScenarioReport::errored(scenario.name(), &err, started_at, clock.elapsed())
        })
    }
}
