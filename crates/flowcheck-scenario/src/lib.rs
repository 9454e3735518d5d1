//! Scenarios: named step lists run against the tool under test.
//!
//! A [`Scenario`] is data. The [`ScenarioDriver`] runs one inside a fresh
//! workspace and stops at the first failed step; the [`SuiteRunner`] runs
//! many, honouring `max_parallelism` and skipping disabled scenarios.

#![deny(clippy::all)]

pub mod catalog;
mod driver;
mod error;
mod report;
mod scenario;
mod step;
mod suite;

pub use driver::OutputPolicy;
pub use driver::ScenarioDriver;
pub use error::ErrorSummary;
pub use error::ScenarioError;
pub use report::ScenarioReport;
pub use report::ScenarioStatus;
pub use report::StepReport;
pub use report::SuiteReport;
pub use scenario::Scenario;
pub use step::Step;
pub use suite::SuiteRunner;

pub type Result<T> = std::result::Result<T, ScenarioError>;
