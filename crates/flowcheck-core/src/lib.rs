//! Building blocks for end-to-end tests of a multi-step build tool CLI.
//!
//! A test creates a [`Workspace`], runs [`CommandInvocation`]s inside it,
//! and checks each [`ExecutionResult`] (and the files left behind) with the
//! chainable assertions in [`assertions`]:
//!
//! ```ignore
//! let tool = ToolUnderTest::resolve("dotnet")?;
//! let ws = Workspace::create()?;
//! ws.invoke(&tool, CommandKind::Build).execute("")?.should().pass()?;
//! ws.dir("bin").have_files_matching("*.dll", Search::AllDirectories)?;
//! ```

#![deny(clippy::all)]

pub mod assertions;
pub mod config;
mod error;
pub mod invocation;
pub mod pattern;
mod result;
pub mod serial;
pub mod tool;
mod workspace;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use assertions::AssertResult;
pub use assertions::DirectoryAssert;
pub use assertions::ResultAssert;
pub use assertions::directory;
pub use config::HarnessConfig;
pub use error::AssertionViolation;
pub use error::HarnessError;
pub use invocation::CommandInvocation;
pub use invocation::CommandKind;
pub use invocation::split_args;
pub use pattern::FilePattern;
pub use pattern::FileScan;
pub use pattern::Search;
pub use result::ExecutionResult;
pub use serial::serial_guard;
pub use tool::ToolUnderTest;
pub use tool::runtime_root_variable;
pub use workspace::Workspace;

pub type Result<T> = std::result::Result<T, HarnessError>;
