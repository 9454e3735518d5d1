//! Built-in scenarios covering the scaffold → restore → build → run → clean
//! workflow and project-local tool invocation.

use flowcheck_core::Search;

use crate::error::ScenarioError;
use crate::scenario::Scenario;
use crate::step::Step;

pub const NEW_RESTORE_BUILD_RUN_CLEAN: &str = "new-restore-build-run-clean";
pub const RUN_TOOLS_IN_PROJECT: &str = "run-tools-in-project";
pub const PREFERS_CLI_RUNTIME: &str = "prefers-cli-runtime";
pub const DEPENDENCY_TOOL_INVOKER: &str = "dependency-tool-invoker";

/// Tool invocation from a project is broken upstream.
pub const TOOL_INVOCATION_DEFECT: &str = "https://github.com/dotnet/cli/issues/9688";

pub const PORTABLE_APP_TEMPLATE: &str = "MSBuildTestApp";
pub const PROJECT_DEPENDENCY_TOOL_TEMPLATE: &str = "TestAppWithProjDepTool";

pub fn builtin() -> Vec<Scenario> {
    vec![
        Scenario::new(NEW_RESTORE_BUILD_RUN_CLEAN)
            .summary("Scaffold a console app, restore, build, run it and clean the output")
            .step(Step::scaffold("console", true))
            .step(Step::restore("", true))
            .step(Step::build(""))
            .step(Step::run("", Some("Hello World!"), true))
            .step(Step::expect_artifacts("bin", "*.dll", Search::AllDirectories))
            .step(Step::clean(""))
            .step(Step::expect_no_artifacts("bin", "*.dll", Search::AllDirectories)),
        Scenario::new(RUN_TOOLS_IN_PROJECT)
            .summary("Invoke a project-referenced tool with -d")
            .with_template(PORTABLE_APP_TEMPLATE)
            .step(Step::restore("", false))
            .step(Step::tool("-d portable", Some("Hello Portable World!"))),
        Scenario::new(PREFERS_CLI_RUNTIME)
            .summary("Invoke a tool that prefers the CLI's own runtime")
            .with_template(PORTABLE_APP_TEMPLATE)
            .disabled(TOOL_INVOCATION_DEFECT)
            .step(Step::restore("", false))
            .step(Step::tool(
                "-d prefercliruntime",
                Some("Hello I prefer the cli runtime World!"),
            )),
        Scenario::new(DEPENDENCY_TOOL_INVOKER)
            .summary("Invoke a tool through a project-to-project dependency")
            .with_template(PROJECT_DEPENDENCY_TOOL_TEMPLATE)
            .disabled(TOOL_INVOCATION_DEFECT)
            .step(Step::restore("", false))
            .step(Step::build("-c Debug"))
            .step(Step::tool(
                "-d dependency-tool-invoker -c Debug -f netcoreapp3.0 portable",
                Some("Hello Portable World!"),
            )),
    ]
}

pub fn names() -> Vec<String> {
    builtin().iter().map(|s| s.name().to_string()).collect()
}

/// Scenarios named in `requested`, in that order; every built-in when empty.
///
/// Repeated names run once.
pub fn select<S: AsRef<str>>(requested: &[S]) -> Result<Vec<Scenario>, ScenarioError> {
    let all = builtin();
    if requested.is_empty() {
        return Ok(all);
    }

    let mut selected: Vec<Scenario> = Vec::with_capacity(requested.len());
    for name in requested {
        let name = name.as_ref();
        if selected.iter().any(|s| s.name() == name) {
            continue;
        }
        let scenario = all
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| ScenarioError::UnknownScenario {
                name: name.to_string(),
                available: names(),
            })?;
        selected.push(scenario.clone());
    }
    Ok(selected)
}
