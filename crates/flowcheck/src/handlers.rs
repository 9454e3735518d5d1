use flowcheck_core::{HarnessConfig, ToolUnderTest};
use flowcheck_scenario::{OutputPolicy, ScenarioDriver, SuiteRunner, catalog};

use crate::commands::{OutputFormat, RunArgs};
use crate::presenter::create_presenter;

pub type HandlerResult = Result<(), Box<dyn std::error::Error>>;

pub fn handle_list(format: OutputFormat) -> HandlerResult {
    create_presenter(&format).present_scenarios(&catalog::builtin());
    Ok(())
}

/// Applies command-line overrides on top of the environment configuration.
pub fn resolve_config(args: &RunArgs) -> HarnessConfig {
    let mut config = HarnessConfig::from_env();
    if let Some(tool) = &args.tool {
        config = config.with_tool(tool.clone());
    }
    if let Some(assets) = &args.assets {
        config = config.with_assets_root(assets.clone());
    }
    if let Some(jobs) = args.jobs {
        config = config.with_max_parallelism(usize::from(jobs));
    }
    if args.keep_workspaces {
        config = config.with_keep_workspaces(true);
    }
    config
}

/// Runs the selected scenarios and returns the process exit code.
pub fn handle_run(args: RunArgs, format: OutputFormat) -> Result<i32, Box<dyn std::error::Error>> {
    let config = resolve_config(&args);
    let scenarios = catalog::select(args.names.as_slice())?;
    let tool = ToolUnderTest::resolve(&config.tool)?;

    // Inherited child output would corrupt the JSON document on stdout.
    let policy = match format {
        OutputFormat::Json => OutputPolicy::CaptureAll,
        OutputFormat::Text => OutputPolicy::PassThrough,
    };

    let presenter = create_presenter(&format);
    presenter.present_info(&format!(
        "Running {} scenario(s) against {}",
        scenarios.len(),
        tool.path().display()
    ));

    let driver = ScenarioDriver::new(&tool, &config).with_output_policy(policy);
    let report = SuiteRunner::new(driver)
        .with_include_disabled(args.include_disabled)
        .run(&scenarios);

    presenter.present_suite(&report);
    Ok(report.exit_code())
}
