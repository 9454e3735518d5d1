use clap::CommandFactory;
use clap::Parser;
use clap_complete::generate;

use flowcheck::commands::Cli;
use flowcheck::commands::Commands;
use flowcheck::commands::OutputFormat;
use flowcheck::handlers;
use flowcheck::presenter::create_presenter;
use flowcheck_common::color_init;
use flowcheck_common::init_tracing;
use flowcheck_core::HarnessError;
use flowcheck_scenario::ScenarioError;

fn main() {
    let cli = Cli::parse();
    let format = cli.effective_format();

    color_init(cli.no_color);
    let telemetry = init_tracing(cli.verbose);

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => report_error(format, &*e),
    };

    // process::exit skips destructors; flush buffered log lines first.
    drop(telemetry);
    std::process::exit(code);
}

fn report_error(format: OutputFormat, e: &(dyn std::error::Error + 'static)) -> i32 {
    let presenter = create_presenter(&format);
    if let Some(scenario_error) = e.downcast_ref::<ScenarioError>() {
        presenter.present_error(&scenario_error.to_json());
        scenario_error.exit_code()
    } else if let Some(harness_error) = e.downcast_ref::<HarnessError>() {
        presenter.present_error(&harness_error.to_json());
        harness_error.exit_code()
    } else {
        presenter.present_error(&serde_json::json!({ "message": e.to_string() }));
        1
    }
}

fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    let format = cli.effective_format();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "flowcheck", &mut std::io::stdout());
            Ok(0)
        }
        Commands::List => {
            handlers::handle_list(format)?;
            Ok(0)
        }
        Commands::Run(args) => handlers::handle_run(args, format),
    }
}
