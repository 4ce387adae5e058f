use std::io::{stdin, stdout};
use std::process::ExitCode;

use clap::Parser;
use log::debug;

use script_panels_core::config;
use script_panels_core::error::Result;
use script_panels_core::file_handling;
use script_panels_core::panel::PanelController;
use script_panels_core::runner::ProcessRunner;
use script_panels_core::script_definitions::ScriptDefinition;

use script_panels_cli::cli_args::Args;
use script_panels_cli::selection::{find_definition, print_definitions, prompt_for_argument};
use script_panels_cli::shell::run_panel;

/// Load panel definitions from the definitions file or the scripts directory
fn initialize_config(args: &Args) -> Result<Vec<ScriptDefinition>> {
    let definitions_path = config::get_definitions_path(&args.config_path);
    let scripts_dir = config::get_scripts_dir(&args.scripts_dir);
    debug!("Definitions path: `{definitions_path}`, scripts dir: `{scripts_dir}`");

    file_handling::load_script_definitions(&definitions_path, &scripts_dir)
}

fn build_runner(args: &Args) -> ProcessRunner {
    let runner = ProcessRunner::new(config::get_interpreter(&args.interpreter));

    match config::expand_working_directory(&args.working_directory) {
        Some(working_directory) => runner.with_working_directory(working_directory),
        None => runner,
    }
}

async fn execute() -> Result<u8> {
    let args = Args::parse();
    let definitions = initialize_config(&args)?;
    let mut stdout = stdout();

    let Some(script_id) = args.script_id.as_deref().filter(|_| !args.list) else {
        print_definitions(&definitions, &mut stdout)?;
        return Ok(0);
    };

    let definition = find_definition(&definitions, script_id)?.clone();

    let argument = match &args.argument {
        Some(argument) => argument.clone(),
        None => prompt_for_argument(&definition, &mut stdin().lock(), &mut stdout)?,
    };

    let mut panel = PanelController::new(definition, build_runner(&args));
    let outcome = run_panel(&mut panel, &argument, &mut stdout).await?;

    Ok(outcome.exit_code())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    match execute().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
