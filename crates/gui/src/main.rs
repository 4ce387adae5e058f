use std::process::ExitCode;

use app::ScriptPanels;
use iced::Task;

mod app;
mod execution;
mod ui;

pub fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    // Runs are spawned from `update`, which must see a tokio runtime.
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start the runtime: {e}");
            return ExitCode::FAILURE;
        }
    };
    let _guard = runtime.enter();

    let result = iced::application(ScriptPanels::title, ScriptPanels::update, ScriptPanels::view)
        .window_size((640.0, 720.0))
        .centered()
        .run_with(|| (ScriptPanels::load(), Task::none()));

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
