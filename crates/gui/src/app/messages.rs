use script_panels_core::runner::RunUpdate;

#[derive(Debug, Clone)]
pub enum Message {
    ArgumentChanged(usize, String),
    RunRequested(usize),
    RunUpdated(usize, RunUpdate),
}
