use crate::app::Message;
use crate::execution::run_updates;
use iced::{Element, Task};
use log::error;
use script_panels_core::panel::{PanelController, RunRequest};
use script_panels_core::runner::ProcessRunner;
use script_panels_core::{config, file_handling};

pub struct Panel {
    pub controller: PanelController<ProcessRunner>,
    pub argument: String,
}

pub struct ScriptPanels {
    pub panels: Vec<Panel>,
    pub load_error: Option<String>,
}

impl ScriptPanels {
    pub fn load() -> Self {
        let definitions_path = config::get_definitions_path(&None);
        let scripts_dir = config::get_scripts_dir(&None);

        match file_handling::load_script_definitions(&definitions_path, &scripts_dir) {
            Ok(definitions) => Self {
                panels: definitions
                    .into_iter()
                    .map(|definition| Panel {
                        controller: PanelController::new(definition, ProcessRunner::default()),
                        argument: String::new(),
                    })
                    .collect(),
                load_error: None,
            },
            Err(e) => {
                error!("Could not load script panels: {e}");
                Self {
                    panels: Vec::new(),
                    load_error: Some(e.to_string()),
                }
            }
        }
    }

    pub fn title(&self) -> String {
        "Script Panels".to_string()
    }

    /// The only place panel state changes: user input and runner updates
    /// both arrive here as messages.
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ArgumentChanged(index, value) => {
                if let Some(panel) = self.panels.get_mut(index) {
                    panel.argument = value;
                }
                Task::none()
            }
            Message::RunRequested(index) => {
                let Some(panel) = self.panels.get_mut(index) else {
                    return Task::none();
                };

                // Enter in the input still submits while the button is disabled.
                if !panel.controller.is_run_enabled() {
                    return Task::none();
                }

                match panel.controller.request_run(&panel.argument) {
                    RunRequest::Started(events) => Task::run(run_updates(events), move |update| {
                        Message::RunUpdated(index, update)
                    }),
                    RunRequest::Invalid | RunRequest::Failed => Task::none(),
                }
            }
            Message::RunUpdated(index, update) => {
                if let Some(panel) = self.panels.get_mut(index) {
                    panel.controller.apply(update);
                }
                Task::none()
            }
        }
    }

    pub fn view(&self) -> Element<Message> {
        crate::ui::views::main_view(self)
    }
}
