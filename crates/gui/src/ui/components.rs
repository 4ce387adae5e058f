use crate::app::{Message, Panel};
use iced::widget::{button, container, row, scrollable, text, text_input, Column, Text};
use iced::{Center, Element, Length};
use script_panels_core::panel::RunState;

const OUTPUT_HEIGHT: f32 = 180.0;

pub fn argument_row(index: usize, panel: &Panel) -> iced::widget::Row<'_, Message> {
    let definition = panel.controller.definition();

    let input = text_input(&definition.placeholder_text, &panel.argument)
        .on_input(move |value| Message::ArgumentChanged(index, value))
        .on_submit(Message::RunRequested(index))
        .padding(8)
        .size(16);

    let run_button = button(text("Run").size(16))
        .padding([8, 20])
        .style(button::success)
        .on_press_maybe(
            panel
                .controller
                .is_run_enabled()
                .then_some(Message::RunRequested(index)),
        );

    row![text(&definition.prompt_label).size(14), input, run_button]
        .spacing(10)
        .align_y(Center)
}

pub fn status_line(panel: &Panel) -> Text<'_> {
    let status = text(panel.controller.status_text()).size(14);

    match panel.controller.state() {
        RunState::Failed(_) => status.color([0.8, 0.2, 0.2]),
        RunState::Finished(0) => status.color([0.2, 0.6, 0.3]),
        RunState::Finished(_) => status.color([0.8, 0.5, 0.1]),
        RunState::Idle | RunState::Running { .. } => status,
    }
}

pub fn output_view(panel: &Panel) -> Element<'_, Message> {
    container(scrollable(text(panel.controller.output_text()).size(13)).width(Length::Fill))
        .padding(10)
        .style(container::bordered_box)
        .width(Length::Fill)
        .height(Length::Fixed(OUTPUT_HEIGHT))
        .into()
}

pub fn panel_view(index: usize, panel: &Panel) -> Element<'_, Message> {
    let definition = panel.controller.definition();

    let mut column = Column::new()
        .spacing(10)
        .push(text(&definition.title).size(22));

    if !definition.detail_text.is_empty() {
        column = column.push(text(&definition.detail_text).size(14));
    }

    column
        .push(argument_row(index, panel))
        .push(status_line(panel))
        .push(output_view(panel))
        .into()
}
