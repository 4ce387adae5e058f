use crate::app::{Message, ScriptPanels};
use crate::ui::components;
use iced::widget::{container, scrollable, text, Column};
use iced::{Center, Element, Length};

pub fn main_view(app: &ScriptPanels) -> Element<Message> {
    let content: Element<Message> = match &app.load_error {
        Some(error) => Column::new()
            .spacing(10)
            .push(text("No script panels").size(24))
            .push(text(error).size(14).color([0.8, 0.2, 0.2]))
            .align_x(Center)
            .into(),
        None => app
            .panels
            .iter()
            .enumerate()
            .fold(Column::new().spacing(20).padding(20), |column, (index, panel)| {
                column.push(
                    container(components::panel_view(index, panel))
                        .padding(15)
                        .style(container::bordered_box)
                        .width(Length::Fill),
                )
            })
            .into(),
    };

    container(scrollable(content))
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
