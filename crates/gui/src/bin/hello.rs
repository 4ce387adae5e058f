//! A greeting window with a button that opens an alert.

use std::f32::consts::PI;

use iced::keyboard::{self, Key, Modifiers};
use iced::widget::{button, column, container, row, text};
use iced::{
    gradient, Background, Border, Center, Color, Element, Fill, Radians, Subscription, Task, Theme,
};

const APP_NAME: &str = "Hello World";

const TITLE_COLOR: Color = Color::WHITE;
const SUBTITLE_COLOR: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 0.85,
};
const STROKE_COLOR: Color = Color {
    r: 1.0,
    g: 1.0,
    b: 1.0,
    a: 0.08,
};
const STROKE_INSET: u16 = 24;

#[derive(Debug, Clone, Copy)]
enum Message {
    SayHello,
    About,
    Dismiss,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alert {
    Greeting,
    About,
}

#[derive(Default)]
struct Hello {
    alert: Option<Alert>,
}

impl Hello {
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SayHello => self.alert = Some(Alert::Greeting),
            Message::About => self.alert = Some(Alert::About),
            Message::Dismiss => self.alert = None,
            Message::Quit => return iced::exit(),
        }

        Task::none()
    }

    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(shortcut)
    }

    fn view(&self) -> Element<Message> {
        let mut content = column![
            text("Hello, macOS!").size(34).color(TITLE_COLOR),
            text("A native Rust app with a friendly face.")
                .size(16)
                .color(SUBTITLE_COLOR),
            button(text("Say hello back").size(16))
                .padding([10, 20])
                .style(button::primary)
                .on_press(Message::SayHello),
        ]
        .spacing(18)
        .align_x(Center);

        if let Some(alert) = self.alert {
            content = content.push(alert_card(alert));
        }

        let framed = container(container(content).center(Fill).style(overlay_stroke))
            .padding(STROKE_INSET)
            .width(Fill)
            .height(Fill);

        container(column![app_menu(), framed])
            .width(Fill)
            .height(Fill)
            .style(gradient_background)
            .into()
    }
}

/// Cmd+Q (Ctrl+Q off macOS) quits.
fn shortcut(key: Key, modifiers: Modifiers) -> Option<Message> {
    match key.as_ref() {
        Key::Character("q") if modifiers.command() => Some(Message::Quit),
        _ => None,
    }
}

fn app_menu<'a>() -> Element<'a, Message> {
    row![
        button(text(format!("About {APP_NAME}")).size(13).color(SUBTITLE_COLOR))
            .style(button::text)
            .on_press(Message::About),
        button(text(format!("Quit {APP_NAME}")).size(13).color(SUBTITLE_COLOR))
            .style(button::text)
            .on_press(Message::Quit),
    ]
    .spacing(4)
    .padding([4, 8])
    .into()
}

fn alert_card<'a>(alert: Alert) -> Element<'a, Message> {
    let (title, message, dismiss) = match alert {
        Alert::Greeting => (
            "Nice to meet you!".to_string(),
            "This is a native window rendered with iced.".to_string(),
            "Cheers",
        ),
        Alert::About => (
            APP_NAME.to_string(),
            format!("Version {}", env!("CARGO_PKG_VERSION")),
            "OK",
        ),
    };

    container(
        column![
            text(title).size(20).color(Color::BLACK),
            text(message).size(14).color(Color::BLACK),
            button(text(dismiss)).on_press(Message::Dismiss),
        ]
        .spacing(10)
        .align_x(Center),
    )
    .padding(20)
    .style(|_theme: &Theme| container::Style {
        background: Some(Background::Color(Color::WHITE)),
        border: Border {
            color: Color::from_rgba(0.0, 0.0, 0.0, 0.2),
            width: 1.0,
            radius: 10.0.into(),
        },
        ..container::Style::default()
    })
    .into()
}

fn gradient_background(_theme: &Theme) -> container::Style {
    let gradient = gradient::Linear::new(Radians(PI))
        .add_stop(0.0, Color::from_rgb(0.29, 0.11, 0.54))
        .add_stop(0.5, Color::from_rgb8(0x58, 0x56, 0xD6))
        .add_stop(1.0, Color::from_rgb8(0x30, 0xB0, 0xC7));

    container::Style {
        background: Some(Background::Gradient(gradient.into())),
        text_color: Some(TITLE_COLOR),
        ..container::Style::default()
    }
}

fn overlay_stroke(_theme: &Theme) -> container::Style {
    container::Style {
        border: Border {
            color: STROKE_COLOR,
            width: 2.0,
            radius: 24.0.into(),
        },
        ..container::Style::default()
    }
}

pub fn main() -> iced::Result {
    tracing_subscriber::fmt::init();

    iced::application(APP_NAME, Hello::update, Hello::view)
        .subscription(Hello::subscription)
        .window_size((520.0, 360.0))
        .centered()
        .run()
}
