use iced::widget::{column, container, image, row, text};
use iced::{Element, Event, Length, Subscription, Task, event, keyboard, window};

use super::Message;
use super::source::{FrameSource, Panel};

/// Window showing one set of panels at a time; any key advances, and the
/// application exits after the last set.
pub struct ReviewApp<S: FrameSource> {
    source: S,
    panels: Vec<Panel>,
    cycle: usize,
    title: String,
}

impl<S: FrameSource> ReviewApp<S> {
    pub fn boot(mut source: S, title: String) -> (Self, Task<Message>) {
        let first = source.next_panels();
        let task = if first.is_some() { Task::none() } else { iced::exit() };
        (
            Self {
                source,
                panels: first.unwrap_or_default(),
                cycle: 1,
                title,
            },
            task,
        )
    }

    pub fn title(&self) -> String {
        self.title.clone()
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Advance => match self.source.next_panels() {
                Some(panels) => {
                    self.panels = panels;
                    self.cycle += 1;
                    tracing::debug!("Display cycle {}", self.cycle);
                    Task::none()
                }
                None => iced::exit(),
            },
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let panels = self.panels.iter().map(|panel| -> Element<'_, Message> {
            let mut panel_column = column![].spacing(8).width(Length::FillPortion(1));
            if !panel.title.is_empty() {
                panel_column = panel_column.push(text(&panel.title).size(16));
            }
            panel_column
                .push(image(panel.handle.clone()).width(Length::Fill))
                .into()
        });

        container(row(panels).spacing(20).padding(20))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        event::listen_with(on_event)
    }
}

fn on_event(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Keyboard(keyboard::Event::KeyPressed { .. }) => Some(Message::Advance),
        _ => None,
    }
}
