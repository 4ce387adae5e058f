use iced::futures::stream::{self, Stream};
use script_panels_core::runner::{RunEvents, RunUpdate};

/// Turns a run's event channel into a stream iced can drive.
pub fn run_updates(events: RunEvents) -> impl Stream<Item = RunUpdate> {
    stream::unfold(events, |mut events| async move {
        events.recv().await.map(|update| (update, events))
    })
}
