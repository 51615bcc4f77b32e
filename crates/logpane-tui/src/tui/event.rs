use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Terminal events
#[derive(Clone, Debug)]
pub enum Event {
    /// Periodic tick; the view drains its ingest queue here
    Tick,
    Key(KeyEvent),
    Resize(u16, u16),
    Error(String),
}

impl Event {
    /// Map a crossterm event, dropping the ones the viewer ignores
    fn from_crossterm(event: CrosstermEvent) -> Option<Self> {
        match event {
            // Key release events show up on Windows
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Self::Key(key)),
            CrosstermEvent::Resize(w, h) => Some(Self::Resize(w, h)),
            _ => None,
        }
    }
}

/// Merges terminal input with a fixed-rate tick on a background task
pub struct EventHandler {
    receiver: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        tokio::spawn(Self::run(sender, cancel.clone(), tick_rate));

        Self { receiver, cancel }
    }

    async fn run(
        sender: mpsc::UnboundedSender<Event>,
        cancel: CancellationToken,
        tick_rate: Duration,
    ) {
        let mut reader = EventStream::new();
        let mut ticks = tokio::time::interval(tick_rate);
        // A stalled frame should not turn into a burst of pumps
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticks.tick() => Some(Event::Tick),
                input = reader.next() => match input {
                    Some(Ok(event)) => Event::from_crossterm(event),
                    Some(Err(e)) => Some(Event::Error(e.to_string())),
                    None => break,
                },
            };

            if let Some(event) = event {
                if sender.send(event).is_err() {
                    break;
                }
            }
        }
        debug!("terminal event task stopped");
    }

    pub async fn next(&mut self) -> Option<Event> {
        self.receiver.recv().await
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}
