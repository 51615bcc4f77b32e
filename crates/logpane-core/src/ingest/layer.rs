use std::fmt::{self, Write as _};
use std::thread;
use std::time::Instant;

use chrono::Local;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use logpane_types::Severity;

use super::{LogSink, RecordParser};

/// Forwards tracing events at INFO and above into a [`LogSink`].
///
/// Each event gets a preamble of the shape
/// `date HH:MM:SS.mmm (elapsed) [thread] target`, parsed back by the sink
/// like any other raw record.
pub struct SinkLayer {
    sink: LogSink,
    started: Instant,
}

impl SinkLayer {
    pub fn new(sink: LogSink) -> Self {
        Self {
            sink,
            started: Instant::now(),
        }
    }

    fn preamble(&self, target: &str) -> String {
        let current = thread::current();
        let thread_name = match current.name() {
            Some(name) => RecordParser::logger_field(name),
            None => format!("{:?}", current.id()),
        };

        format!(
            "{} ({:>8.3}s) [{:<16}] {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            self.started.elapsed().as_secs_f64(),
            thread_name,
            target,
        )
    }
}

impl<S: Subscriber> Layer<S> for SinkLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let Some(severity) = Severity::from_tracing(*metadata.level()) else {
            return;
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let preamble = self.preamble(metadata.target());
        self.sink
            .on_record(severity.verbosity(), &preamble, &visitor.finish());
    }
}

/// Collects the `message` field plus any other fields as `key=value`
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }

    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }
}
