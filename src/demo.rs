//! Sample traffic for trying out the viewer

use std::io;
use std::thread;
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::info;

use logpane_core::{LogSink, RecordParser, Severity};

const MESSAGES: &[&str] = &[
    "Lorem ipsum dolor sit amet",
    "consectetur adipiscing elit",
    "sed do eiusmod tempor incididunt",
    "ut labore et dolore magna aliqua",
    "connection pool exhausted, retrying",
    "request served in 12ms",
    "cache miss for key user:42",
    "shutting down worker",
];

const BURST_SIZE: usize = 10;

/// Writes raw loguru-style records straight into the sink, the same shape
/// an external logging backend would hand over.
#[derive(Clone, Debug)]
pub struct Generator {
    sink: LogSink,
    started: Instant,
}

impl Generator {
    pub fn new(sink: LogSink) -> Self {
        Self {
            sink,
            started: Instant::now(),
        }
    }

    /// One record from the calling thread
    pub fn emit(&self, level: Severity, message: &str) {
        let current = thread::current();
        let preamble = format!(
            "{} ({:>8.3}s) [{:<16}] demo:{}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            self.started.elapsed().as_secs_f64(),
            RecordParser::logger_field(current.name().unwrap_or("unnamed")),
            level.short(),
        );
        self.sink.on_record(level.verbosity(), &preamble, message);
    }

    /// A burst of messages at random severities from the calling thread
    pub fn burst(&self) {
        for n in 0..BURST_SIZE {
            let level = Severity::ALL[rand::random_range(0..Severity::ALL.len())];
            let text = MESSAGES[rand::random_range(0..MESSAGES.len())];
            self.emit(level, &format!("{text} ({n})"));
        }
    }

    /// Bursts from `threads` named threads (`test1`, `test2`, ...)
    pub fn spawn_threads(&self, threads: usize) -> io::Result<()> {
        for id in 1..=threads {
            let generator = self.clone();
            thread::Builder::new()
                .name(format!("test{id}"))
                .spawn(move || {
                    for _ in 0..3 {
                        generator.burst();
                        thread::sleep(Duration::from_millis(rand::random_range(5..50)));
                    }
                })?;
        }
        info!(threads, "spawned generator threads");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_delivers_parsed_entries() {
        let (sink, mut rx) = LogSink::channel();
        Generator::new(sink.clone()).burst();

        let mut received = 0;
        while let Ok(entry) = rx.try_recv() {
            assert!(!entry.message.is_empty());
            assert!(!entry.logger_name.is_empty());
            received += 1;
        }
        assert_eq!(received, BURST_SIZE);
        assert_eq!(sink.dropped(), 0);
    }

    #[test]
    fn test_emit_keeps_severity_and_thread_name() {
        let (sink, mut rx) = LogSink::channel();
        let generator = Generator::new(sink);

        thread::Builder::new()
            .name("emitter".to_string())
            .spawn(move || generator.emit(Severity::Critical, "boom"))
            .unwrap()
            .join()
            .unwrap();

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.level, Severity::Critical);
        assert_eq!(entry.logger_name, "emitter");
        assert_eq!(entry.message, "boom");
    }

    #[test]
    fn test_emit_from_bracketed_thread_name() {
        let (sink, mut rx) = LogSink::channel();
        let generator = Generator::new(sink);

        thread::Builder::new()
            .name("worker]x".to_string())
            .spawn(move || generator.emit(Severity::Info, "hi"))
            .unwrap()
            .join()
            .unwrap();

        let entry = rx.try_recv().unwrap();
        assert_eq!(entry.logger_name, "worker)x");
    }

    #[test]
    fn test_threads_are_named() {
        let (sink, mut rx) = LogSink::channel();
        Generator::new(sink).spawn_threads(2).unwrap();

        let mut loggers = std::collections::BTreeSet::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while loggers.len() < 2 && Instant::now() < deadline {
            match rx.try_recv() {
                Ok(entry) => {
                    loggers.insert(entry.logger_name.clone());
                }
                Err(_) => thread::sleep(Duration::from_millis(5)),
            }
        }

        assert!(loggers.contains("test1"));
        assert!(loggers.contains("test2"));
    }
}
