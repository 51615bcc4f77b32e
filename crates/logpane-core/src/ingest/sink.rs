use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::trace;

use logpane_types::LogEntry;

use super::RecordParser;

/// Producer side of the view-thread handoff
pub type EntrySender = mpsc::UnboundedSender<LogEntry>;

/// View-thread side of the handoff
pub type EntryReceiver = mpsc::UnboundedReceiver<LogEntry>;

/// Identifies one attachment, so a stale owner cannot detach its successor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AttachmentId(u64);

#[derive(Default)]
struct SinkInner {
    /// Present while attached to a view
    tx: RwLock<Option<(AttachmentId, EntrySender)>>,

    /// Last handed-out attachment id
    generation: AtomicU64,

    /// Records handed to the queue
    delivered: AtomicU64,

    /// Malformed or undeliverable records
    dropped: AtomicU64,
}

/// Thread-safe entry point for raw log records.
///
/// Producers call [`LogSink::on_record`] from any thread. Parsing happens on the
/// caller's thread; the entry is then queued FIFO for the single view thread.
/// Nothing here blocks or fails toward the producer.
#[derive(Clone, Default)]
pub struct LogSink {
    inner: Arc<SinkInner>,
}

impl LogSink {
    /// Create a detached sink; records are dropped until [`attach`](Self::attach)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an attached sink together with its receiver
    pub fn channel() -> (Self, EntryReceiver) {
        let sink = Self::new();
        let rx = sink.attach();
        (sink, rx)
    }

    /// Open a fresh queue, replacing any previous one
    pub fn attach(&self) -> EntryReceiver {
        self.open().1
    }

    /// Like [`attach`](Self::attach), also returning the id that
    /// [`release`](Self::release) needs
    pub fn open(&self) -> (AttachmentId, EntryReceiver) {
        let id = AttachmentId(self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1);
        let (tx, rx) = mpsc::unbounded_channel();
        *self.inner.tx.write() = Some((id, tx));
        (id, rx)
    }

    /// Stop delivering, whoever is attached. Later records are dropped.
    pub fn detach(&self) {
        self.inner.tx.write().take();
    }

    /// Detach only if `id` is still the current attachment.
    ///
    /// Returns false when a later `attach` already replaced it.
    pub fn release(&self, id: AttachmentId) -> bool {
        let mut slot = self.inner.tx.write();
        if slot.as_ref().is_some_and(|(current, _)| *current == id) {
            slot.take();
            true
        } else {
            false
        }
    }

    /// Check if a receiver is still listening
    pub fn is_attached(&self) -> bool {
        self.inner
            .tx
            .read()
            .as_ref()
            .is_some_and(|(_, tx)| !tx.is_closed())
    }

    /// Raw log callback: `(verbosity, preamble, message)`
    pub fn on_record(&self, verbosity: i32, preamble: &str, message: &str) {
        match RecordParser::parse(verbosity, preamble, message) {
            Ok(entry) => self.submit(entry),
            Err(err) => {
                self.inner.dropped.fetch_add(1, Ordering::Relaxed);
                trace!("dropping record: {err}");
            }
        }
    }

    /// Queue an already-built entry
    pub fn submit(&self, entry: LogEntry) {
        let sent = match self.inner.tx.read().as_ref() {
            Some((_, tx)) => tx.send(entry).is_ok(),
            None => false,
        };

        if sent {
            self.inner.delivered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.inner.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records queued for the view so far
    pub fn delivered(&self) -> u64 {
        self.inner.delivered.load(Ordering::Relaxed)
    }

    /// Records dropped so far (malformed, detached, or receiver gone)
    pub fn dropped(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for LogSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSink")
            .field("attached", &self.is_attached())
            .field("delivered", &self.delivered())
            .field("dropped", &self.dropped())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn preamble(logger: &str) -> String {
        format!("2024-01-15 10:30:00.123 (   0.002s) [{logger:<16}] test.rs:1 INFO| ")
    }

    fn drain(rx: &mut EntryReceiver) -> Vec<LogEntry> {
        let mut out = Vec::new();
        while let Ok(entry) = rx.try_recv() {
            out.push(entry);
        }
        out
    }

    #[test]
    fn test_records_arrive_in_order() {
        let (sink, mut rx) = LogSink::channel();
        for i in 0..5 {
            sink.on_record(0, &preamble("main"), &format!("m{i}"));
        }

        let messages: Vec<String> = drain(&mut rx).into_iter().map(|e| e.message).collect();
        assert_eq!(messages, ["m0", "m1", "m2", "m3", "m4"]);
        assert_eq!(sink.delivered(), 5);
    }

    #[test]
    fn test_malformed_records_are_dropped() {
        let (sink, mut rx) = LogSink::channel();
        sink.on_record(0, "garbage", "lost");
        sink.on_record(-1, &preamble("main"), "kept");

        let entries = drain(&mut rx);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, "kept");
        assert_eq!(sink.dropped(), 1);
    }

    #[test]
    fn test_detached_sink_drops() {
        let (sink, mut rx) = LogSink::channel();
        assert!(sink.is_attached());
        sink.detach();
        assert!(!sink.is_attached());

        sink.on_record(0, &preamble("main"), "after detach");
        assert!(drain(&mut rx).is_empty());
        assert_eq!(sink.dropped(), 1);
    }

    #[test]
    fn test_stale_release_keeps_newer_attachment() {
        let sink = LogSink::new();
        let (first, _old_rx) = sink.open();
        let (second, mut rx) = sink.open();
        assert_ne!(first, second);

        assert!(!sink.release(first));
        assert!(sink.is_attached());
        sink.on_record(0, &preamble("main"), "still delivered");
        assert_eq!(drain(&mut rx).len(), 1);
        assert_eq!(sink.dropped(), 0);

        assert!(sink.release(second));
        assert!(!sink.is_attached());
    }

    #[test]
    fn test_receiver_gone_is_not_an_error() {
        let (sink, rx) = LogSink::channel();
        drop(rx);
        assert!(!sink.is_attached());
        sink.on_record(0, &preamble("main"), "nobody listens");
        assert_eq!(sink.dropped(), 1);
    }

    #[test]
    fn test_concurrent_producers_keep_per_thread_order() {
        let (sink, mut rx) = LogSink::channel();

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sink = sink.clone();
                thread::spawn(move || {
                    for i in 0..50 {
                        sink.on_record(0, &preamble(&format!("worker-{t}")), &i.to_string());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let entries = drain(&mut rx);
        assert_eq!(entries.len(), 200);
        for t in 0..4 {
            let name = format!("worker-{t}");
            let seen: Vec<u32> = entries
                .iter()
                .filter(|e| e.logger_name == name)
                .map(|e| e.message.parse().unwrap())
                .collect();
            assert_eq!(seen, (0..50).collect::<Vec<_>>());
        }
    }
}
