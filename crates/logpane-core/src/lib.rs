//! Log view core for logpane
//!
//! This crate provides the bounded entry store, incremental filtering,
//! per-logger styling, auto-scroll decisions, filter history and the
//! cross-thread ingest path.

mod error;
mod filter;
mod history;
mod ingest;
mod scroll;
mod store;
mod style;
mod view;

pub use error::{FilterError, HistoryError, IngestError, StoreError, StyleError};
pub use filter::{CompiledFilter, FilterEngine, FilterStatus};
pub use history::FilterHistory;
pub use ingest::{AttachmentId, EntryReceiver, EntrySender, LogSink, RecordParser, SinkLayer};
pub use scroll::{AutoScrollController, PinnedToBottom, Viewport};
pub use store::{ArcLogEntry, EntryStore, LevelCounts, StoreEvent, StoreObserver};
pub use style::{StyleChange, StyleRegistry};
pub use view::{Control, LogView, Toolbar, ViewEvent};

// Re-export types used in our public API
pub use logpane_types::{
    AutoScrollPolicy, Color, FilterSpec, FontStyle, LogEntry, Severity, StyleEdit, StyleKind,
};
