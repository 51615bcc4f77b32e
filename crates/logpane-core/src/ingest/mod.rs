//! Producer-side ingest: parsing raw records and handing them to the view thread

mod layer;
mod parser;
mod sink;

pub use layer::SinkLayer;
pub use parser::RecordParser;
pub use sink::{AttachmentId, EntryReceiver, EntrySender, LogSink};
