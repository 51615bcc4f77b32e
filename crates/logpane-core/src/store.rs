use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::sync::Arc;

use tracing::debug;

use logpane_types::{LogEntry, Severity};

use crate::error::StoreError;

/// Shared handle to an entry; clones are a reference count increment
pub type ArcLogEntry = Arc<LogEntry>;

/// Mutation notifications, emitted in the order consumers rely on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    /// Rows `first..=last` are about to be removed
    AboutToRemove { first: usize, last: usize },
    /// Rows `first..=last` were removed
    Removed { first: usize, last: usize },
    /// Rows `first..=last` are about to be inserted
    AboutToInsert { first: usize, last: usize },
    /// Rows `first..=last` were inserted
    Inserted { first: usize, last: usize },
    /// Everything was removed at once
    Reset,
}

impl StoreEvent {
    /// Affected row range (None for a reset)
    pub fn range(&self) -> Option<RangeInclusive<usize>> {
        match *self {
            Self::AboutToRemove { first, last }
            | Self::Removed { first, last }
            | Self::AboutToInsert { first, last }
            | Self::Inserted { first, last } => Some(first..=last),
            Self::Reset => None,
        }
    }
}

/// Receives store notifications while the store is being mutated.
///
/// The store passes itself so observers can read the rows named by the event.
pub trait StoreObserver {
    fn on_store_event(&mut self, store: &EntryStore, event: StoreEvent);
}

impl StoreObserver for () {
    fn on_store_event(&mut self, _store: &EntryStore, _event: StoreEvent) {}
}

/// Records every event, mostly useful in tests
impl StoreObserver for Vec<StoreEvent> {
    fn on_store_event(&mut self, _store: &EntryStore, event: StoreEvent) {
        self.push(event);
    }
}

/// Counts per severity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelCounts {
    pub info: usize,
    pub warning: usize,
    pub error: usize,
    pub critical: usize,
}

impl LevelCounts {
    pub fn total(&self) -> usize {
        self.info + self.warning + self.error + self.critical
    }

    pub fn get(&self, level: Severity) -> usize {
        match level {
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Error => self.error,
            Severity::Critical => self.critical,
        }
    }

    fn slot(&mut self, level: Severity) -> &mut usize {
        match level {
            Severity::Info => &mut self.info,
            Severity::Warning => &mut self.warning,
            Severity::Error => &mut self.error,
            Severity::Critical => &mut self.critical,
        }
    }

    fn increment(&mut self, level: Severity) {
        *self.slot(level) += 1;
    }

    fn decrement(&mut self, level: Severity) {
        let slot = self.slot(level);
        *slot = slot.saturating_sub(1);
    }
}

/// Bounded, arrival-ordered collection of log entries.
///
/// Single-owner: every mutation happens on the view thread, so there is no
/// locking here. Cross-thread producers go through [`crate::LogSink`].
#[derive(Debug, Default)]
pub struct EntryStore {
    /// Internal storage, oldest first
    entries: VecDeque<ArcLogEntry>,

    /// Maximum number of retained entries (None = unbounded)
    max_entries: Option<usize>,

    /// Next arrival sequence number
    next_seq: u64,

    /// Incrementally maintained per-severity counts
    level_counts: LevelCounts,
}

impl EntryStore {
    /// Create an empty, unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given cap (`Some(0)` means unbounded)
    pub fn with_max_entries(max_entries: Option<usize>) -> Self {
        Self {
            max_entries: normalize_cap(max_entries),
            ..Self::default()
        }
    }

    /// Append an entry, evicting the oldest one first if the store is full.
    ///
    /// Returns the sequence number stamped on the entry.
    pub fn append(&mut self, mut entry: LogEntry, observer: &mut dyn StoreObserver) -> u64 {
        if let Some(cap) = self.max_entries {
            if self.entries.len() >= cap {
                self.evict_front(self.entries.len() + 1 - cap, observer);
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        entry.seq = seq;

        let row = self.entries.len();
        observer.on_store_event(self, StoreEvent::AboutToInsert { first: row, last: row });
        self.level_counts.increment(entry.level);
        self.entries.push_back(Arc::new(entry));
        observer.on_store_event(self, StoreEvent::Inserted { first: row, last: row });

        seq
    }

    /// Update the cap, evicting the oldest surplus as a single batch
    pub fn set_max_entries(&mut self, max_entries: Option<usize>, observer: &mut dyn StoreObserver) {
        self.max_entries = normalize_cap(max_entries);

        if let Some(cap) = self.max_entries {
            if self.entries.len() > cap {
                self.evict_front(self.entries.len() - cap, observer);
            }
        }
    }

    /// Current cap
    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// Remove every entry with a single reset notification
    pub fn clear(&mut self, observer: &mut dyn StoreObserver) {
        debug!(removed = self.entries.len(), "clearing entry store");
        self.entries.clear();
        self.next_seq = 0;
        self.level_counts = LevelCounts::default();
        observer.on_store_event(self, StoreEvent::Reset);
    }

    /// Total entry count
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Check if store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, oldest first
    pub fn at(&self, index: usize) -> Result<&ArcLogEntry, StoreError> {
        self.entries.get(index).ok_or(StoreError::OutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Entries in arrival order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ArcLogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Get entry count per severity
    pub fn level_counts(&self) -> LevelCounts {
        self.level_counts
    }

    fn evict_front(&mut self, count: usize, observer: &mut dyn StoreObserver) {
        if count == 0 {
            return;
        }
        let last = count - 1;

        observer.on_store_event(self, StoreEvent::AboutToRemove { first: 0, last });
        for evicted in self.entries.drain(..count) {
            self.level_counts.decrement(evicted.level);
        }
        if count > 1 {
            debug!(count, remaining = self.entries.len(), "evicted oldest entries");
        }
        observer.on_store_event(self, StoreEvent::Removed { first: 0, last });
    }
}

/// A zero cap is treated as "no cap"
fn normalize_cap(max_entries: Option<usize>) -> Option<usize> {
    max_entries.filter(|&cap| cap > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(message: impl Into<String>) -> LogEntry {
        LogEntry::new(Severity::Info, "main", "10:00:00.000", "0.001s", message)
    }

    fn messages(store: &EntryStore) -> Vec<String> {
        store.iter().map(|e| e.message.clone()).collect()
    }

    #[test]
    fn test_append_preserves_order() {
        let mut store = EntryStore::new();
        for i in 0..5 {
            store.append(entry(format!("m{i}")), &mut ());
        }
        assert_eq!(store.count(), 5);
        assert_eq!(messages(&store), ["m0", "m1", "m2", "m3", "m4"]);
        assert_eq!(store.at(4).unwrap().seq, 4);
    }

    #[test]
    fn test_append_event_order() {
        let mut store = EntryStore::with_max_entries(Some(2));
        let mut events = Vec::new();
        store.append(entry("a"), &mut events);
        store.append(entry("b"), &mut events);
        events.clear();

        store.append(entry("c"), &mut events);
        assert_eq!(
            events,
            [
                StoreEvent::AboutToRemove { first: 0, last: 0 },
                StoreEvent::Removed { first: 0, last: 0 },
                StoreEvent::AboutToInsert { first: 1, last: 1 },
                StoreEvent::Inserted { first: 1, last: 1 },
            ]
        );
        assert_eq!(messages(&store), ["b", "c"]);
    }

    #[test]
    fn test_lowering_cap_evicts_one_batch() {
        let mut store = EntryStore::new();
        for i in 0..10 {
            store.append(entry(format!("m{i}")), &mut ());
        }

        let mut events = Vec::new();
        store.set_max_entries(Some(3), &mut events);
        assert_eq!(
            events,
            [
                StoreEvent::AboutToRemove { first: 0, last: 6 },
                StoreEvent::Removed { first: 0, last: 6 },
            ]
        );
        assert_eq!(messages(&store), ["m7", "m8", "m9"]);
        assert_eq!(store.max_entries(), Some(3));
    }

    #[test]
    fn test_unbounded_cap_never_evicts() {
        let mut store = EntryStore::with_max_entries(Some(2));
        store.set_max_entries(None, &mut ());
        let mut events = Vec::new();
        for i in 0..5 {
            store.append(entry(format!("m{i}")), &mut events);
        }
        assert_eq!(store.count(), 5);
        assert!(!events.iter().any(|e| matches!(e, StoreEvent::Removed { .. })));
    }

    #[test]
    fn test_zero_cap_is_unbounded() {
        let store = EntryStore::with_max_entries(Some(0));
        assert_eq!(store.max_entries(), None);
    }

    #[test]
    fn test_clear_resets() {
        let mut store = EntryStore::with_max_entries(Some(4));
        for i in 0..3 {
            store.append(entry(format!("m{i}")), &mut ());
        }

        let mut events = Vec::new();
        store.clear(&mut events);
        assert_eq!(events, [StoreEvent::Reset]);
        assert_eq!(store.count(), 0);
        assert_eq!(store.level_counts().total(), 0);
        assert_eq!(store.max_entries(), Some(4));
    }

    #[test]
    fn test_at_out_of_range() {
        let mut store = EntryStore::new();
        store.append(entry("only"), &mut ());
        assert!(store.at(0).is_ok());
        assert_eq!(store.at(1).unwrap_err(), StoreError::OutOfRange { index: 1, len: 1 });
    }

    #[test]
    fn test_level_counts_follow_eviction() {
        let mut store = EntryStore::with_max_entries(Some(2));
        let mut warning = entry("w");
        warning.level = Severity::Warning;
        store.append(warning, &mut ());
        store.append(entry("i1"), &mut ());
        store.append(entry("i2"), &mut ());

        let counts = store.level_counts();
        assert_eq!(counts.warning, 0);
        assert_eq!(counts.info, 2);
        assert_eq!(counts.total(), store.count());
    }

    #[test]
    fn test_observer_sees_inserted_row() {
        struct LastMessage(Option<String>);

        impl StoreObserver for LastMessage {
            fn on_store_event(&mut self, store: &EntryStore, event: StoreEvent) {
                if let StoreEvent::Inserted { last, .. } = event {
                    self.0 = store.at(last).ok().map(|e| e.message.clone());
                }
            }
        }

        let mut store = EntryStore::new();
        let mut observer = LastMessage(None);
        store.append(entry("hello"), &mut observer);
        assert_eq!(observer.0.as_deref(), Some("hello"));
    }

    proptest! {
        #[test]
        fn prop_bounded_append_keeps_last_n(cap in 1usize..32, total in 0usize..128) {
            let mut store = EntryStore::with_max_entries(Some(cap));
            for i in 0..total {
                store.append(entry(i.to_string()), &mut ());
                prop_assert!(store.count() <= cap);
            }

            let expected: Vec<String> = (total.saturating_sub(cap)..total).map(|i| i.to_string()).collect();
            prop_assert_eq!(messages(&store), expected);
        }

        #[test]
        fn prop_lowering_cap_keeps_most_recent(total in 0usize..64, cap in 1usize..64) {
            let mut store = EntryStore::new();
            for i in 0..total {
                store.append(entry(i.to_string()), &mut ());
            }
            store.set_max_entries(Some(cap), &mut ());

            prop_assert_eq!(store.count(), total.min(cap));
            let expected: Vec<String> = (total.saturating_sub(cap)..total).map(|i| i.to_string()).collect();
            prop_assert_eq!(messages(&store), expected);
        }
    }
}
