use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use logpane_types::{FilterSpec, LogEntry};

use crate::error::{FilterError, StoreError};
use crate::store::{ArcLogEntry, EntryStore, StoreEvent, StoreObserver};

/// Compiled matcher for one [`FilterSpec`]
#[derive(Clone)]
pub struct CompiledFilter {
    /// Compiled pattern (None = matches everything)
    regex: Option<Regex>,

    /// Spec this matcher was built from
    spec: FilterSpec,
}

impl CompiledFilter {
    /// Compile a spec. Substring patterns are escaped, so only regex mode can fail.
    pub fn new(spec: &FilterSpec) -> Result<Self, FilterError> {
        let regex = if spec.pattern.is_empty() {
            None
        } else {
            let source = if spec.is_regex {
                spec.pattern.clone()
            } else {
                regex::escape(&spec.pattern)
            };

            let compiled = RegexBuilder::new(&source)
                .case_insensitive(!spec.case_sensitive)
                .build()
                .map_err(|source| FilterError::InvalidPattern {
                    pattern: spec.pattern.clone(),
                    source,
                })?;
            Some(compiled)
        };

        Ok(Self {
            regex,
            spec: spec.clone(),
        })
    }

    /// Matches everything
    pub fn empty() -> Self {
        Self {
            regex: None,
            spec: FilterSpec::default(),
        }
    }

    /// Check if a log entry's message matches this filter
    pub fn matches(&self, entry: &LogEntry) -> bool {
        match &self.regex {
            Some(re) => re.is_match(&entry.message),
            None => true,
        }
    }

    /// Find all match positions in a string (for highlighting)
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        match &self.regex {
            Some(re) => re
                .find_iter(text)
                .filter(|m| !m.is_empty())
                .map(|m| (m.start(), m.end()))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Get the spec
    pub fn spec(&self) -> &FilterSpec {
        &self.spec
    }

    /// Check if filter has a text pattern
    pub fn has_pattern(&self) -> bool {
        self.regex.is_some()
    }
}

impl std::fmt::Debug for CompiledFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledFilter")
            .field("spec", &self.spec)
            .finish()
    }
}

/// Outcome of a filter change
#[derive(Debug, Clone)]
pub enum FilterStatus {
    /// The spec is active and this many rows are visible
    Applied { visible: usize },
    /// The pattern was rejected; the previous view is unchanged
    Rejected(FilterError),
}

impl FilterStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// Derived, order-preserving view over an [`EntryStore`].
///
/// Holds store row indices. Kept in step with the store through
/// [`StoreObserver`] and fully recomputed only when the spec changes.
#[derive(Debug)]
pub struct FilterEngine {
    /// Active matcher
    filter: CompiledFilter,

    /// Store rows that match, ascending
    visible: Vec<usize>,

    /// Last rejected pattern, cleared by the next accepted one
    last_error: Option<FilterError>,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterEngine {
    /// Engine with an empty spec (everything visible once rows arrive)
    pub fn new() -> Self {
        Self {
            filter: CompiledFilter::empty(),
            visible: Vec::new(),
            last_error: None,
        }
    }

    /// Apply a new spec. Invalid patterns leave the current view untouched.
    pub fn set_spec(&mut self, spec: FilterSpec, store: &EntryStore) -> FilterStatus {
        match CompiledFilter::new(&spec) {
            Ok(filter) => {
                self.filter = filter;
                self.last_error = None;
                self.recompute(store);
                FilterStatus::Applied {
                    visible: self.visible.len(),
                }
            }
            Err(err) => {
                warn!(pattern = %spec.pattern, "rejected filter pattern: {err}");
                self.last_error = Some(err.clone());
                FilterStatus::Rejected(err)
            }
        }
    }

    /// Last applied spec
    pub fn current_spec(&self) -> &FilterSpec {
        self.filter.spec()
    }

    /// Last rejected pattern, if the most recent change was invalid
    pub fn last_error(&self) -> Option<&FilterError> {
        self.last_error.as_ref()
    }

    /// Check if the most recent change was accepted
    pub fn is_valid(&self) -> bool {
        self.last_error.is_none()
    }

    /// Number of visible entries
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Store rows of the visible entries, ascending
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    /// Visible entry at `index`
    pub fn visible<'a>(
        &self,
        index: usize,
        store: &'a EntryStore,
    ) -> Result<&'a ArcLogEntry, StoreError> {
        let row = self.visible.get(index).ok_or(StoreError::OutOfRange {
            index,
            len: self.visible.len(),
        })?;
        store.at(*row)
    }

    /// Visible entries in arrival order
    pub fn visible_entries<'a>(
        &'a self,
        store: &'a EntryStore,
    ) -> impl Iterator<Item = &'a ArcLogEntry> + 'a {
        self.visible.iter().filter_map(|&row| store.at(row).ok())
    }

    /// Check an entry against the active matcher
    pub fn matches(&self, entry: &LogEntry) -> bool {
        self.filter.matches(entry)
    }

    /// Match positions in `text` for highlighting
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        self.filter.find_matches(text)
    }

    fn recompute(&mut self, store: &EntryStore) {
        self.visible = store
            .iter()
            .enumerate()
            .filter(|(_, e)| self.filter.matches(e))
            .map(|(row, _)| row)
            .collect();
        debug!(
            visible = self.visible.len(),
            total = store.count(),
            "recomputed filtered view"
        );
    }

    fn rows_removed(&mut self, first: usize, last: usize) {
        let count = last - first + 1;
        self.visible.retain(|&row| row < first || row > last);
        for row in self.visible.iter_mut().filter(|row| **row > last) {
            *row -= count;
        }
    }

    fn rows_inserted(&mut self, store: &EntryStore, first: usize, last: usize) {
        let count = last - first + 1;
        let at = self.visible.partition_point(|&row| row < first);
        for row in &mut self.visible[at..] {
            *row += count;
        }

        let matching: Vec<usize> = (first..=last)
            .filter(|&row| store.at(row).is_ok_and(|e| self.filter.matches(e)))
            .collect();
        self.visible.splice(at..at, matching);
    }
}

impl StoreObserver for FilterEngine {
    fn on_store_event(&mut self, store: &EntryStore, event: StoreEvent) {
        match event {
            StoreEvent::Removed { first, last } => self.rows_removed(first, last),
            StoreEvent::Inserted { first, last } => self.rows_inserted(store, first, last),
            StoreEvent::Reset => self.visible.clear(),
            StoreEvent::AboutToRemove { .. } | StoreEvent::AboutToInsert { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logpane_types::Severity;
    use proptest::prelude::*;

    const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit";
    const ANOTHER: &str = "Another message";

    fn entry(message: &str) -> LogEntry {
        LogEntry::new(Severity::Info, "main", "10:00:00.000", "0.001s", message)
    }

    fn populated(messages: &[&str]) -> (EntryStore, FilterEngine) {
        let mut store = EntryStore::new();
        let mut engine = FilterEngine::new();
        for m in messages {
            store.append(entry(m), &mut engine);
        }
        (store, engine)
    }

    fn visible_messages(engine: &FilterEngine, store: &EntryStore) -> Vec<String> {
        engine
            .visible_entries(store)
            .map(|e| e.message.clone())
            .collect()
    }

    #[test]
    fn test_regex_filter() {
        let filter = CompiledFilter::new(&FilterSpec::regex("err(or)?")).unwrap();
        assert!(filter.matches(&entry("an error occurred")));
        assert!(!filter.matches(&entry("everything is fine")));
    }

    #[test]
    fn test_substring_is_literal() {
        let filter = CompiledFilter::new(&FilterSpec::substring("a.b")).unwrap();
        assert!(filter.matches(&entry("x a.b y")));
        assert!(!filter.matches(&entry("axb")));
    }

    #[test]
    fn test_find_matches() {
        let filter = CompiledFilter::new(&FilterSpec::substring("error")).unwrap();
        let matches = filter.find_matches("an error occurred, another ERROR here");
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        let (store, mut engine) = populated(&[LOREM, ANOTHER]);
        assert_eq!(engine.visible_count(), 2);

        let status = engine.set_spec(FilterSpec::regex(""), &store);
        assert!(matches!(status, FilterStatus::Applied { visible: 2 }));
    }

    #[test]
    fn test_case_sensitivity_toggle() {
        let (store, mut engine) = populated(&[LOREM, ANOTHER]);

        engine.set_spec(FilterSpec::substring("ipsum"), &store);
        assert_eq!(visible_messages(&engine, &store), [LOREM]);

        engine.set_spec(FilterSpec::substring("Ipsum"), &store);
        assert_eq!(engine.visible_count(), 1);

        engine.set_spec(FilterSpec::substring("Ipsum").case_sensitive(true), &store);
        assert_eq!(engine.visible_count(), 0);

        engine.set_spec(FilterSpec::substring("ipsum").case_sensitive(true), &store);
        assert_eq!(engine.visible_count(), 1);

        engine.set_spec(FilterSpec::substring("Ipsum"), &store);
        assert_eq!(engine.visible_count(), 1);
    }

    #[test]
    fn test_regex_mode_toggle() {
        let (store, mut engine) = populated(&[LOREM, ANOTHER]);

        engine.set_spec(FilterSpec::regex(".*"), &store);
        assert_eq!(engine.visible_count(), 2);

        engine.set_spec(FilterSpec::regex(".*amet"), &store);
        assert_eq!(engine.visible_count(), 1);

        // Same text as a literal matches nothing
        engine.set_spec(FilterSpec::substring(".*amet"), &store);
        assert_eq!(engine.visible_count(), 0);
    }

    #[test]
    fn test_invalid_regex_keeps_previous_view() {
        let (mut store, mut engine) = populated(&[LOREM, ANOTHER]);
        engine.set_spec(FilterSpec::substring("Another"), &store);
        let before = engine.visible_indices().to_vec();

        let status = engine.set_spec(FilterSpec::regex("("), &store);
        assert!(!status.is_valid());
        assert!(!engine.is_valid());
        assert_eq!(engine.last_error().map(|e| e.pattern()), Some("("));
        assert_eq!(engine.visible_indices(), before.as_slice());
        assert_eq!(engine.current_spec(), &FilterSpec::substring("Another"));

        // The previous matcher keeps filtering new rows
        store.append(entry("Another one"), &mut engine);
        store.append(entry("unrelated"), &mut engine);
        assert_eq!(engine.visible_count(), 2);

        engine.set_spec(FilterSpec::regex("^Lorem"), &store);
        assert!(engine.is_valid());
        assert_eq!(engine.visible_count(), 1);
    }

    #[test]
    fn test_eviction_drops_and_shifts_rows() {
        let mut store = EntryStore::with_max_entries(Some(3));
        let mut engine = FilterEngine::new();
        engine.set_spec(FilterSpec::substring("keep"), &store);

        for m in ["keep 0", "skip 1", "keep 2", "keep 3", "skip 4"] {
            store.append(entry(m), &mut engine);
        }

        assert_eq!(visible_messages(&engine, &store), ["keep 2", "keep 3"]);
        assert_eq!(engine.visible_indices(), [0, 1]);

        store.set_max_entries(Some(1), &mut engine);
        assert_eq!(engine.visible_count(), 0);
    }

    #[test]
    fn test_reset_clears_view() {
        let (mut store, mut engine) = populated(&[LOREM, ANOTHER]);
        store.clear(&mut engine);
        assert_eq!(engine.visible_count(), 0);
        assert!(engine.visible(0, &store).is_err());
    }

    #[test]
    fn test_visible_out_of_range() {
        let (store, engine) = populated(&[LOREM]);
        assert_eq!(engine.visible(0, &store).unwrap().message, LOREM);
        assert_eq!(
            engine.visible(1, &store).unwrap_err(),
            StoreError::OutOfRange { index: 1, len: 1 }
        );
    }

    proptest! {
        #[test]
        fn prop_filter_is_ordered_subsequence(
            words in proptest::collection::vec("[a-c]{1,3}", 0..64),
            cap in 1usize..16,
            needle in "[a-c]",
        ) {
            let mut store = EntryStore::with_max_entries(Some(cap));
            let mut engine = FilterEngine::new();
            engine.set_spec(FilterSpec::substring(needle.clone()), &store);
            for w in &words {
                store.append(entry(w), &mut engine);
            }

            let expected: Vec<String> = store
                .iter()
                .filter(|e| e.message.contains(needle.as_str()))
                .map(|e| e.message.clone())
                .collect();
            prop_assert_eq!(visible_messages(&engine, &store), expected);
            prop_assert!(engine.visible_indices().windows(2).all(|w| w[0] < w[1]));
        }
    }
}
