//! View-thread facade tying the store to its derived state
//!
//! [`LogView`] owns the entry store together with everything that must move in
//! step with it: the filtered view, the style overrides, the auto-scroll
//! controller and the receiving end of the ingest queue. Presentation code
//! talks to it through [`Control`] commands and reads back [`ViewEvent`]s.

use tracing::{debug, info, warn};

use logpane_types::{AutoScrollPolicy, Color, FilterSpec, FontStyle, LogEntry, StyleEdit, StyleKind};

use crate::error::{HistoryError, StoreError, StyleError};
use crate::filter::{FilterEngine, FilterStatus};
use crate::history::FilterHistory;
use crate::ingest::{AttachmentId, EntryReceiver, LogSink};
use crate::scroll::{AutoScrollController, PinnedToBottom, Viewport};
use crate::store::{ArcLogEntry, EntryStore, LevelCounts, StoreEvent, StoreObserver};
use crate::style::{StyleChange, StyleRegistry};

/// Notifications for the presentation layer, in emission order
#[derive(Debug, Clone)]
pub enum ViewEvent {
    /// Store mutation, store row indices
    Rows(StoreEvent),
    /// Every row of `logger_name` needs repainting for this attribute
    StyleChanged { kind: StyleKind, logger_name: String },
    /// Jump to the newest visible entry
    ScrollToNewest,
    /// Filter change outcome
    FilterChanged(FilterStatus),
    /// Policy changed, toolbars should reflect it
    AutoScrollPolicyChanged(AutoScrollPolicy),
}

impl From<StyleChange> for ViewEvent {
    fn from(change: StyleChange) -> Self {
        Self::StyleChanged {
            kind: change.kind,
            logger_name: change.logger_name,
        }
    }
}

/// User-driven control events, each mapped to a single operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    /// Filter text, regex mode or case sensitivity changed
    FilterChanged(FilterSpec),
    /// Filter text was committed (editing finished)
    FilterCommitted(String),
    /// Policy selector moved to this index
    AutoScrollPolicyIndex(usize),
    /// Style editor accepted
    StyleEditCommitted(StyleEdit),
    ClearHistory,
    ClearEntries,
}

/// What the core needs from any toolbar implementation
pub trait Toolbar {
    /// Current filter inputs
    fn filter_spec(&self) -> FilterSpec;

    /// Reflect a policy chosen elsewhere without emitting a change back
    fn show_auto_scroll_policy(&mut self, policy: AutoScrollPolicy);
}

/// Fans store events out to the derived state. Borrows fields disjointly so
/// the store itself can stay mutably borrowed while it notifies.
struct Dispatch<'a> {
    filter: &'a mut FilterEngine,
    scroll: &'a mut AutoScrollController,
    viewport: &'a dyn Viewport,
    outbox: &'a mut Vec<ViewEvent>,
}

impl StoreObserver for Dispatch<'_> {
    fn on_store_event(&mut self, store: &EntryStore, event: StoreEvent) {
        self.filter.on_store_event(store, event);
        self.outbox.push(ViewEvent::Rows(event));

        if self
            .scroll
            .on_store_event(event, self.viewport, self.filter.visible_count())
        {
            self.outbox.push(ViewEvent::ScrollToNewest);
        }
    }
}

/// Single-owner log view state. Lives on the view thread.
pub struct LogView {
    store: EntryStore,
    filter: FilterEngine,
    styles: StyleRegistry,
    scroll: AutoScrollController,
    ingest: Option<(LogSink, AttachmentId, EntryReceiver)>,
    outbox: Vec<ViewEvent>,
}

impl Default for LogView {
    fn default() -> Self {
        Self::new(None, AutoScrollPolicy::default())
    }
}

impl LogView {
    pub fn new(max_entries: Option<usize>, policy: AutoScrollPolicy) -> Self {
        Self {
            store: EntryStore::with_max_entries(max_entries),
            filter: FilterEngine::new(),
            styles: StyleRegistry::new(),
            scroll: AutoScrollController::new(policy),
            ingest: None,
            outbox: Vec::new(),
        }
    }

    fn dispatch<'a>(
        filter: &'a mut FilterEngine,
        scroll: &'a mut AutoScrollController,
        viewport: &'a dyn Viewport,
        outbox: &'a mut Vec<ViewEvent>,
    ) -> Dispatch<'a> {
        Dispatch {
            filter,
            scroll,
            viewport,
            outbox,
        }
    }

    // ------------------------------------------------------------------
    // Entries
    // ------------------------------------------------------------------

    /// Append on the view thread. `viewport` is sampled for smart scrolling.
    pub fn append(&mut self, entry: LogEntry, viewport: &dyn Viewport) -> u64 {
        let mut dispatch =
            Self::dispatch(&mut self.filter, &mut self.scroll, viewport, &mut self.outbox);
        self.store.append(entry, &mut dispatch)
    }

    pub fn set_max_entries(&mut self, max_entries: Option<usize>) {
        let mut dispatch = Self::dispatch(
            &mut self.filter,
            &mut self.scroll,
            &PinnedToBottom,
            &mut self.outbox,
        );
        self.store.set_max_entries(max_entries, &mut dispatch);
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.store.max_entries()
    }

    pub fn clear(&mut self) {
        let mut dispatch = Self::dispatch(
            &mut self.filter,
            &mut self.scroll,
            &PinnedToBottom,
            &mut self.outbox,
        );
        self.store.clear(&mut dispatch);
    }

    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn at(&self, index: usize) -> Result<&ArcLogEntry, StoreError> {
        self.store.at(index)
    }

    pub fn level_counts(&self) -> LevelCounts {
        self.store.level_counts()
    }

    pub fn store(&self) -> &EntryStore {
        &self.store
    }

    // ------------------------------------------------------------------
    // Filtering
    // ------------------------------------------------------------------

    /// Apply a new filter. Rejected patterns keep the current view.
    pub fn set_filter(&mut self, spec: FilterSpec) -> FilterStatus {
        let status = self.filter.set_spec(spec, &self.store);
        self.outbox.push(ViewEvent::FilterChanged(status.clone()));
        status
    }

    pub fn current_filter_spec(&self) -> &FilterSpec {
        self.filter.current_spec()
    }

    pub fn filter(&self) -> &FilterEngine {
        &self.filter
    }

    pub fn visible_count(&self) -> usize {
        self.filter.visible_count()
    }

    /// Visible entry at `index`, in arrival order
    pub fn visible(&self, index: usize) -> Result<&ArcLogEntry, StoreError> {
        self.filter.visible(index, &self.store)
    }

    pub fn visible_entries(&self) -> impl Iterator<Item = &ArcLogEntry> {
        self.filter.visible_entries(&self.store)
    }

    /// Pull the filter inputs from a toolbar
    pub fn apply_toolbar_filter(&mut self, toolbar: &dyn Toolbar) -> FilterStatus {
        self.set_filter(toolbar.filter_spec())
    }

    // ------------------------------------------------------------------
    // Styles
    // ------------------------------------------------------------------

    pub fn set_background(&mut self, logger_name: &str, color: Option<Color>) {
        if let Some(change) = self.styles.set_background(logger_name, color) {
            self.outbox.push(change.into());
        }
    }

    pub fn set_foreground(&mut self, logger_name: &str, color: Option<Color>) {
        if let Some(change) = self.styles.set_foreground(logger_name, color) {
            self.outbox.push(change.into());
        }
    }

    pub fn set_font(&mut self, logger_name: &str, font: Option<FontStyle>) {
        if let Some(change) = self.styles.set_font(logger_name, font) {
            self.outbox.push(change.into());
        }
    }

    /// Apply a style editor commit; `bold = false` removes the font override
    pub fn apply_style_edit(&mut self, edit: &StyleEdit) -> Result<(), StyleError> {
        if edit.logger_name.is_empty() {
            return Err(StyleError::EmptyLoggerName);
        }

        self.set_background(&edit.logger_name, edit.background);
        self.set_foreground(&edit.logger_name, edit.foreground);
        self.set_font(&edit.logger_name, edit.bold.then_some(FontStyle::BOLD));
        Ok(())
    }

    pub fn styles(&self) -> &StyleRegistry {
        &self.styles
    }

    // ------------------------------------------------------------------
    // Auto-scroll
    // ------------------------------------------------------------------

    pub fn set_auto_scroll_policy(&mut self, policy: AutoScrollPolicy) {
        if self.scroll.policy() == policy {
            return;
        }
        info!("auto-scroll policy: {}", policy.label());
        self.scroll.set_policy(policy);
        self.outbox.push(ViewEvent::AutoScrollPolicyChanged(policy));
    }

    pub fn auto_scroll_policy(&self) -> AutoScrollPolicy {
        self.scroll.policy()
    }

    /// Push the current policy to a toolbar
    pub fn sync_toolbar(&self, toolbar: &mut dyn Toolbar) {
        toolbar.show_auto_scroll_policy(self.scroll.policy());
    }

    // ------------------------------------------------------------------
    // Ingest
    // ------------------------------------------------------------------

    /// Start receiving entries from `sink`, replacing any previous one
    pub fn attach_sink(&mut self, sink: &LogSink) {
        self.detach_sink();
        let (id, rx) = sink.open();
        self.ingest = Some((sink.clone(), id, rx));
    }

    /// Stop receiving; later records are dropped by the sink. Leaves the
    /// sink alone if another view has attached it since.
    pub fn detach_sink(&mut self) {
        if let Some((sink, id, mut rx)) = self.ingest.take() {
            sink.release(id);
            rx.close();
        }
    }

    /// Drain queued entries in FIFO order. Returns how many were appended.
    pub fn pump(&mut self, viewport: &dyn Viewport) -> usize {
        let Some((_, _, rx)) = self.ingest.as_mut() else {
            return 0;
        };

        let mut dispatch =
            Self::dispatch(&mut self.filter, &mut self.scroll, viewport, &mut self.outbox);
        let mut appended = 0;
        while let Ok(entry) = rx.try_recv() {
            self.store.append(entry, &mut dispatch);
            appended += 1;
        }

        if appended > 0 {
            debug!(appended, total = self.store.count(), "pumped entries");
        }
        appended
    }

    // ------------------------------------------------------------------
    // Events and controls
    // ------------------------------------------------------------------

    /// Take every pending notification
    pub fn drain_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Map one control event onto its operation
    pub fn handle(
        &mut self,
        control: Control,
        history: &mut FilterHistory,
    ) -> Result<(), HistoryError> {
        match control {
            Control::FilterChanged(spec) => {
                self.set_filter(spec);
            }
            Control::FilterCommitted(text) => {
                history.record(&text)?;
            }
            Control::AutoScrollPolicyIndex(index) => match AutoScrollPolicy::from_index(index) {
                Some(policy) => self.set_auto_scroll_policy(policy),
                None => warn!(index, "ignoring unknown auto-scroll policy index"),
            },
            Control::StyleEditCommitted(edit) => {
                if let Err(err) = self.apply_style_edit(&edit) {
                    warn!("ignoring style edit: {err}");
                }
            }
            Control::ClearHistory => history.clear()?,
            Control::ClearEntries => self.clear(),
        }
        Ok(())
    }
}

impl Drop for LogView {
    fn drop(&mut self) {
        self.detach_sink();
    }
}
