use tracing::trace;

use logpane_types::AutoScrollPolicy;

use crate::store::StoreEvent;

/// Scroll position as seen by the presentation layer
pub trait Viewport {
    /// Whether the view currently shows the newest of `visible_rows` rows
    fn is_at_bottom(&self, visible_rows: usize) -> bool;
}

/// A viewport that always reports it is following the tail
#[derive(Debug, Default, Clone, Copy)]
pub struct PinnedToBottom;

impl Viewport for PinnedToBottom {
    fn is_at_bottom(&self, _visible_rows: usize) -> bool {
        true
    }
}

/// Decides, per insertion, whether the view should jump to the newest entry.
///
/// The "at bottom" sample is taken on the pre-insertion notification, before
/// the new row grows the scrollable extent.
#[derive(Debug, Default)]
pub struct AutoScrollController {
    policy: AutoScrollPolicy,
    was_at_bottom_before_insert: bool,
}

impl AutoScrollController {
    pub fn new(policy: AutoScrollPolicy) -> Self {
        Self {
            policy,
            was_at_bottom_before_insert: false,
        }
    }

    pub fn policy(&self) -> AutoScrollPolicy {
        self.policy
    }

    /// Takes effect on the next insertion; never scrolls by itself
    pub fn set_policy(&mut self, policy: AutoScrollPolicy) {
        self.policy = policy;
        self.was_at_bottom_before_insert = false;
    }

    /// Feed a store event. Returns true when a "scroll to newest" directive is due.
    pub fn on_store_event(
        &mut self,
        event: StoreEvent,
        viewport: &dyn Viewport,
        visible_rows: usize,
    ) -> bool {
        match (event, self.policy) {
            (StoreEvent::AboutToInsert { .. }, AutoScrollPolicy::ScrollIfAtBottom) => {
                self.was_at_bottom_before_insert = viewport.is_at_bottom(visible_rows);
                trace!(at_bottom = self.was_at_bottom_before_insert, "sampled scroll position");
                false
            }
            (StoreEvent::Inserted { .. }, AutoScrollPolicy::AlwaysScroll) => true,
            (StoreEvent::Inserted { .. }, AutoScrollPolicy::ScrollIfAtBottom) => {
                std::mem::take(&mut self.was_at_bottom_before_insert)
            }
            _ => false,
        }
    }
}
