//! Filter criteria store
//!
//! Holds what the user has typed and selected. Mutations are visible at once
//! through [`FilterCriteriaStore::criteria`] for input echo, but only reach the
//! catalog once the debounce window passes without another mutation.

use crate::model::{CommittedCriteria, FilterCriteria, MerchantFilter};
use crate::utils::debouncer::Debouncer;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Shortest debounce window the page is known to use
pub const MIN_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct FilterCriteriaStore {
    criteria: FilterCriteria,
    debouncer: Debouncer,
}

impl FilterCriteriaStore {
    pub fn new(debounce: Duration) -> Self {
        Self {
            criteria: FilterCriteria::default(),
            debouncer: Debouncer::new(debounce),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debouncer.delay()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_name_query(&mut self, text: impl Into<String>, now: Instant) {
        self.criteria.name_query = text.into();
        trace!(target: "criteria", "name query -> '{}'", self.criteria.name_query);
        self.debouncer.trigger(now);
    }

    /// `id` is the dropdown value; `"ANY"` clears the merchant filter
    pub fn set_merchant(&mut self, id: &str, now: Instant) {
        self.criteria.merchant = MerchantFilter::from_selection(id);
        trace!(target: "criteria", "merchant -> {}", self.criteria.merchant);
        self.debouncer.trigger(now);
    }

    /// Back to the unfiltered criteria, still debounced
    pub fn clear(&mut self, now: Instant) {
        self.criteria = FilterCriteria::default();
        self.debouncer.trigger(now);
    }

    /// Emit the committed criteria if the window has elapsed since the last mutation.
    ///
    /// Intermediate states are never seen here: only the value current at the
    /// moment the window closes is committed.
    pub fn poll(&mut self, now: Instant) -> Option<CommittedCriteria> {
        if self.debouncer.should_execute(now) {
            debug!(target: "criteria", "committing {}", self.criteria);
            Some(CommittedCriteria::commit(self.criteria.clone()))
        } else {
            None
        }
    }

    /// Commit the current criteria immediately, dropping any pending window.
    /// Used for the initial load and explicit refreshes.
    pub fn commit_now(&mut self) -> CommittedCriteria {
        self.debouncer.reset();
        debug!(target: "criteria", "committing {} (immediate)", self.criteria);
        CommittedCriteria::commit(self.criteria.clone())
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Time left before the pending edit commits, for a "typing…" indicator
    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.debouncer.time_remaining(now)
    }
}

impl Default for FilterCriteriaStore {
    fn default() -> Self {
        Self::new(MIN_DEBOUNCE)
    }
}
