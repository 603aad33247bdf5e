use crate::matching::{apply_filter, CatalogQuery};
use crate::model::{CommittedCriteria, DisplayState, PerkRecord, QueryResult};
use tracing::{debug, info, warn};

/// A request the caller must send to the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDispatch {
    pub request_seq: u64,
    pub criteria: CommittedCriteria,
    pub query: CatalogQuery,
}

impl QueryDispatch {
    /// Pair this request with the catalog's records
    pub fn into_result(self, records: Vec<PerkRecord>) -> QueryResult {
        QueryResult {
            criteria: self.criteria,
            records,
            request_seq: self.request_seq,
        }
    }
}

/// What happened to an arriving response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultDisposition {
    /// Applied to the display state
    Accepted,
    /// Older than the last accepted result, or a failure of a superseded
    /// request; dropped without touching the display state
    Stale,
    /// The latest request failed; last good records kept, error flag raised
    Failed,
}

/// Turns committed criteria into catalog requests and keeps the display state
/// in line with the newest response, whatever order responses arrive in.
///
/// Staleness is decided purely by request sequence numbers: in-flight network
/// calls are never cancelled, their late results are just ignored.
#[derive(Debug, Default)]
pub struct QueryOrchestrator {
    /// Sequence number of the most recent dispatch (0 before the first)
    latest_dispatched: u64,
    /// Sequence number of the last accepted result (0 before the first)
    last_accepted: u64,
    state: DisplayState,
}

impl QueryOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display_state(&self) -> &DisplayState {
        &self.state
    }

    /// Assign the next sequence number and mark the display as loading
    pub fn dispatch(&mut self, criteria: CommittedCriteria) -> QueryDispatch {
        self.latest_dispatched += 1;
        self.state.is_loading = true;

        let query = CatalogQuery::from_criteria(criteria.criteria());
        info!(target: "query", "Dispatching request #{} for {}", self.latest_dispatched, criteria);

        QueryDispatch {
            request_seq: self.latest_dispatched,
            criteria,
            query,
        }
    }

    /// Apply a successful catalog response unless a newer one was already accepted
    pub fn on_result(&mut self, result: QueryResult) -> ResultDisposition {
        let seq = result.request_seq;
        if self.is_unknown(seq) || seq < self.last_accepted {
            debug!(
                target: "query",
                "Discarding stale result #{} (last accepted #{})",
                seq,
                self.last_accepted
            );
            return ResultDisposition::Stale;
        }

        self.last_accepted = seq;
        let criteria = result.criteria;
        let visible = apply_filter(criteria.criteria(), result.records);
        info!(
            target: "query",
            "Accepted result #{}: {} matching perks for {}",
            seq,
            visible.len(),
            criteria
        );

        self.state.visible_records = visible;
        self.state.last_applied_criteria = Some(criteria);
        self.state.has_error = false;
        self.state.is_loading = false;
        ResultDisposition::Accepted
    }

    /// Record a transport failure. Only the latest request can raise the error
    /// flag; failures of superseded requests are as stale as their results.
    pub fn on_failure(&mut self, request_seq: u64, error: &anyhow::Error) -> ResultDisposition {
        if self.is_unknown(request_seq) || request_seq < self.latest_dispatched {
            debug!(
                target: "query",
                "Ignoring failure of superseded request #{}: {:#}",
                request_seq,
                error
            );
            return ResultDisposition::Stale;
        }

        warn!(target: "query", "Request #{} failed: {:#}", request_seq, error);
        self.state.has_error = true;
        self.state.is_loading = false;
        ResultDisposition::Failed
    }

    /// Route a catalog outcome for `dispatch` to the right handler
    pub fn complete(
        &mut self,
        dispatch: QueryDispatch,
        outcome: anyhow::Result<Vec<PerkRecord>>,
    ) -> ResultDisposition {
        match outcome {
            Ok(records) => self.on_result(dispatch.into_result(records)),
            Err(e) => self.on_failure(dispatch.request_seq, &e),
        }
    }

    /// Sequence numbers this orchestrator never handed out
    fn is_unknown(&self, request_seq: u64) -> bool {
        let unknown = request_seq == 0 || request_seq > self.latest_dispatched;
        if unknown {
            warn!(target: "query", "Result for unknown request #{}", request_seq);
        }
        unknown
    }
}
