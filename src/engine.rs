//! Filter engine actor
//!
//! One tokio task owns the criteria store, the orchestrator and the published
//! display state; every transition happens inside its `select!` loop, so no
//! locks are needed. The presentation side holds a [`FilterEngine`] handle:
//! it sends mutations over a channel and reads state from `watch` receivers.
//!
//! The loop waits on three things:
//! - user commands,
//! - the debounce deadline (a single `sleep_until`, recomputed every turn so a
//!   new keystroke moves it instead of stacking another timer),
//! - catalog completions, reported by the fetch tasks it spawned.

use crate::catalog::Catalog;
use crate::config::EngineConfig;
use crate::criteria_store::{FilterCriteriaStore, MIN_DEBOUNCE};
use crate::model::{CommittedCriteria, DisplayState, FilterCriteria, PerkRecord};
use crate::orchestrator::{QueryDispatch, QueryOrchestrator, ResultDisposition};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub debounce: Duration,
    /// Commit the default criteria as soon as the engine starts
    pub initial_load: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            debounce: MIN_DEBOUNCE,
            initial_load: true,
        }
    }
}

impl From<&EngineConfig> for EngineOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            debounce: config.debounce(),
            initial_load: config.initial_load,
        }
    }
}

#[derive(Debug)]
enum Command {
    SetNameQuery(String),
    SetMerchant(String),
    Clear,
    Refresh,
}

struct Completion {
    dispatch: QueryDispatch,
    outcome: Result<Vec<PerkRecord>>,
}

/// Handle used by the presentation layer
pub struct FilterEngine {
    commands: mpsc::UnboundedSender<Command>,
    display: watch::Receiver<DisplayState>,
    input: watch::Receiver<FilterCriteriaStore>,
    task: JoinHandle<()>,
}

impl FilterEngine {
    /// Start the engine on the current tokio runtime
    pub fn spawn<C>(catalog: C, options: EngineOptions) -> Self
    where
        C: Catalog + 'static,
    {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (display_tx, display) = watch::channel(DisplayState::default());
        let store = FilterCriteriaStore::new(options.debounce);
        let (input_tx, input) = watch::channel(store.clone());
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        info!(
            target: "engine",
            "Starting filter engine on {} (debounce {}ms)",
            catalog.describe(),
            store.debounce().as_millis()
        );

        let actor = EngineActor {
            catalog: Arc::new(catalog),
            store,
            orchestrator: QueryOrchestrator::new(),
            display_tx,
            input_tx,
            completions_tx,
            completions_rx,
        };
        let task = tokio::spawn(actor.run(command_rx, options.initial_load));

        Self {
            commands,
            display,
            input,
            task,
        }
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| anyhow!("Filter engine has stopped"))
    }

    pub fn set_name_query(&self, text: impl Into<String>) -> Result<()> {
        self.send(Command::SetNameQuery(text.into()))
    }

    /// `id` is a merchant identifier or `"ANY"`
    pub fn set_merchant(&self, id: impl Into<String>) -> Result<()> {
        self.send(Command::SetMerchant(id.into()))
    }

    /// Reset both filters (debounced like any other edit)
    pub fn clear(&self) -> Result<()> {
        self.send(Command::Clear)
    }

    /// Re-run the current criteria now, e.g. after a failure
    pub fn refresh(&self) -> Result<()> {
        self.send(Command::Refresh)
    }

    /// Snapshot of the latest display state
    pub fn display_state(&self) -> DisplayState {
        self.display.borrow().clone()
    }

    /// Current (not yet committed) criteria, for input echo
    pub fn criteria(&self) -> FilterCriteria {
        self.input.borrow().criteria().clone()
    }

    /// Time until the pending edit is committed, None when nothing is pending
    pub fn pending_commit(&self) -> Option<Duration> {
        self.input.borrow().time_remaining(now())
    }

    /// A receiver that is notified on every published display state
    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.display.clone()
    }

    /// Wait until the display state satisfies `predicate`
    pub async fn wait_for(
        &self,
        mut predicate: impl FnMut(&DisplayState) -> bool,
    ) -> Result<DisplayState> {
        let mut display = self.display.clone();
        let state = display
            .wait_for(|state| predicate(state))
            .await
            .map_err(|_| anyhow!("Filter engine has stopped"))?;
        Ok(state.clone())
    }

    /// Stop the actor and wait for it to exit. Fetches still in flight are abandoned.
    pub async fn shutdown(self) {
        let FilterEngine { commands, task, .. } = self;
        drop(commands);
        let _ = task.await;
    }
}

struct EngineActor {
    catalog: Arc<dyn Catalog>,
    store: FilterCriteriaStore,
    orchestrator: QueryOrchestrator,
    display_tx: watch::Sender<DisplayState>,
    input_tx: watch::Sender<FilterCriteriaStore>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
}

/// Current time on tokio's clock, so a paused test runtime drives the debounce
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

impl EngineActor {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>, initial_load: bool) {
        if initial_load {
            let committed = self.store.commit_now();
            self.dispatch(committed);
        }

        loop {
            let deadline = self.store.deadline();
            // Evaluated even when disabled, so it needs some instant
            let sleep = tokio::time::sleep_until(
                deadline
                    .map(tokio::time::Instant::from_std)
                    .unwrap_or_else(tokio::time::Instant::now),
            );

            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(completion) = self.completions_rx.recv() => {
                    self.handle_completion(completion);
                }
                _ = sleep, if deadline.is_some() => {
                    if let Some(committed) = self.store.poll(now()) {
                        self.publish_input();
                        self.dispatch(committed);
                    }
                }
            }
        }

        debug!(target: "engine", "Filter engine stopped");
    }

    fn handle_command(&mut self, command: Command) {
        debug!(target: "engine", "{:?}", command);
        match command {
            Command::SetNameQuery(text) => self.store.set_name_query(text, now()),
            Command::SetMerchant(id) => self.store.set_merchant(&id, now()),
            Command::Clear => self.store.clear(now()),
            Command::Refresh => {
                let committed = self.store.commit_now();
                self.dispatch(committed);
            }
        }
        self.publish_input();
    }

    fn dispatch(&mut self, committed: CommittedCriteria) {
        let dispatch = self.orchestrator.dispatch(committed);
        self.publish();

        let catalog = Arc::clone(&self.catalog);
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            let outcome = catalog.query(&dispatch.query).await;
            // The actor may already be gone
            let _ = completions.send(Completion { dispatch, outcome });
        });
    }

    fn handle_completion(&mut self, completion: Completion) {
        let disposition = self
            .orchestrator
            .complete(completion.dispatch, completion.outcome);
        if disposition != ResultDisposition::Stale {
            self.publish();
        }
    }

    fn publish_input(&self) {
        self.input_tx.send_replace(self.store.clone());
    }

    fn publish(&self) {
        self.display_tx
            .send_replace(self.orchestrator.display_state().clone());
    }
}
