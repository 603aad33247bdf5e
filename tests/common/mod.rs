#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use perk_filter::matching::{apply_filter, CatalogQuery};
use perk_filter::{Catalog, PerkRecord};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn seeded_records() -> Vec<PerkRecord> {
    vec![
        PerkRecord::new("Coffee Pass", "cafeA"),
        PerkRecord::new("coffee mug", "cafeB"),
        PerkRecord::new("Gym Day Pass", "gymX"),
        PerkRecord::new("Cinema Ticket", "cinemaZ"),
    ]
}

/// How the next call should behave
#[derive(Debug, Clone)]
pub enum Step {
    Respond { delay: Duration },
    Fail { delay: Duration },
}

/// Catalog fixture that filters locally, records every query and follows a
/// script of delays and failures (then answers immediately)
#[derive(Clone)]
pub struct ScriptedCatalog {
    records: Vec<PerkRecord>,
    script: Arc<Mutex<VecDeque<Step>>>,
    calls: Arc<Mutex<Vec<CatalogQuery>>>,
}

impl ScriptedCatalog {
    pub fn new(records: Vec<PerkRecord>) -> Self {
        Self {
            records,
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn then(self, step: Step) -> Self {
        self.script.lock().unwrap().push_back(step);
        self
    }

    pub fn calls(&self) -> Vec<CatalogQuery> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Catalog for ScriptedCatalog {
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<PerkRecord>> {
        self.calls.lock().unwrap().push(query.clone());
        let step = self.script.lock().unwrap().pop_front();

        match step {
            Some(Step::Respond { delay }) => tokio::time::sleep(delay).await,
            Some(Step::Fail { delay }) => {
                tokio::time::sleep(delay).await;
                return Err(anyhow!("catalog unavailable"));
            }
            None => {}
        }
        Ok(apply_filter(&query.to_criteria(), self.records.clone()))
    }

    fn describe(&self) -> String {
        "scripted catalog".to_string()
    }
}

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}
