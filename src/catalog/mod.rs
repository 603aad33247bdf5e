//! Catalog boundary
//!
//! The engine only knows the [`Catalog`] trait. [`HttpCatalog`] talks to the
//! remote perks endpoint; [`StaticCatalog`] serves an in-memory fixture and is
//! what tests and offline runs inject.

mod http;

pub use http::HttpCatalog;

use crate::matching::{apply_filter, merchant_options, CatalogQuery};
use crate::model::PerkRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Abstracts where perk records come from.
///
/// An error means the query could not complete; an empty Vec means it
/// completed with zero matches. Implementations must keep record order.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<PerkRecord>>;

    /// Merchant ids a user can pick from, taken from the unfiltered catalog
    async fn merchants(&self) -> Result<Vec<String>> {
        let records = self.query(&CatalogQuery::default()).await?;
        Ok(merchant_options(&records))
    }

    /// Short description for logs and the shell banner
    fn describe(&self) -> String;
}

#[async_trait]
impl<C: Catalog + ?Sized> Catalog for Arc<C> {
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<PerkRecord>> {
        (**self).query(query).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[async_trait]
impl<C: Catalog + ?Sized> Catalog for Box<C> {
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<PerkRecord>> {
        (**self).query(query).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Catalog payloads come either as a bare array or wrapped in `{ "perks": [...] }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PerksPayload {
    Bare(Vec<PerkRecord>),
    Wrapped { perks: Vec<PerkRecord> },
}

impl PerksPayload {
    pub(crate) fn into_records(self) -> Vec<PerkRecord> {
        match self {
            PerksPayload::Bare(records) => records,
            PerksPayload::Wrapped { perks } => perks,
        }
    }
}

/// In-memory catalog that filters locally with the shared matching rules
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    records: Vec<PerkRecord>,
}

impl StaticCatalog {
    pub fn new(records: Vec<PerkRecord>) -> Self {
        Self { records }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let payload: PerksPayload =
            serde_json::from_str(json).context("Failed to parse perks fixture")?;
        Ok(Self::new(payload.into_records()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture {}", path.display()))?;
        Self::from_json(&contents)
    }

    pub fn records(&self) -> &[PerkRecord] {
        &self.records
    }
}

#[async_trait]
impl Catalog for StaticCatalog {
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<PerkRecord>> {
        Ok(apply_filter(&query.to_criteria(), self.records.clone()))
    }

    fn describe(&self) -> String {
        format!("in-memory fixture ({} perks)", self.records.len())
    }
}
