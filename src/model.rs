//! Core data types shared by the criteria store, the orchestrator and the catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selection value the merchant dropdown uses for "no merchant filter"
pub const ANY_MERCHANT: &str = "ANY";

/// A single catalog entry as returned by the perks endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerkRecord {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    /// Merchant identifier (not the display name)
    pub merchant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PerkRecord {
    pub fn new(title: impl Into<String>, merchant: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            merchant: merchant.into(),
            description: None,
        }
    }
}

/// Merchant part of the filter
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum MerchantFilter {
    #[default]
    Any,
    Id(String),
}

impl MerchantFilter {
    /// Map a dropdown selection to a filter. Only the exact `"ANY"` sentinel means no filter.
    pub fn from_selection(selection: &str) -> Self {
        if selection == ANY_MERCHANT {
            MerchantFilter::Any
        } else {
            MerchantFilter::Id(selection.to_string())
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, MerchantFilter::Any)
    }

    pub fn as_id(&self) -> Option<&str> {
        match self {
            MerchantFilter::Any => None,
            MerchantFilter::Id(id) => Some(id),
        }
    }
}

impl fmt::Display for MerchantFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MerchantFilter::Any => write!(f, "{}", ANY_MERCHANT),
            MerchantFilter::Id(id) => write!(f, "{}", id),
        }
    }
}

/// What the user has currently typed/selected
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterCriteria {
    pub name_query: String,
    pub merchant: MerchantFilter,
}

impl FilterCriteria {
    pub fn new(name_query: impl Into<String>, merchant: MerchantFilter) -> Self {
        Self {
            name_query: name_query.into(),
            merchant,
        }
    }

    /// True for the "no filtering" criteria
    pub fn is_unfiltered(&self) -> bool {
        self.name_query.is_empty() && self.merchant.is_any()
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name='{}' merchant={}", self.name_query, self.merchant)
    }
}

/// Criteria that survived the debounce window and are sent to the catalog.
///
/// Only the criteria store creates these, so holding one means the value has
/// been stabilised.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommittedCriteria(FilterCriteria);

impl CommittedCriteria {
    pub(crate) fn commit(criteria: FilterCriteria) -> Self {
        Self(criteria)
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.0
    }

    pub fn name_query(&self) -> &str {
        &self.0.name_query
    }

    pub fn merchant(&self) -> &MerchantFilter {
        &self.0.merchant
    }
}

impl fmt::Display for CommittedCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A catalog response tagged with the sequence number of the request that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub criteria: CommittedCriteria,
    pub records: Vec<PerkRecord>,
    pub request_seq: u64,
}

/// The externally observable output of the engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayState {
    pub visible_records: Vec<PerkRecord>,
    pub is_loading: bool,
    /// Set when the latest request failed; cleared by the next accepted result
    pub has_error: bool,
    pub last_applied_criteria: Option<CommittedCriteria>,
}

impl DisplayState {
    /// Always derived from the visible records
    pub fn match_count(&self) -> usize {
        self.visible_records.len()
    }

    /// Summary line shown above the results
    pub fn summary(&self) -> String {
        let count = self.match_count();
        let noun = if count == 1 { "perk" } else { "perks" };
        format!("Showing {} {}", count, noun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merchant_selection_sentinel_is_exact() {
        assert_eq!(MerchantFilter::from_selection("ANY"), MerchantFilter::Any);
        assert_eq!(
            MerchantFilter::from_selection("any"),
            MerchantFilter::Id("any".to_string())
        );
        assert_eq!(
            MerchantFilter::from_selection("cafeA").as_id(),
            Some("cafeA")
        );
    }

    #[test]
    fn test_default_criteria_is_unfiltered() {
        let criteria = FilterCriteria::default();
        assert!(criteria.is_unfiltered());
        assert_eq!(criteria.to_string(), "name='' merchant=ANY");
    }

    #[test]
    fn test_perk_record_accepts_mongo_style_id() {
        let json = r#"{"_id":"abc123","title":"Coffee Pass","merchant":"cafeA","extra":1}"#;
        let record: PerkRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_deref(), Some("abc123"));
        assert_eq!(record.title, "Coffee Pass");
        assert_eq!(record.description, None);
    }

    #[test]
    fn test_summary_pluralisation() {
        let mut state = DisplayState::default();
        assert_eq!(state.summary(), "Showing 0 perks");
        state.visible_records.push(PerkRecord::new("Coffee Pass", "cafeA"));
        assert_eq!(state.summary(), "Showing 1 perk");
        assert_eq!(state.match_count(), 1);
    }
}
