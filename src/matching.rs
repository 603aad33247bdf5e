//! Matching semantics and criteria → catalog query translation
//!
//! The same predicate is used by the in-memory catalog and re-applied by the
//! orchestrator to every accepted response, so results are identical whether
//! the remote catalog filters server-side or returns a whole snapshot.

use crate::model::{FilterCriteria, MerchantFilter, PerkRecord};
use serde::Serialize;

/// Parameters sent to the catalog. Empty name and `ANY` merchant are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
}

impl CatalogQuery {
    pub fn from_criteria(criteria: &FilterCriteria) -> Self {
        Self {
            name: (!criteria.name_query.is_empty()).then(|| criteria.name_query.clone()),
            merchant: criteria.merchant.as_id().map(str::to_string),
        }
    }

    /// Back to criteria, for catalogs that filter locally
    pub fn to_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            name_query: self.name.clone().unwrap_or_default(),
            merchant: self
                .merchant
                .clone()
                .map(MerchantFilter::Id)
                .unwrap_or_default(),
        }
    }
}

/// A merchant identifier that could never match a real merchant
pub fn is_invalid_merchant_id(id: &str) -> bool {
    id.trim().is_empty() || id.chars().any(char::is_control)
}

/// Case-insensitive substring match on the title; empty query matches everything
pub fn name_matches(name_query: &str, record: &PerkRecord) -> bool {
    if name_query.is_empty() {
        return true;
    }
    record
        .title
        .to_lowercase()
        .contains(&name_query.to_lowercase())
}

/// Exact merchant identifier match; `Any` matches everything, invalid ids match nothing
pub fn merchant_matches(merchant: &MerchantFilter, record: &PerkRecord) -> bool {
    match merchant {
        MerchantFilter::Any => true,
        MerchantFilter::Id(id) if is_invalid_merchant_id(id) => false,
        MerchantFilter::Id(id) => record.merchant == *id,
    }
}

pub fn matches(criteria: &FilterCriteria, record: &PerkRecord) -> bool {
    name_matches(&criteria.name_query, record) && merchant_matches(&criteria.merchant, record)
}

/// Keep matching records in catalog order
pub fn apply_filter(criteria: &FilterCriteria, records: Vec<PerkRecord>) -> Vec<PerkRecord> {
    records
        .into_iter()
        .filter(|record| matches(criteria, record))
        .collect()
}

/// Distinct merchant identifiers in the order the catalog first lists them.
/// Invalid ids are left out since selecting one could never match.
pub fn merchant_options(records: &[PerkRecord]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for record in records {
        if is_invalid_merchant_id(&record.merchant) || options.contains(&record.merchant) {
            continue;
        }
        options.push(record.merchant.clone());
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coffee_records() -> Vec<PerkRecord> {
        vec![
            PerkRecord::new("Coffee Pass", "cafeA"),
            PerkRecord::new("coffee mug", "cafeB"),
        ]
    }

    #[test]
    fn test_name_match_is_case_insensitive() {
        let criteria = FilterCriteria::new("COFFEE", MerchantFilter::Any);
        let result = apply_filter(&criteria, coffee_records());
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_merchant_and_name_combine() {
        let criteria = FilterCriteria::new("coffee", MerchantFilter::from_selection("cafeA"));
        let result = apply_filter(&criteria, coffee_records());
        assert_eq!(result, vec![PerkRecord::new("Coffee Pass", "cafeA")]);
    }

    #[test]
    fn test_merchant_match_is_exact() {
        let criteria = FilterCriteria::new("", MerchantFilter::Id("cafe".to_string()));
        assert!(apply_filter(&criteria, coffee_records()).is_empty());

        let criteria = FilterCriteria::new("", MerchantFilter::Id("CAFEA".to_string()));
        assert!(apply_filter(&criteria, coffee_records()).is_empty());
    }

    #[test]
    fn test_invalid_merchant_matches_nothing() {
        let blank = PerkRecord::new("Blank merchant perk", "   ");
        let criteria = FilterCriteria::new("", MerchantFilter::Id("   ".to_string()));
        assert!(!matches(&criteria, &blank));

        let criteria = FilterCriteria::new("", MerchantFilter::Id("cafe\u{7}A".to_string()));
        assert!(apply_filter(&criteria, coffee_records()).is_empty());
    }

    #[test]
    fn test_filter_preserves_catalog_order() {
        let records = vec![
            PerkRecord::new("Zebra coffee", "z"),
            PerkRecord::new("Apple", "a"),
            PerkRecord::new("coffee beans", "c"),
        ];
        let criteria = FilterCriteria::new("coffee", MerchantFilter::Any);
        let titles: Vec<_> = apply_filter(&criteria, records)
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Zebra coffee", "coffee beans"]);
    }

    #[test]
    fn test_query_translation_omits_unfiltered_parts() {
        let query = CatalogQuery::from_criteria(&FilterCriteria::default());
        assert_eq!(query, CatalogQuery::default());

        let criteria = FilterCriteria::new("mug", MerchantFilter::Id("cafeB".to_string()));
        let query = CatalogQuery::from_criteria(&criteria);
        assert_eq!(query.name.as_deref(), Some("mug"));
        assert_eq!(query.merchant.as_deref(), Some("cafeB"));
        assert_eq!(query.to_criteria(), criteria);
    }

    #[test]
    fn test_merchant_options_are_distinct_in_catalog_order() {
        let records = vec![
            PerkRecord::new("Gym Day", "gymX"),
            PerkRecord::new("Coffee Pass", "cafeA"),
            PerkRecord::new("Bakery Box", "cafeA"),
            PerkRecord::new("Nameless", " "),
            PerkRecord::new("coffee mug", "cafeB"),
        ];
        assert_eq!(merchant_options(&records), vec!["gymX", "cafeA", "cafeB"]);
        assert!(merchant_options(&[]).is_empty());
    }
}
