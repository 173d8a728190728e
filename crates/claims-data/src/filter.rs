//! Date-range and categorical filtering over the Registered subset.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use claims_core::models::{Category, ClaimRecord, FILTER_CATEGORIES};

/// Filter selections for the filtered dashboard view.
///
/// `Default` is the identity filter: no date bounds, no selections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// Keep records intimated on or after this date.
    pub date_from: Option<NaiveDate>,
    /// Keep records intimated on or before this date (the bound covers
    /// through end of day).
    pub date_to: Option<NaiveDate>,
    /// Selected values per category; an absent or empty entry places no
    /// restriction on that category.
    pub selections: BTreeMap<Category, Vec<String>>,
}

impl FilterState {
    /// True when applying this filter cannot exclude any record.
    pub fn is_empty(&self) -> bool {
        self.date_from.is_none()
            && self.date_to.is_none()
            && self.selections.values().all(|values| values.is_empty())
    }

    /// Add selected values for one category.
    pub fn select(&mut self, category: Category, values: impl IntoIterator<Item = String>) {
        self.selections.entry(category).or_default().extend(values);
    }

    /// Apply the filter, producing a fresh subset. The input is never
    /// mutated; re-filtering always starts from the full subset.
    pub fn apply(&self, records: &[ClaimRecord]) -> Vec<ClaimRecord> {
        records
            .iter()
            .filter(|record| self.matches(record))
            .cloned()
            .collect()
    }

    fn matches(&self, record: &ClaimRecord) -> bool {
        match record.intimation_date {
            Some(date) => {
                if let Some(from) = self.date_from {
                    if date < from {
                        return false;
                    }
                }
                if let Some(to) = self.date_to {
                    if date > to {
                        return false;
                    }
                }
            }
            // An unknown intimation date fails whenever any bound is set.
            None => {
                if self.date_from.is_some() || self.date_to.is_some() {
                    return false;
                }
            }
        }

        for (&category, selected) in &self.selections {
            if selected.is_empty() {
                continue;
            }
            let value = category.value_of(record).unwrap_or_default();
            if !selected.iter().any(|candidate| *candidate == value) {
                return false;
            }
        }
        true
    }
}

/// Distinct, sorted, non-empty values per filterable category, computed over
/// the Registered subset. Feeds the filter control collaborator.
pub fn filter_options(records: &[ClaimRecord]) -> Vec<(Category, Vec<String>)> {
    FILTER_CATEGORIES
        .into_iter()
        .map(|category| {
            let mut values: Vec<String> = records
                .iter()
                .filter_map(|record| category.value_of(record))
                .filter(|value| !value.is_empty())
                .collect();
            values.sort();
            values.dedup();
            (category, values)
        })
        .collect()
}
