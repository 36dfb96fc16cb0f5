use serde::{Deserialize, Serialize};

use crate::model::ProfileRecord;

/// Thresholds a profile must stay within to be kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub max_followers: u64,
    pub max_friends: u64,
    /// Profiles whose display name contains this are dropped. Empty excludes nothing.
    pub excluded_name_substring: String,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            max_followers: 1000,
            max_friends: 1000,
            excluded_name_substring: "男".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Filter {
    criteria: FilterCriteria,
}

impl Filter {
    pub fn new(criteria: FilterCriteria) -> Self {
        Self { criteria }
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn passes(&self, record: &ProfileRecord) -> bool {
        let excluded = &self.criteria.excluded_name_substring;

        record.followers_count <= self.criteria.max_followers
            && record.friends_count <= self.criteria.max_friends
            && (excluded.is_empty() || !record.name.contains(excluded.as_str()))
    }

    /// Keep the passing records, in input order.
    pub fn select_all(&self, records: impl IntoIterator<Item = ProfileRecord>) -> Vec<ProfileRecord> {
        records
            .into_iter()
            .filter(|record| self.passes(record))
            .collect()
    }
}
