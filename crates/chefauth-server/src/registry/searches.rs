//! Saved search records

use chefauth_core::{ChefSearch, Result};
use serde::Deserialize;

use super::{secs, Record};

/// Fields of a saved search write; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPatch {
    pub search_query: Option<String>,
    #[serde(default, deserialize_with = "crate::registry::duration_field")]
    pub allowed_staleness: Option<u64>,
    pub policies: Option<Vec<String>>,
}

impl Record for ChefSearch {
    const PREFIX: &'static str = "search/";
    const KIND: &'static str = "search";
    type Patch = SearchPatch;

    fn name(&self) -> &str {
        &self.name
    }

    fn create(name: &str, patch: SearchPatch) -> Result<Self> {
        ChefSearch::new(name, String::new()).update(patch)
    }

    fn update(mut self, patch: SearchPatch) -> Result<Self> {
        if let Some(query) = patch.search_query {
            self.search_query = query;
        }
        if let Some(staleness) = secs(patch.allowed_staleness) {
            self.allowed_staleness = staleness;
        }
        if let Some(policies) = patch.policies {
            self.policies = policies;
        }
        self.validate()
    }
}
