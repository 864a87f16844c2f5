//! Saved search membership cache
//!
//! Each cacheable search keeps the set of node names it returned, valid for
//! the search's `allowed_staleness`. Expiry is checked lazily on lookup
//! against tokio's monotonic clock. Two logins missing the same entry at
//! once may both run the query; the later result wins. Entries of searches
//! absent from the set a login evaluated are pruned after that login.

use chefauth_core::{search_membership, storage_key, ChefSearch, Result};
use chefauth_inventory::{InventoryClient, NodeCredentials};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, warn};

#[derive(Debug)]
struct CacheEntry {
    query: String,
    members: Arc<HashSet<String>>,
    expires_at: Instant,
}

/// Searches a node belongs to, and the policies they grant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchMatches {
    /// Policies of every matching search, in search name order
    pub policies: Vec<String>,
    /// Names of the matching searches, sorted
    pub names: Vec<String>,
}

/// Staleness-bounded cache of search results, keyed by search name
#[derive(Debug, Default)]
pub struct SearchCache {
    entries: DashMap<String, CacheEntry>,
}

impl SearchCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate every saved search for a node
    ///
    /// Any failing search fails the whole evaluation.
    pub async fn matching_searches(
        &self,
        inventory: &dyn InventoryClient,
        credentials: &NodeCredentials,
        searches: &[ChefSearch],
    ) -> Result<SearchMatches> {
        let mut ordered: Vec<&ChefSearch> = searches.iter().collect();
        ordered.sort_by(|a, b| a.name.cmp(&b.name));

        let mut matches = SearchMatches::default();
        for search in &ordered {
            let members = self.members(inventory, credentials, search).await?;
            if members.contains(&credentials.node_name) {
                debug!(node_name = %credentials.node_name, search = %search.name, "Node matches saved search");
                matches.policies.extend(search.policies.iter().cloned());
                matches.names.push(search.name.clone());
            }
        }

        let live: HashSet<String> = ordered.iter().map(|s| storage_key(&s.name)).collect();
        self.retain_searches(&live);
        Ok(matches)
    }

    /// Drop entries of searches that no longer exist
    fn retain_searches(&self, live: &HashSet<String>) {
        self.entries.retain(|key, _| {
            let keep = live.contains(key);
            if !keep {
                debug!(search = %key, "Pruned cache entry of removed search");
            }
            keep
        });
    }

    /// Membership of one search, from cache when fresh
    async fn members(
        &self,
        inventory: &dyn InventoryClient,
        credentials: &NodeCredentials,
        search: &ChefSearch,
    ) -> Result<Arc<HashSet<String>>> {
        let key = storage_key(&search.name);

        if search.is_cacheable() {
            if let Some(members) = self.lookup(&key, &search.search_query) {
                debug!(search = %search.name, "Search cache hit");
                return Ok(members);
            }
        }

        let rows = inventory
            .execute_search(credentials, &search.search_query)
            .await?;
        if rows.is_empty() {
            warn!(search = %search.name, query = %search.search_query, "Search returned 0 entries");
        }
        let members = Arc::new(search_membership(&rows)?);

        if search.is_cacheable() {
            match Instant::now().checked_add(search.allowed_staleness) {
                Some(expires_at) => {
                    self.entries.insert(
                        key,
                        CacheEntry {
                            query: search.search_query.clone(),
                            members: members.clone(),
                            expires_at,
                        },
                    );
                }
                None => warn!(search = %search.name, "Staleness out of range, result not cached"),
            }
        }
        Ok(members)
    }

    /// Fresh cached membership for `key`, if any
    ///
    /// An entry computed for a different query counts as a miss.
    fn lookup(&self, key: &str, query: &str) -> Option<Arc<HashSet<String>>> {
        let now = Instant::now();
        {
            let entry = self.entries.get(key)?;
            if entry.query == query && now < entry.expires_at {
                return Some(entry.members.clone());
            }
        }
        self.entries.remove_if(key, |_, entry| now >= entry.expires_at);
        None
    }

    /// Drop the entry of one search
    pub fn invalidate(&self, name: &str) {
        if self.entries.remove(&storage_key(name)).is_some() {
            debug!(search = %name, "Invalidated search cache entry");
        }
    }

    /// Drop every entry, returning how many were removed
    pub fn flush(&self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    /// Number of cached entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
