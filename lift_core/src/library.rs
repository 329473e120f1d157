//! Exercise library access.
//!
//! [`ExerciseApi`] is the interface the exercise browser talks to. The
//! built-in [`CatalogExerciseApi`] serves the static catalog; any remote
//! implementation can be wrapped in [`CachedExerciseApi`], which keeps
//! results for a fixed time-to-live.

use crate::clock::Clock;
use crate::config::LibraryConfig;
use crate::{Catalog, Error, Exercise, Result};
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard};

/// Filters for listing exercises; `None` matches everything
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ExerciseFilters {
    pub body_part: Option<String>,
    pub target_muscle: Option<String>,
    pub equipment: Option<String>,
    pub offset: usize,
    pub limit: usize,
}

/// One page of results
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub offset: usize,
    pub limit: usize,
    pub total: usize,
}

impl<T> Page<T> {
    /// Offset of the following page, if there is one
    pub fn next_offset(&self) -> Option<usize> {
        let next = self.offset + self.items.len();
        (next < self.total && !self.items.is_empty()).then_some(next)
    }
}

/// Source of exercise data
pub trait ExerciseApi {
    fn list_exercises(&self, filters: &ExerciseFilters) -> Result<Page<Exercise>>;
    fn get_exercise(&self, id: &str) -> Result<Exercise>;
    fn search_exercises(&self, query: &str, offset: usize, limit: usize) -> Result<Page<Exercise>>;
    fn list_muscles(&self) -> Result<Vec<String>>;
    fn list_equipment(&self) -> Result<Vec<String>>;
}

fn paginate(matches: Vec<&Exercise>, offset: usize, limit: usize) -> Page<Exercise> {
    let total = matches.len();
    let items = matches
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();
    Page {
        items,
        offset,
        limit,
        total,
    }
}

fn matches_filter(value: &str, filter: &Option<String>) -> bool {
    filter
        .as_ref()
        .map_or(true, |f| value.eq_ignore_ascii_case(f.trim()))
}

/// [`ExerciseApi`] over an in-process catalog
pub struct CatalogExerciseApi<'a> {
    catalog: &'a Catalog,
}

impl<'a> CatalogExerciseApi<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }
}

impl ExerciseApi for CatalogExerciseApi<'_> {
    fn list_exercises(&self, filters: &ExerciseFilters) -> Result<Page<Exercise>> {
        let matches: Vec<&Exercise> = self
            .catalog
            .sorted_exercises()
            .into_iter()
            .filter(|e| matches_filter(&e.body_part, &filters.body_part))
            .filter(|e| matches_filter(&e.target_muscle, &filters.target_muscle))
            .filter(|e| matches_filter(&e.equipment, &filters.equipment))
            .collect();
        Ok(paginate(matches, filters.offset, filters.limit))
    }

    fn get_exercise(&self, id: &str) -> Result<Exercise> {
        self.catalog
            .exercises
            .get(id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("exercise '{}'", id)))
    }

    fn search_exercises(&self, query: &str, offset: usize, limit: usize) -> Result<Page<Exercise>> {
        let needle = normalize_query(query);
        let matches: Vec<&Exercise> = self
            .catalog
            .sorted_exercises()
            .into_iter()
            .filter(|e| {
                e.name.to_lowercase().contains(&needle)
                    || e.target_muscle.to_lowercase().contains(&needle)
                    || e.equipment.to_lowercase().contains(&needle)
                    || e.body_part.to_lowercase().contains(&needle)
            })
            .collect();
        Ok(paginate(matches, offset, limit))
    }

    fn list_muscles(&self) -> Result<Vec<String>> {
        let muscles: BTreeSet<String> = self
            .catalog
            .exercises
            .values()
            .flat_map(|e| std::iter::once(&e.target_muscle).chain(e.secondary_muscles.iter()))
            .cloned()
            .collect();
        Ok(muscles.into_iter().collect())
    }

    fn list_equipment(&self) -> Result<Vec<String>> {
        let equipment: BTreeSet<String> = self
            .catalog
            .exercises
            .values()
            .map(|e| e.equipment.clone())
            .collect();
        Ok(equipment.into_iter().collect())
    }
}

/// Time-to-live per kind of request
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CacheTtl {
    /// Exercise lists, searches and details
    pub lists: Duration,
    /// Muscle and equipment lists
    pub taxonomies: Duration,
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self {
            lists: Duration::hours(1),
            taxonomies: Duration::hours(24),
        }
    }
}

impl From<&LibraryConfig> for CacheTtl {
    fn from(config: &LibraryConfig) -> Self {
        Self {
            lists: Duration::minutes(config.list_ttl_minutes),
            taxonomies: Duration::hours(config.taxonomy_ttl_hours),
        }
    }
}

struct CacheEntry {
    value: serde_json::Value,
    expires_at: DateTime<Utc>,
}

/// TTL cache in front of another [`ExerciseApi`]
///
/// Errors from the inner API are returned as-is and never cached.
pub struct CachedExerciseApi<A, C> {
    inner: A,
    clock: C,
    ttl: CacheTtl,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl<A: ExerciseApi, C: Clock> CachedExerciseApi<A, C> {
    pub fn new(inner: A, clock: C, ttl: CacheTtl) -> Self {
        Self {
            inner,
            clock,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn cached<T, F>(&self, key: String, ttl: Duration, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&A) -> Result<T>,
    {
        let now = self.clock.now();
        if let Some(entry) = self.entries().get(&key) {
            if entry.expires_at > now {
                match serde_json::from_value(entry.value.clone()) {
                    Ok(value) => {
                        tracing::debug!("Cache hit for '{}'", key);
                        return Ok(value);
                    }
                    Err(e) => tracing::warn!("Dropping unreadable cache entry '{}': {}", key, e),
                }
            }
        }

        let value = fetch(&self.inner)?;
        let entry = CacheEntry {
            value: serde_json::to_value(&value)?,
            expires_at: now + ttl,
        };
        self.entries().insert(key.clone(), entry);
        tracing::debug!("Cached '{}' (expires in {} minutes)", key, ttl.num_minutes());
        Ok(value)
    }

    /// Delete all expired entries, returning how many were removed
    pub fn clear_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        let removed = before - entries.len();
        if removed > 0 {
            tracing::info!("Cleared {} expired cache entries", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl<A: ExerciseApi, C: Clock> ExerciseApi for CachedExerciseApi<A, C> {
    fn list_exercises(&self, filters: &ExerciseFilters) -> Result<Page<Exercise>> {
        let key = format!(
            "list:{}:{}:{}:{}:{}",
            filters.body_part.as_deref().map(normalize_query).unwrap_or_default(),
            filters.target_muscle.as_deref().map(normalize_query).unwrap_or_default(),
            filters.equipment.as_deref().map(normalize_query).unwrap_or_default(),
            filters.offset,
            filters.limit
        );
        self.cached(key, self.ttl.lists, |api| api.list_exercises(filters))
    }

    fn get_exercise(&self, id: &str) -> Result<Exercise> {
        self.cached(format!("exercise:{}", id), self.ttl.lists, |api| {
            api.get_exercise(id)
        })
    }

    fn search_exercises(&self, query: &str, offset: usize, limit: usize) -> Result<Page<Exercise>> {
        let key = format!("search:{}:{}:{}", normalize_query(query), offset, limit);
        self.cached(key, self.ttl.lists, |api| {
            api.search_exercises(query, offset, limit)
        })
    }

    fn list_muscles(&self) -> Result<Vec<String>> {
        self.cached("muscles".into(), self.ttl.taxonomies, |api| api.list_muscles())
    }

    fn list_equipment(&self) -> Result<Vec<String>> {
        self.cached("equipment".into(), self.ttl.taxonomies, |api| {
            api.list_equipment()
        })
    }
}

/// Normalize a query key: lowercase, trim whitespace, collapse multiple spaces.
fn normalize_query(query: &str) -> String {
    query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::clock::ManualClock;
    use chrono::TimeZone;
    use std::cell::Cell;

    /// Counts calls that reach the underlying API
    struct Counting<'a> {
        inner: CatalogExerciseApi<'a>,
        calls: Cell<usize>,
    }

    impl ExerciseApi for Counting<'_> {
        fn list_exercises(&self, filters: &ExerciseFilters) -> Result<Page<Exercise>> {
            self.calls.set(self.calls.get() + 1);
            self.inner.list_exercises(filters)
        }

        fn get_exercise(&self, id: &str) -> Result<Exercise> {
            self.calls.set(self.calls.get() + 1);
            self.inner.get_exercise(id)
        }

        fn search_exercises(&self, query: &str, offset: usize, limit: usize) -> Result<Page<Exercise>> {
            self.calls.set(self.calls.get() + 1);
            self.inner.search_exercises(query, offset, limit)
        }

        fn list_muscles(&self) -> Result<Vec<String>> {
            self.calls.set(self.calls.get() + 1);
            self.inner.list_muscles()
        }

        fn list_equipment(&self) -> Result<Vec<String>> {
            self.calls.set(self.calls.get() + 1);
            self.inner.list_equipment()
        }
    }

    fn cached_api() -> (CachedExerciseApi<Counting<'static>, ManualClock>, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap());
        let api = Counting {
            inner: CatalogExerciseApi::new(get_default_catalog()),
            calls: Cell::new(0),
        };
        (CachedExerciseApi::new(api, clock.clone(), CacheTtl::default()), clock)
    }

    #[test]
    fn test_pagination() {
        let api = CatalogExerciseApi::new(get_default_catalog());
        let filters = ExerciseFilters {
            limit: 5,
            ..Default::default()
        };

        let first = api.list_exercises(&filters).unwrap();
        assert_eq!(first.items.len(), 5);
        assert_eq!(first.total, 18);
        assert_eq!(first.next_offset(), Some(5));

        let last = api
            .list_exercises(&ExerciseFilters {
                offset: 15,
                limit: 5,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(last.items.len(), 3);
        assert_eq!(last.next_offset(), None);
    }

    #[test]
    fn test_filters_are_case_insensitive() {
        let api = CatalogExerciseApi::new(get_default_catalog());
        let page = api
            .list_exercises(&ExerciseFilters {
                equipment: Some("Cable".into()),
                limit: 50,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(page.total, 3);
        assert!(page.items.iter().all(|e| e.equipment == "cable"));
    }

    #[test]
    fn test_search_matches_name_and_muscle() {
        let api = CatalogExerciseApi::new(get_default_catalog());

        let by_name = api.search_exercises("  DEADLIFT ", 0, 10).unwrap();
        assert_eq!(by_name.total, 2);

        let by_muscle = api.search_exercises("hamstrings", 0, 10).unwrap();
        assert!(by_muscle.items.iter().any(|e| e.id == "leg_curl"));
    }

    #[test]
    fn test_get_unknown_exercise() {
        let api = CatalogExerciseApi::new(get_default_catalog());
        assert!(matches!(api.get_exercise("nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_taxonomies_sorted_and_unique() {
        let api = CatalogExerciseApi::new(get_default_catalog());
        let equipment = api.list_equipment().unwrap();
        let mut sorted = equipment.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(equipment, sorted);
        assert!(api.list_muscles().unwrap().contains(&"lats".to_string()));
    }

    #[test]
    fn test_cache_hit_within_ttl() {
        let (api, clock) = cached_api();

        api.search_exercises("press", 0, 10).unwrap();
        clock.advance(Duration::minutes(59));
        api.search_exercises("Press", 0, 10).unwrap();

        assert_eq!(api.inner.calls.get(), 1);
    }

    #[test]
    fn test_list_refetched_after_ttl() {
        let (api, clock) = cached_api();
        let filters = ExerciseFilters {
            limit: 10,
            ..Default::default()
        };

        api.list_exercises(&filters).unwrap();
        clock.advance(Duration::minutes(61));
        api.list_exercises(&filters).unwrap();

        assert_eq!(api.inner.calls.get(), 2);
    }

    #[test]
    fn test_taxonomy_ttl_is_longer() {
        let (api, clock) = cached_api();

        api.list_muscles().unwrap();
        clock.advance(Duration::hours(23));
        api.list_muscles().unwrap();
        assert_eq!(api.inner.calls.get(), 1);

        clock.advance(Duration::hours(2));
        api.list_muscles().unwrap();
        assert_eq!(api.inner.calls.get(), 2);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let (api, _) = cached_api();

        assert!(api.get_exercise("nope").is_err());
        assert!(api.get_exercise("nope").is_err());
        assert_eq!(api.inner.calls.get(), 2);
        assert!(api.is_empty());
    }

    #[test]
    fn test_ttl_from_config() {
        let config = LibraryConfig {
            list_ttl_minutes: 5,
            taxonomy_ttl_hours: 1,
            page_size: 20,
        };
        let ttl = CacheTtl::from(&config);
        assert_eq!(ttl.lists, Duration::minutes(5));
        assert_eq!(ttl.taxonomies, Duration::hours(1));
    }

    #[test]
    fn test_clear_expired() {
        let (api, clock) = cached_api();

        api.get_exercise("bench_press").unwrap();
        api.list_equipment().unwrap();
        clock.advance(Duration::hours(2));

        assert_eq!(api.clear_expired(), 1);
        assert_eq!(api.len(), 1);
    }
}
