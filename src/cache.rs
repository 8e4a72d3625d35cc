//! A read-through cache for expense API responses.
//!
//! Responses are keyed by `(resource namespace, parameters)` and expire after
//! a short TTL. Mutations call [ResponseCache::invalidate] on the resource
//! namespace, which both drops the cached entries and bumps a generation
//! counter: a fetch that was already in flight when the invalidation happened
//! carries the old generation and its result is discarded instead of
//! overwriting newer state.
//!
//! The cache is a plain value handed to the handlers through their state
//! structs, so tests can construct and inspect their own instance.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::Error;

/// How long a cached response may be served before it must be re-fetched.
const DEFAULT_TTL: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct Entry {
    value: serde_json::Value,
    stored_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<(String, String), Entry>,
    generation: u64,
}

/// A TTL cache of API responses keyed by `(resource, parameters)`.
///
/// Cloning shares the underlying storage.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    inner: Arc<Mutex<Inner>>,
    ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl ResponseCache {
    /// Create a cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            ttl,
        }
    }

    /// The generation to tag an outgoing fetch with.
    ///
    /// Capture this before issuing the request and pass it to [Self::put];
    /// if an invalidation happens in between, the store is refused.
    pub fn begin_request(&self) -> Result<u64, Error> {
        let inner = self.inner.lock().map_err(|_| Error::CacheLock)?;

        Ok(inner.generation)
    }

    /// Look up a fresh cached response.
    ///
    /// Returns `None` on a miss or when the entry has outlived the TTL.
    pub fn get<T: DeserializeOwned>(&self, resource: &str, params: &str) -> Result<Option<T>, Error> {
        let inner = self.inner.lock().map_err(|_| Error::CacheLock)?;

        let Some(entry) = inner.entries.get(&(resource.to_owned(), params.to_owned())) else {
            return Ok(None);
        };

        if entry.stored_at.elapsed() > self.ttl {
            return Ok(None);
        }

        Ok(serde_json::from_value(entry.value.clone()).ok())
    }

    /// Store a response fetched under `generation`.
    ///
    /// Returns `true` when the value was stored, `false` when the generation
    /// is stale (the namespace was invalidated after the fetch began) and the
    /// value was discarded.
    pub fn put<T: Serialize>(
        &self,
        generation: u64,
        resource: &str,
        params: &str,
        value: &T,
    ) -> Result<bool, Error> {
        let mut inner = self.inner.lock().map_err(|_| Error::CacheLock)?;

        if generation != inner.generation {
            tracing::debug!(
                "discarding stale response for {resource}?{params} \
                (generation {generation}, current {})",
                inner.generation
            );
            return Ok(false);
        }

        let value = serde_json::to_value(value)
            .map_err(|error| Error::InvalidResponse(error.to_string()))?;

        inner.entries.insert(
            (resource.to_owned(), params.to_owned()),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );

        Ok(true)
    }

    /// Drop every cached response under `resource` and bump the generation so
    /// in-flight fetches for the namespace cannot repopulate it with stale
    /// data.
    pub fn invalidate(&self, resource: &str) -> Result<(), Error> {
        let mut inner = self.inner.lock().map_err(|_| Error::CacheLock)?;

        inner.entries.retain(|(entry_resource, _), _| entry_resource != resource);
        inner.generation += 1;

        Ok(())
    }
}
