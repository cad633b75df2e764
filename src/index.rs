//! Identifier-to-endpoint lookup cache.
//!
//! Indexes endpoints by every `"<prefix>:<value>"` key their identifier map
//! produces, plus their numeric ID, so that a request arriving with any
//! external identifier (CNI attachment ID, pod name, IP, ...) resolves to
//! the same [`Endpoint`].
//!
//! ## Shared Keys
//!
//! Attachment-scoped keys (CNI attachment ID, Docker endpoint, IPs) belong
//! to exactly one endpoint; a second claimant is an `IdentifierConflict`.
//! Pod-scoped keys (container ID, container name, pod name, and the CEP name
//! while it is the bare pod name under legacy identifiers) are legitimately
//! shared by every attachment of one pod: the most recent `upsert` owns the
//! key, and when its owner is removed the key passes to another endpoint
//! still claiming it.
//!
//! Namespaced values with an empty name part (`"/"`, `"ns/"`) describe no
//! pod at all and are never indexed.
//!
//! ## Consistency
//!
//! Both maps live under one `RwLock`. `upsert` computes the endpoint's
//! identifiers *before* taking the index lock, so the endpoint lock is never
//! held while the index lock is acquired.

use crate::constants::{MAX_INDEXED_ENDPOINTS, NAMESPACE_SEPARATOR};
use crate::endpoint::Endpoint;
use crate::error::{Error, Result};
use crate::id::{IdentifierPrefix, ParsedId, new_id, parse_id};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

#[derive(Debug, Default)]
struct IndexState {
    by_key: HashMap<String, Arc<Endpoint>>,
    /// Endpoint ID → (endpoint, keys registered for it).
    by_id: HashMap<u16, (Arc<Endpoint>, Vec<String>)>,
}

impl IndexState {
    /// Drops `keys` owned by endpoint `id`, handing each to another
    /// endpoint that still claims it. `id` must already be out of `by_id`.
    fn release_keys(&mut self, id: u16, keys: Vec<String>) {
        for key in keys {
            if self.by_key.get(&key).is_some_and(|owner| owner.id() != id) {
                continue;
            }
            let heir = self
                .by_id
                .values()
                .find(|(_, claimed)| claimed.contains(&key))
                .map(|(ep, _)| Arc::clone(ep));
            match heir {
                Some(ep) => {
                    self.by_key.insert(key, ep);
                }
                None => {
                    self.by_key.remove(&key);
                }
            }
        }
    }
}

/// Whether a key may be owned by several endpoints at once.
///
/// Under legacy identifiers the CEP name is the bare pod name, shared by all
/// attachments; otherwise it carries the interface name and is unique.
fn is_shared(prefix: IdentifierPrefix, legacy: bool) -> bool {
    prefix.is_legacy() || (legacy && prefix == IdentifierPrefix::CepName)
}

/// Namespaced values with no name after the separator identify nothing.
fn is_indexable(prefix: IdentifierPrefix, value: &str) -> bool {
    match prefix {
        IdentifierPrefix::PodName | IdentifierPrefix::CepName => value
            .split_once(NAMESPACE_SEPARATOR)
            .is_none_or(|(_, name)| !name.is_empty()),
        _ => true,
    }
}

/// Lookup cache of endpoints by identifier.
///
/// ## Thread Safety
///
/// `Send + Sync`; internal state is protected by an `RwLock`.
#[derive(Debug, Default)]
pub struct EndpointIndex {
    inner: RwLock<IndexState>,
}

impl EndpointIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or refreshes an endpoint's keys.
    ///
    /// Keys the endpoint no longer produces are dropped.
    ///
    /// # Errors
    ///
    /// - `EndpointNotAlive` if the endpoint is deleted
    /// - `IdentifierConflict` if an attachment-scoped key belongs to another
    ///   endpoint (the index is left unchanged)
    /// - `ResourceExhausted` when `MAX_INDEXED_ENDPOINTS` is reached
    pub fn upsert(&self, endpoint: Arc<Endpoint>) -> Result<()> {
        let id = endpoint.id();
        let legacy = !endpoint.fields().disable_legacy_identifiers;
        let entries: Vec<(IdentifierPrefix, String)> = endpoint
            .identifiers()?
            .into_iter()
            .filter(|(prefix, value)| is_indexable(*prefix, value))
            .map(|(prefix, value)| (prefix, new_id(prefix, &value)))
            .collect();

        let mut inner = self
            .inner
            .write()
            .map_err(|e| Error::Internal(format!("lock poisoned: {}", e)))?;

        if !inner.by_id.contains_key(&id) && inner.by_id.len() >= MAX_INDEXED_ENDPOINTS {
            return Err(Error::ResourceExhausted(format!(
                "maximum indexed endpoint limit reached ({})",
                MAX_INDEXED_ENDPOINTS
            )));
        }

        for (prefix, key) in &entries {
            if is_shared(*prefix, legacy) {
                continue;
            }
            if let Some(owner) = inner.by_key.get(key).filter(|owner| owner.id() != id) {
                return Err(Error::IdentifierConflict {
                    key: key.clone(),
                    owner: owner.id(),
                    id,
                });
            }
        }

        let keys: Vec<String> = entries.into_iter().map(|(_, key)| key).collect();

        if let Some((_, stale)) = inner.by_id.remove(&id) {
            let stale: Vec<String> = stale.into_iter().filter(|k| !keys.contains(k)).collect();
            inner.release_keys(id, stale);
        }

        for key in &keys {
            inner.by_key.insert(key.clone(), Arc::clone(&endpoint));
        }
        debug!("indexed endpoint {} under {} keys", id, keys.len());
        inner.by_id.insert(id, (endpoint, keys));

        Ok(())
    }

    /// Removes an endpoint and all of its keys.
    ///
    /// Shared keys it owned pass to another endpoint still claiming them.
    /// Returns the removed endpoint, if it was indexed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Internal` if the index lock is poisoned.
    pub fn remove(&self, id: u16) -> Result<Option<Arc<Endpoint>>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| Error::Internal(format!("lock poisoned: {}", e)))?;

        let Some((endpoint, keys)) = inner.by_id.remove(&id) else {
            return Ok(None);
        };
        inner.release_keys(id, keys);
        info!("removed endpoint {} from index", endpoint.human_string());

        Ok(Some(endpoint))
    }

    /// Looks up an endpoint by lookup key or bare numeric ID.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidIdentifier` if `key` cannot be parsed.
    pub fn lookup(&self, key: &str) -> Result<Option<Arc<Endpoint>>> {
        match parse_id(key)? {
            ParsedId::Prefixed(prefix, value) => self.lookup_by(prefix, &value),
            ParsedId::Local(id) => self.lookup_id(id),
        }
    }

    /// Looks up an endpoint by identifier namespace and value.
    ///
    /// # Errors
    ///
    /// Returns `Error::Internal` if the index lock is poisoned.
    pub fn lookup_by(&self, prefix: IdentifierPrefix, value: &str) -> Result<Option<Arc<Endpoint>>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| Error::Internal(format!("lock poisoned: {}", e)))?;
        Ok(inner.by_key.get(&new_id(prefix, value)).cloned())
    }

    /// Looks up an endpoint by numeric ID.
    ///
    /// # Errors
    ///
    /// Returns `Error::Internal` if the index lock is poisoned.
    pub fn lookup_id(&self, id: u16) -> Result<Option<Arc<Endpoint>>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| Error::Internal(format!("lock poisoned: {}", e)))?;
        Ok(inner.by_id.get(&id).map(|(ep, _)| Arc::clone(ep)))
    }

    /// Number of indexed endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
