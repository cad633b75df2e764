//! # Endpoint Record and Accessor Surface
//!
//! An [`Endpoint`] is one network attachment of a workload. It carries the
//! identifiers that external systems know it by (container runtime, Docker,
//! CNI, Kubernetes, IPAM) and derives from them the canonical identifier map
//! other subsystems use to find it.
//!
//! ```text
//!   caller ──▶ Endpoint accessor ──▶ EndpointLock (acquire)
//!                                        │
//!                                        ▼
//!                              resolver (pure derivation)
//!                                        │
//!   caller ◀──────── value ◀──── EndpointLock (release)
//! ```
//!
//! ## Field Ownership
//!
//! - [`EndpointFields`] are fixed at construction and read without locking.
//! - [`EndpointMutableState`] (IP addresses, CiliumEndpoint UID) is only
//!   reachable through the [`EndpointLock`] guards.
//!
//! ## Locked Accessors
//!
//! `identifiers_locked()` takes the guarded state by reference. Holding a
//! guard is the only way to obtain that reference, so callers that already
//! hold the lock pass it along instead of re-acquiring.

mod lock;
mod state;

pub use lock::{EndpointLock, EndpointReadGuard, EndpointWriteGuard};
pub use state::{CiliumEndpointUid, EndpointFields, EndpointMutableState, EndpointState};

use crate::error::Result;
use crate::id::Identifiers;
use crate::resolver;
use std::net::{Ipv4Addr, Ipv6Addr};
use tracing::{debug, info};

/// A network endpoint and its identity.
///
/// ## Thread Safety
///
/// `Endpoint` is `Send + Sync`. Share it behind an `Arc`; all mutation goes
/// through the internal [`EndpointLock`].
#[derive(Debug)]
pub struct Endpoint {
    id: u16,
    fields: EndpointFields,
    lock: EndpointLock,
}

impl Endpoint {
    /// Creates an alive endpoint from its immutable fields.
    #[must_use]
    pub fn new(id: u16, fields: EndpointFields) -> Self {
        Self::with_state(id, fields, EndpointMutableState::default())
    }

    /// Creates an alive endpoint with initial mutable state.
    #[must_use]
    pub fn with_state(id: u16, fields: EndpointFields, state: EndpointMutableState) -> Self {
        Self {
            id,
            fields,
            lock: EndpointLock::new(id, state),
        }
    }

    /// Starts a builder for an endpoint with the given numeric ID.
    #[must_use]
    pub fn builder(id: u16) -> EndpointBuilder {
        EndpointBuilder::new(id)
    }

    // =========================================================================
    // Guard Access
    // =========================================================================

    /// The endpoint's lock, for callers composing several locked reads.
    #[must_use]
    pub fn lock(&self) -> &EndpointLock {
        &self.lock
    }

    /// Immutable identity fields.
    #[must_use]
    pub fn fields(&self) -> &EndpointFields {
        &self.fields
    }

    /// Current liveness.
    #[must_use]
    pub fn state(&self) -> EndpointState {
        self.lock.liveness()
    }

    /// Transitions the endpoint to `Deleted`.
    ///
    /// Waits for in-flight lock holders. Returns `false` if it was already
    /// deleted.
    pub fn mark_deleted(&self) -> bool {
        let changed = self.lock.mark_deleted();
        if changed {
            info!("endpoint {} marked deleted", self.human_string());
        }
        changed
    }

    // =========================================================================
    // Numeric ID
    // =========================================================================

    /// Numeric endpoint ID, unique per node.
    #[must_use]
    pub fn id(&self) -> u16 {
        self.id
    }

    /// Numeric endpoint ID as a string.
    #[must_use]
    pub fn string_id(&self) -> String {
        self.id.to_string()
    }

    // =========================================================================
    // Kubernetes Identity
    // =========================================================================

    /// Pod name, empty if the endpoint is not a pod.
    #[must_use]
    pub fn k8s_pod_name(&self) -> &str {
        &self.fields.k8s_pod_name
    }

    /// Pod namespace, empty if the endpoint is not a pod.
    #[must_use]
    pub fn k8s_namespace(&self) -> &str {
        &self.fields.k8s_namespace
    }

    /// `namespace/pod`.
    #[must_use]
    pub fn k8s_namespace_and_pod_name(&self) -> String {
        resolver::namespaced_pod_name(&self.fields)
    }

    /// CiliumEndpoint resource name, without namespace.
    #[must_use]
    pub fn k8s_cep_name(&self) -> String {
        resolver::cep_name(&self.fields)
    }

    /// `namespace/cep-name`.
    #[must_use]
    pub fn k8s_namespace_and_cep_name(&self) -> String {
        resolver::namespaced_cep_name(&self.fields)
    }

    /// Most human readable identifier, for logs.
    ///
    /// The namespaced CEP name, falling back to the numeric ID when it is
    /// empty. Endpoints without a pod therefore log as `"<namespace>/"`.
    #[must_use]
    pub fn human_string(&self) -> String {
        let cep = self.k8s_namespace_and_cep_name();
        if cep.is_empty() { self.string_id() } else { cep }
    }

    // =========================================================================
    // Container Identity
    // =========================================================================

    /// Human container name.
    #[must_use]
    pub fn container_name(&self) -> String {
        // shared acquisition keeps ordering with in-flight writers
        let _guard = self.lock.read();
        self.fields.container_name.clone()
    }

    /// Runtime container ID.
    #[must_use]
    pub fn container_id(&self) -> String {
        let _guard = self.lock.read();
        self.fields.container_id.clone()
    }

    /// Container ID truncated to its abbreviated form.
    #[must_use]
    pub fn short_container_id(&self) -> String {
        let _guard = self.lock.read();
        resolver::short_container_id(&self.fields)
    }

    /// Unique CNI attachment ID.
    #[must_use]
    pub fn cni_attachment_id(&self) -> String {
        let _guard = self.lock.read();
        resolver::cni_attachment_id(&self.fields)
    }

    /// Docker libnetwork endpoint ID.
    #[must_use]
    pub fn docker_endpoint_id(&self) -> &str {
        &self.fields.docker_endpoint_id
    }

    // =========================================================================
    // Aggregate Identifiers
    // =========================================================================

    /// Identifier map computed from state the caller has already locked.
    ///
    /// `state` must come from this endpoint's own guard.
    #[must_use]
    pub fn identifiers_locked(&self, state: &EndpointMutableState) -> Identifiers {
        resolver::identifiers(&self.fields, state)
    }

    /// Identifier map, or `EndpointNotAlive` if the endpoint is deleted.
    ///
    /// # Errors
    ///
    /// Returns `Error::EndpointNotAlive` without blocking when the endpoint
    /// has been deleted.
    pub fn identifiers(&self) -> Result<Identifiers> {
        let guard = self.lock.read_if_alive()?;
        Ok(self.identifiers_locked(&guard))
    }

    // =========================================================================
    // Mutable State
    // =========================================================================

    /// UID of the paired CiliumEndpoint object, if observed yet.
    #[must_use]
    pub fn cilium_endpoint_uid(&self) -> Option<CiliumEndpointUid> {
        self.lock.read().cilium_endpoint_uid.clone()
    }

    /// Records the UID of the paired CiliumEndpoint object.
    ///
    /// An empty UID clears it.
    pub fn set_cilium_endpoint_uid(&self, uid: impl Into<CiliumEndpointUid>) {
        let uid = uid.into();
        let uid = (!uid.is_empty()).then_some(uid);
        debug!(
            "endpoint {}: CiliumEndpoint UID set to {:?}",
            self.id,
            uid.as_ref().map(CiliumEndpointUid::as_str)
        );
        self.lock.write().cilium_endpoint_uid = uid;
    }

    /// Allocated IPv4 address.
    #[must_use]
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        self.lock.read().ipv4
    }

    /// Allocated IPv6 address.
    #[must_use]
    pub fn ipv6(&self) -> Option<Ipv6Addr> {
        self.lock.read().ipv6
    }

    /// Records (or releases, with `None`) the IPv4 allocation.
    pub fn set_ipv4(&self, addr: Option<Ipv4Addr>) {
        debug!("endpoint {}: IPv4 set to {:?}", self.id, addr);
        self.lock.write().ipv4 = addr;
    }

    /// Records (or releases, with `None`) the IPv6 allocation.
    pub fn set_ipv6(&self, addr: Option<Ipv6Addr>) {
        debug!("endpoint {}: IPv6 set to {:?}", self.id, addr);
        self.lock.write().ipv6 = addr;
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.human_string())
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Programmatic construction of an [`Endpoint`].
///
/// Performs no validation; use [`crate::EndpointSpec`] for untrusted input.
#[derive(Debug, Clone, Default)]
pub struct EndpointBuilder {
    id: u16,
    fields: EndpointFields,
    state: EndpointMutableState,
}

impl EndpointBuilder {
    /// Starts a builder with the given numeric ID and empty fields.
    #[must_use]
    pub fn new(id: u16) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Sets the runtime container ID.
    #[must_use]
    pub fn container_id(mut self, value: impl Into<String>) -> Self {
        self.fields.container_id = value.into();
        self
    }

    /// Sets the interface name inside the container.
    #[must_use]
    pub fn container_if_name(mut self, value: impl Into<String>) -> Self {
        self.fields.container_if_name = value.into();
        self
    }

    /// Sets the human container name.
    #[must_use]
    pub fn container_name(mut self, value: impl Into<String>) -> Self {
        self.fields.container_name = value.into();
        self
    }

    /// Sets the Docker libnetwork endpoint ID.
    #[must_use]
    pub fn docker_endpoint_id(mut self, value: impl Into<String>) -> Self {
        self.fields.docker_endpoint_id = value.into();
        self
    }

    /// Sets the Kubernetes namespace.
    #[must_use]
    pub fn k8s_namespace(mut self, value: impl Into<String>) -> Self {
        self.fields.k8s_namespace = value.into();
        self
    }

    /// Sets the Kubernetes pod name.
    #[must_use]
    pub fn k8s_pod_name(mut self, value: impl Into<String>) -> Self {
        self.fields.k8s_pod_name = value.into();
        self
    }

    /// Opts the endpoint out of legacy identifiers.
    #[must_use]
    pub fn disable_legacy_identifiers(mut self, disable: bool) -> Self {
        self.fields.disable_legacy_identifiers = disable;
        self
    }

    /// Sets the initial IPv4 allocation.
    #[must_use]
    pub fn ipv4(mut self, addr: Ipv4Addr) -> Self {
        self.state.ipv4 = Some(addr);
        self
    }

    /// Sets the initial IPv6 allocation.
    #[must_use]
    pub fn ipv6(mut self, addr: Ipv6Addr) -> Self {
        self.state.ipv6 = Some(addr);
        self
    }

    /// Builds an alive endpoint.
    #[must_use]
    pub fn build(self) -> Endpoint {
        Endpoint::with_state(self.id, self.fields, self.state)
    }
}
