//! Endpoint record types.
//!
//! This module splits the endpoint record by mutability:
//! - `EndpointFields`: set once at construction, read without locking
//! - `EndpointMutableState`: fields mutated after creation, only reachable
//!   through the endpoint lock
//! - `EndpointState`: liveness of the record
//! - `CiliumEndpointUid`: correlation token of the paired resource object

use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};

// =============================================================================
// Immutable Fields
// =============================================================================

/// Identity fields that never change after the endpoint is built.
///
/// Owned by the [`crate::Endpoint`] and only handed out by shared reference,
/// so reading them needs no synchronization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointFields {
    /// Runtime container ID.
    pub container_id: String,
    /// Interface name inside the container network namespace.
    pub container_if_name: String,
    /// Human container name.
    pub container_name: String,
    /// Docker libnetwork endpoint ID.
    pub docker_endpoint_id: String,
    /// Kubernetes namespace of the owning pod.
    pub k8s_namespace: String,
    /// Kubernetes pod name.
    pub k8s_pod_name: String,
    /// Suppresses container-ID, container-name and pod-name identifiers.
    pub disable_legacy_identifiers: bool,
}

// =============================================================================
// Mutable State
// =============================================================================

/// Fields mutated after creation, guarded by the endpoint lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointMutableState {
    /// Allocated IPv4 address (`None` until allocation).
    pub ipv4: Option<Ipv4Addr>,
    /// Allocated IPv6 address (`None` until allocation).
    pub ipv6: Option<Ipv6Addr>,
    /// UID of the paired CiliumEndpoint object, once observed.
    pub cilium_endpoint_uid: Option<CiliumEndpointUid>,
}

// =============================================================================
// CiliumEndpoint UID
// =============================================================================

/// Opaque UID of the CiliumEndpoint resource paired with an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CiliumEndpointUid(String);

impl CiliumEndpointUid {
    /// Wraps a UID string.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self(uid.into())
    }

    /// Returns the UID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the UID is empty (unset).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for CiliumEndpointUid {
    fn from(uid: &str) -> Self {
        Self::new(uid)
    }
}

impl From<String> for CiliumEndpointUid {
    fn from(uid: String) -> Self {
        Self(uid)
    }
}

impl std::fmt::Display for CiliumEndpointUid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Endpoint Liveness
// =============================================================================

/// Liveness of an endpoint record.
///
/// ```text
///   Alive ──▶ Deleted
/// ```
///
/// `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
#[repr(u8)]
pub enum EndpointState {
    /// Endpoint is usable.
    #[default]
    Alive = 0,
    /// Endpoint has been torn down.
    Deleted = 1,
}

impl EndpointState {
    /// Whether liveness-gated accessors may proceed.
    #[must_use]
    pub const fn is_alive(self) -> bool {
        matches!(self, EndpointState::Alive)
    }

    pub(crate) const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => EndpointState::Alive,
            _ => EndpointState::Deleted,
        }
    }
}

impl std::fmt::Display for EndpointState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndpointState::Alive => write!(f, "Alive"),
            EndpointState::Deleted => write!(f, "Deleted"),
        }
    }
}
