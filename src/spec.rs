//! Endpoint specification.
//!
//! Declarative input for building an [`Endpoint`], with bounded parsing and
//! validation.
//!
//! # Supported Formats
//!
//! - **YAML**: parsed via `serde_yaml`
//! - **JSON**: parsed via `serde_json`
//!
//! ```yaml
//! id: 1234
//! containerId: 4b1c0d9e2f7a8c3b5d6e
//! containerIfName: eth0
//! k8sNamespace: default
//! k8sPodName: web-1
//! ipv4: 10.0.0.12
//! disableLegacyIdentifiers: true
//! ```

use crate::constants::{
    MAX_CONTAINER_ID_LEN, MAX_DOCKER_ENDPOINT_ID_LEN, MAX_NAME_LEN, MAX_NAMESPACE_LEN,
    MAX_SPEC_SIZE, validate_identifier_field, validate_ifname,
};
use crate::endpoint::{Endpoint, EndpointFields, EndpointMutableState};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};

/// Endpoint specification.
///
/// All string fields default to empty, meaning "not applicable".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EndpointSpec {
    /// Numeric endpoint ID.
    pub id: u16,
    /// Runtime container ID.
    pub container_id: String,
    /// Interface name inside the container.
    pub container_if_name: String,
    /// Human container name.
    pub container_name: String,
    /// Docker libnetwork endpoint ID.
    pub docker_endpoint_id: String,
    /// Kubernetes namespace.
    pub k8s_namespace: String,
    /// Kubernetes pod name.
    pub k8s_pod_name: String,
    /// Allocated IPv4 address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<Ipv4Addr>,
    /// Allocated IPv6 address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv6: Option<Ipv6Addr>,
    /// Suppress legacy identifiers.
    pub disable_legacy_identifiers: bool,
}

impl EndpointSpec {
    /// Parses and validates a spec from YAML bytes.
    ///
    /// # Errors
    ///
    /// - Size exceeds `MAX_SPEC_SIZE`
    /// - YAML parsing fails
    /// - Field validation fails
    pub fn from_yaml(yaml: &[u8]) -> Result<Self> {
        check_size(yaml)?;
        let spec: Self =
            serde_yaml::from_slice(yaml).map_err(|e| Error::InvalidInput(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Parses and validates a spec from JSON bytes.
    ///
    /// # Errors
    ///
    /// Same as [`EndpointSpec::from_yaml`].
    pub fn from_json(json: &[u8]) -> Result<Self> {
        check_size(json)?;
        let spec: Self =
            serde_json::from_slice(json).map_err(|e| Error::InvalidInput(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Validates field lengths and character sets.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("containerId", &self.container_id, MAX_CONTAINER_ID_LEN),
            ("containerName", &self.container_name, MAX_NAME_LEN),
            (
                "dockerEndpointId",
                &self.docker_endpoint_id,
                MAX_DOCKER_ENDPOINT_ID_LEN,
            ),
            ("k8sNamespace", &self.k8s_namespace, MAX_NAMESPACE_LEN),
            ("k8sPodName", &self.k8s_pod_name, MAX_NAME_LEN),
        ];

        for (field, value, max_len) in checks {
            validate_identifier_field(value, max_len)
                .map_err(|reason| invalid_field(field, value, reason))?;
        }

        validate_ifname(&self.container_if_name)
            .map_err(|reason| invalid_field("containerIfName", &self.container_if_name, reason))?;

        if self.k8s_namespace.contains('/') || self.k8s_pod_name.contains('/') {
            return Err(Error::InvalidInput(
                "k8sNamespace and k8sPodName cannot contain '/'".to_string(),
            ));
        }

        Ok(())
    }

    /// Splits the spec into immutable fields and initial mutable state.
    #[must_use]
    pub fn into_parts(self) -> (u16, EndpointFields, EndpointMutableState) {
        let fields = EndpointFields {
            container_id: self.container_id,
            container_if_name: self.container_if_name,
            container_name: self.container_name,
            docker_endpoint_id: self.docker_endpoint_id,
            k8s_namespace: self.k8s_namespace,
            k8s_pod_name: self.k8s_pod_name,
            disable_legacy_identifiers: self.disable_legacy_identifiers,
        };
        let state = EndpointMutableState {
            ipv4: self.ipv4,
            ipv6: self.ipv6,
            cilium_endpoint_uid: None,
        };
        (self.id, fields, state)
    }
}

impl Endpoint {
    /// Validates `spec` and builds an alive endpoint from it.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if validation fails.
    pub fn from_spec(spec: EndpointSpec) -> Result<Self> {
        spec.validate()?;
        let (id, fields, state) = spec.into_parts();
        Ok(Endpoint::with_state(id, fields, state))
    }
}

fn check_size(doc: &[u8]) -> Result<()> {
    if doc.len() > MAX_SPEC_SIZE {
        return Err(Error::InvalidInput(format!(
            "spec size {} exceeds limit of {}",
            doc.len(),
            MAX_SPEC_SIZE
        )));
    }
    Ok(())
}

fn invalid_field(field: &str, value: &str, reason: &str) -> Error {
    Error::InvalidInput(format!("{} '{}' {}", field, value.escape_debug(), reason))
}
