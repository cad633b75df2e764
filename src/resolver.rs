//! Pure identifier derivation.
//!
//! Every function here is a side-effect-free function of an endpoint field
//! snapshot. Locking is the caller's job (see [`crate::Endpoint`]).
//!
//! # Legacy Identifiers
//!
//! CNI attachment IDs and CEP names are the stable identity of an endpoint
//! and are always exposed. Container ID, container name and pod name are the
//! legacy identity: they are ambiguous once a pod has more than one network
//! attachment, and disappear from the aggregate map when
//! `disable_legacy_identifiers` is set.
//!
//! ```text
//!                         legacy on        legacy off
//!   cni-attachment-id        ✓                 ✓
//!   container-id             ✓                 ✗
//!   docker-endpoint          ✓                 ✓
//!   ipv4 / ipv6              ✓ (if set)        ✓ (if set)
//!   container-name           ✓                 ✗
//!   pod-name                 ✓                 ✗
//!   cep-name                 ns/pod            ns/pod-ifname
//! ```

use crate::constants::{
    CEP_NAME_SEPARATOR, CNI_ATTACHMENT_SEPARATOR, NAMESPACE_SEPARATOR, SHORT_CONTAINER_ID_LEN,
};
use crate::endpoint::{Endpoint, EndpointFields, EndpointMutableState};
use crate::id::{IdentifierPrefix, Identifiers};

/// Returns the CNI attachment ID: `container_id:if_name`, or the bare
/// container ID when there is no interface name.
#[must_use]
pub fn cni_attachment_id(fields: &EndpointFields) -> String {
    if fields.container_if_name.is_empty() {
        return fields.container_id.clone();
    }
    format!(
        "{}{}{}",
        fields.container_id, CNI_ATTACHMENT_SEPARATOR, fields.container_if_name
    )
}

/// Returns the first `SHORT_CONTAINER_ID_LEN` characters of the container ID.
#[must_use]
pub fn short_container_id(fields: &EndpointFields) -> String {
    truncate_chars(&fields.container_id, SHORT_CONTAINER_ID_LEN).to_string()
}

/// Short container ID of an optional endpoint; empty for `None`.
#[must_use]
pub fn short_container_id_of(endpoint: Option<&Endpoint>) -> String {
    endpoint.map(Endpoint::short_container_id).unwrap_or_default()
}

/// Returns the CiliumEndpoint resource name (without namespace).
///
/// Endpoints still using legacy identifiers keep the bare pod name. With
/// legacy identifiers off, the interface name is appended so that several
/// attachments of one pod get distinct names.
#[must_use]
pub fn cep_name(fields: &EndpointFields) -> String {
    if fields.disable_legacy_identifiers
        && !fields.k8s_pod_name.is_empty()
        && !fields.container_if_name.is_empty()
    {
        return format!(
            "{}{}{}",
            fields.k8s_pod_name, CEP_NAME_SEPARATOR, fields.container_if_name
        );
    }
    fields.k8s_pod_name.clone()
}

/// Returns `namespace/pod`.
///
/// Never empty: an endpoint without Kubernetes identity yields `"/"`.
#[must_use]
pub fn namespaced_pod_name(fields: &EndpointFields) -> String {
    format!(
        "{}{}{}",
        fields.k8s_namespace, NAMESPACE_SEPARATOR, fields.k8s_pod_name
    )
}

/// Returns `namespace/cep-name`.
#[must_use]
pub fn namespaced_cep_name(fields: &EndpointFields) -> String {
    format!(
        "{}{}{}",
        fields.k8s_namespace,
        NAMESPACE_SEPARATOR,
        cep_name(fields)
    )
}

/// Builds the aggregate identifier map.
///
/// Entries are evaluated in [`IdentifierPrefix::ALL`] order and inserted
/// only when the derived value is non-empty and the namespace applies.
#[must_use]
pub fn identifiers(fields: &EndpointFields, state: &EndpointMutableState) -> Identifiers {
    let legacy = !fields.disable_legacy_identifiers;
    let mut refs = Identifiers::with_capacity(IdentifierPrefix::ALL.len());

    let mut insert = |prefix: IdentifierPrefix, value: String| {
        if !value.is_empty() {
            refs.insert(prefix, value);
        }
    };

    insert(IdentifierPrefix::CniAttachmentId, cni_attachment_id(fields));

    if legacy {
        insert(IdentifierPrefix::ContainerId, fields.container_id.clone());
    }

    insert(
        IdentifierPrefix::DockerEndpoint,
        fields.docker_endpoint_id.clone(),
    );

    if let Some(ipv4) = state.ipv4 {
        insert(IdentifierPrefix::Ipv4, ipv4.to_string());
    }

    if let Some(ipv6) = state.ipv6 {
        insert(IdentifierPrefix::Ipv6, ipv6.to_string());
    }

    if legacy {
        insert(
            IdentifierPrefix::ContainerName,
            fields.container_name.clone(),
        );
        insert(IdentifierPrefix::PodName, namespaced_pod_name(fields));
    }

    insert(IdentifierPrefix::CepName, namespaced_cep_name(fields));

    refs
}

/// Prefix of at most `max` characters, cut on a char boundary.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_ascii() {
        assert_eq!(truncate_chars("abcdefghijklmnop", 10), "abcdefghij");
        assert_eq!(truncate_chars("abcdefghij", 10), "abcdefghij");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("ééééééééééé", 10), "éééééééééé");
    }
}
