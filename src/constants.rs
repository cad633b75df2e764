//! # Endpoint Identity Constants
//!
//! Bounds and fixed lengths used by identifier derivation, endpoint spec
//! validation and the identifier index. These constants are the **single
//! source of truth** for those limits throughout the crate.
//!
//! ## Cross-References
//!
//! - [`crate::resolver`]: Uses `SHORT_CONTAINER_ID_LEN`
//! - [`crate::spec`]: Uses the field length limits
//! - [`crate::index`]: Uses `MAX_INDEXED_ENDPOINTS`

// =============================================================================
// Identifier Derivation
// =============================================================================

/// Number of characters kept by the short container ID.
///
/// Matches the abbreviated form container runtimes print (`docker ps`,
/// `crictl ps`). A pure prefix: no ellipsis, no hashing.
pub const SHORT_CONTAINER_ID_LEN: usize = 10;

/// Separator between container ID and interface name in a CNI attachment ID.
pub const CNI_ATTACHMENT_SEPARATOR: char = ':';

/// Separator between pod name and interface name in a CEP name.
pub const CEP_NAME_SEPARATOR: char = '-';

/// Separator between namespace and name in namespaced identifiers.
pub const NAMESPACE_SEPARATOR: char = '/';

/// Separator between prefix and value in identifier lookup keys.
pub const IDENTIFIER_KEY_SEPARATOR: char = ':';

// =============================================================================
// Spec Validation Limits
// =============================================================================

/// Maximum endpoint spec document size in bytes (64 KiB).
///
/// **Security**: Prevents memory exhaustion when parsing untrusted specs.
/// A fully populated spec is well under 2 KiB.
pub const MAX_SPEC_SIZE: usize = 64 * 1024;

/// Maximum container ID length.
///
/// **Rationale**: Runtime IDs are 64 hex characters; 128 leaves room for
/// runtime-specific prefixes without admitting unbounded strings.
pub const MAX_CONTAINER_ID_LEN: usize = 128;

/// Maximum interface name length (kernel `IFNAMSIZ` minus the NUL).
pub const MAX_IFNAME_LEN: usize = 15;

/// Maximum length for pod and container names (RFC 1123 DNS subdomain).
pub const MAX_NAME_LEN: usize = 253;

/// Maximum length for namespace names (RFC 1123 DNS label).
pub const MAX_NAMESPACE_LEN: usize = 63;

/// Maximum Docker endpoint ID length.
pub const MAX_DOCKER_ENDPOINT_ID_LEN: usize = 128;

// =============================================================================
// Index Limits
// =============================================================================

/// Maximum number of endpoints tracked by an [`crate::EndpointIndex`].
///
/// **Rationale**: Endpoint IDs are 16-bit, so no node can host more.
pub const MAX_INDEXED_ENDPOINTS: usize = u16::MAX as usize;

// =============================================================================
// Validation Helpers
// =============================================================================

/// Validates a free-form identifier field.
///
/// Empty values are accepted (the field is simply absent). Non-empty values
/// must fit `max_len` and contain no whitespace or control characters.
///
/// # Errors
///
/// Returns a static reason string suitable for embedding in an error.
pub fn validate_identifier_field(value: &str, max_len: usize) -> Result<(), &'static str> {
    if value.len() > max_len {
        return Err("exceeds maximum length");
    }

    if value
        .chars()
        .any(|c| c.is_control() || c.is_whitespace())
    {
        return Err("contains whitespace or control characters");
    }

    Ok(())
}

/// Validates a container interface name.
///
/// # Errors
///
/// Fails for names longer than `MAX_IFNAME_LEN`, names containing `/` or the
/// CNI attachment separator, and names with whitespace or control characters.
pub fn validate_ifname(value: &str) -> Result<(), &'static str> {
    validate_identifier_field(value, MAX_IFNAME_LEN)?;

    if value.contains('/') || value.contains(CNI_ATTACHMENT_SEPARATOR) {
        return Err("contains '/' or ':'");
    }

    Ok(())
}
