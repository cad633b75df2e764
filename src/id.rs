//! Identifier namespaces and prefixed lookup keys.
//!
//! Every identifier an endpoint exposes lives in one of a closed set of
//! namespaces. Other subsystems index endpoints by `"<prefix>:<value>"`
//! keys, so the prefix spellings below are a stable contract:
//!
//! | Prefix              | Value example                          |
//! |---------------------|----------------------------------------|
//! | `cni-attachment-id` | `4b1c0d9e2f7a...:eth0`                 |
//! | `container-id`      | `4b1c0d9e2f7a...`                      |
//! | `docker-endpoint`   | `9f2e6c...`                            |
//! | `ipv4`              | `10.0.0.12`                            |
//! | `ipv6`              | `fd00::12`                             |
//! | `container-name`    | `web-1`                                |
//! | `pod-name`          | `default/web-1`                        |
//! | `cep-name`          | `default/web-1-net1`                   |

use crate::constants::IDENTIFIER_KEY_SEPARATOR;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Namespace an endpoint identifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentifierPrefix {
    /// Container ID plus interface name, unique per CNI attachment.
    CniAttachmentId,
    /// Runtime container ID (legacy).
    ContainerId,
    /// Docker libnetwork endpoint ID.
    DockerEndpoint,
    /// Allocated IPv4 address.
    Ipv4,
    /// Allocated IPv6 address.
    Ipv6,
    /// Human container name (legacy).
    ContainerName,
    /// `namespace/pod` (legacy).
    PodName,
    /// `namespace/cep-name`.
    CepName,
}

impl IdentifierPrefix {
    /// All prefixes, in the order the aggregate identifier map evaluates them.
    pub const ALL: [IdentifierPrefix; 8] = [
        IdentifierPrefix::CniAttachmentId,
        IdentifierPrefix::ContainerId,
        IdentifierPrefix::DockerEndpoint,
        IdentifierPrefix::Ipv4,
        IdentifierPrefix::Ipv6,
        IdentifierPrefix::ContainerName,
        IdentifierPrefix::PodName,
        IdentifierPrefix::CepName,
    ];

    /// Returns the stable key spelling of this prefix.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            IdentifierPrefix::CniAttachmentId => "cni-attachment-id",
            IdentifierPrefix::ContainerId => "container-id",
            IdentifierPrefix::DockerEndpoint => "docker-endpoint",
            IdentifierPrefix::Ipv4 => "ipv4",
            IdentifierPrefix::Ipv6 => "ipv6",
            IdentifierPrefix::ContainerName => "container-name",
            IdentifierPrefix::PodName => "pod-name",
            IdentifierPrefix::CepName => "cep-name",
        }
    }

    /// Whether this namespace is suppressed once legacy identifiers are
    /// disabled.
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(
            self,
            IdentifierPrefix::ContainerId
                | IdentifierPrefix::ContainerName
                | IdentifierPrefix::PodName
        )
    }
}

impl std::fmt::Display for IdentifierPrefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdentifierPrefix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        IdentifierPrefix::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::InvalidIdentifier {
                id: s.to_string(),
                reason: "unknown identifier prefix".to_string(),
            })
    }
}

/// Sparse mapping of identifier namespace to identifier value.
///
/// Always a freshly derived snapshot; it never observes later changes to
/// the endpoint it was computed from.
pub type Identifiers = HashMap<IdentifierPrefix, String>;

/// Forms the lookup key `"<prefix>:<value>"`.
#[must_use]
pub fn new_id(prefix: IdentifierPrefix, value: &str) -> String {
    format!("{}{}{}", prefix.as_str(), IDENTIFIER_KEY_SEPARATOR, value)
}

/// Result of parsing a lookup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedId {
    /// `"<prefix>:<value>"`.
    Prefixed(IdentifierPrefix, String),
    /// Bare numeric endpoint ID.
    Local(u16),
}

/// Parses a lookup key produced by [`new_id`], or a bare numeric endpoint ID.
///
/// Splits at the first `':'` only, since CNI attachment IDs and IPv6
/// addresses carry colons in their value.
///
/// # Errors
///
/// Returns `Error::InvalidIdentifier` for unknown prefixes, empty values, and
/// unprefixed keys that are not a valid endpoint ID.
pub fn parse_id(key: &str) -> Result<ParsedId> {
    let invalid = |reason: &str| Error::InvalidIdentifier {
        id: key.to_string(),
        reason: reason.to_string(),
    };

    match key.split_once(IDENTIFIER_KEY_SEPARATOR) {
        Some((prefix, value)) => {
            let prefix = prefix.parse::<IdentifierPrefix>().map_err(|_| {
                invalid(&format!("unknown identifier prefix '{}'", prefix))
            })?;
            if value.is_empty() {
                return Err(invalid("empty identifier value"));
            }
            Ok(ParsedId::Prefixed(prefix, value.to_string()))
        }
        None => key
            .parse::<u16>()
            .map(ParsedId::Local)
            .map_err(|_| invalid("not a prefixed identifier or numeric endpoint ID")),
    }
}
