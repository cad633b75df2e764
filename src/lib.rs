//! # magiknet
//!
//! **Endpoint Identity Resolution for Container Networking**
//!
//! A network endpoint is known by a different name to every system that
//! touches it: the container runtime has a container ID, Docker has an
//! endpoint ID, CNI has an attachment ID, Kubernetes has a pod, IPAM has
//! addresses. This crate derives from those a canonical, sparse map of
//! identifier namespace to value, used to look up, log and correlate the same
//! logical endpoint across all of them.
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                            magiknet                                 │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────────┐    │
//! │  │                  Endpoint (accessor surface)                │    │
//! │  │  container_id · cni_attachment_id · k8s_cep_name · ...      │    │
//! │  │          identifiers() / identifiers_locked(&state)         │    │
//! │  └─────────────────────────────────────────────────────────────┘    │
//! │                 │                               │                   │
//! │  ┌──────────────┴──────────────┐  ┌─────────────┴───────────────┐   │
//! │  │        EndpointLock         │  │          resolver           │   │
//! │  │  read · write · read_if_    │  │  pure derivation over a     │   │
//! │  │  alive (fails fast when     │  │  field snapshot; legacy     │   │
//! │  │  the endpoint is Deleted)   │  │  gate; 10-char short ID     │   │
//! │  └─────────────────────────────┘  └─────────────────────────────┘   │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │  EndpointIndex: "<prefix>:<value>" → Arc<Endpoint>                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Identifier Namespaces
//!
//! The namespaces form a closed set (see [`IdentifierPrefix`]):
//! `cni-attachment-id`, `container-id`, `docker-endpoint`, `ipv4`, `ipv6`,
//! `container-name`, `pod-name`, `cep-name`. Container ID, container name and
//! pod name are legacy and are suppressed when an endpoint opts out of
//! legacy identifiers.
//!
//! # Example
//!
//! ```rust
//! use magiknet::{Endpoint, IdentifierPrefix};
//!
//! let ep = Endpoint::builder(42)
//!     .container_id("abcdefghijklmnop")
//!     .container_if_name("eth0")
//!     .k8s_namespace("ns1")
//!     .k8s_pod_name("pod1")
//!     .disable_legacy_identifiers(true)
//!     .build();
//!
//! let ids = ep.identifiers()?;
//! assert_eq!(ids[&IdentifierPrefix::CniAttachmentId], "abcdefghijklmnop:eth0");
//! assert_eq!(ids[&IdentifierPrefix::CepName], "ns1/pod1-eth0");
//! assert_eq!(ep.short_container_id(), "abcdefghij");
//! # Ok::<(), magiknet::Error>(())
//! ```

pub mod constants;
pub mod endpoint;
pub mod error;
pub mod id;
pub mod index;
pub mod resolver;
pub mod spec;

// Re-exports
pub use constants::*;
pub use endpoint::{
    CiliumEndpointUid, Endpoint, EndpointBuilder, EndpointFields, EndpointLock,
    EndpointMutableState, EndpointReadGuard, EndpointState, EndpointWriteGuard,
};
pub use error::{Error, Result};
pub use id::{IdentifierPrefix, Identifiers, ParsedId, new_id, parse_id};
pub use index::EndpointIndex;
pub use spec::EndpointSpec;
