// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # DDS entities
//!
//! ```text
//! Context (domain)
//! +-- topic registry: topic name -> TopicState<T>
//! +-- wake channel (executor) and shutdown flag
//!
//! Node
//! +-- Publisher<T>     ------> TopicState<T>
//! +-- Subscription<T>  <------ TopicState<T>
//! +-- Timer
//! ```
//!
//! Publishers and subscriptions on the same topic are matched as soon as
//! both exist, provided the message type is identical and the QoS is
//! compatible (see [`QoS::compatibility`](crate::qos::QoS::compatibility)).

mod context;
/// QoS event statuses and callbacks.
pub mod listener;
mod node;
mod publisher;
mod subscription;
mod timer;
mod topic;

pub use context::{Context, MAX_DOMAIN_ID};
pub use listener::{
    EventCallback, IncompatibleQosStatus, LivelinessChangedStatus, LivelinessLostStatus,
    OfferedDeadlineMissedStatus, PublisherEventCallbacks, RequestedDeadlineMissedStatus,
    SubscriptionEventCallbacks,
};
pub use node::{Node, NodeLogger};
pub use publisher::Publisher;
pub use subscription::Subscription;
pub use timer::Timer;

pub(crate) use node::Waitable;

use std::fmt;

/// Types that can travel over a topic.
///
/// Samples are shared between the publisher cache and every matched
/// subscription, so they must be cheap to clone and thread-safe.
pub trait Message: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Message for T {}

/// Globally unique entity identifier within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guid {
    pub domain_id: u32,
    pub entity_id: u64,
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}.{:012x}", self.domain_id, self.entity_id)
    }
}

/// Errors returned by runtime operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// QoS policy is invalid (e.g., zero depth, zero deadline).
    InvalidQos(String),
    /// Node or topic name violates the naming rules.
    InvalidName(String),
    /// Domain ID out of range (0-232).
    InvalidDomainId(u32),
    /// A topic is already registered with a different message type.
    TypeMismatch {
        topic: String,
        registered: &'static str,
        requested: &'static str,
    },
    /// The entity was destroyed.
    AlreadyDestroyed,
    /// The context was shut down.
    Shutdown,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidQos(msg) => write!(f, "Invalid QoS: {}", msg),
            Error::InvalidName(msg) => write!(f, "Invalid name: {}", msg),
            Error::InvalidDomainId(id) => {
                write!(f, "Invalid domain_id: {} (must be 0-{})", id, MAX_DOMAIN_ID)
            }
            Error::TypeMismatch {
                topic,
                registered,
                requested,
            } => write!(
                f,
                "Type mismatch on topic '{}': registered as {}, requested as {}",
                topic, registered, requested
            ),
            Error::AlreadyDestroyed => write!(f, "Entity already destroyed"),
            Error::Shutdown => write!(f, "Context is shut down"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Validate a node or topic name.
///
/// Names are non-empty, made of ASCII alphanumerics and underscores, and do
/// not start with a digit. Topic names may additionally contain `/`
/// separators between valid tokens.
pub(crate) fn validate_name(name: &str, allow_separators: bool) -> Result<()> {
    let tokens: Vec<&str> = if allow_separators {
        name.trim_start_matches('/').split('/').collect()
    } else {
        vec![name]
    };
    for token in tokens {
        let mut chars = token.chars();
        let Some(first) = chars.next() else {
            return Err(Error::InvalidName(format!("'{}' has an empty token", name)));
        };
        if first.is_ascii_digit() {
            return Err(Error::InvalidName(format!(
                "'{}' must not start with a digit",
                name
            )));
        }
        if !token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::InvalidName(format!(
                "'{}' may only contain alphanumerics and '_'",
                name
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_node_names() {
        assert!(validate_name("qos_talker", false).is_ok());
        assert!(validate_name("", false).is_err());
        assert!(validate_name("9lives", false).is_err());
        assert!(validate_name("bad-name", false).is_err());
        assert!(validate_name("ns/node", false).is_err());
    }

    #[test]
    fn test_validate_topic_names() {
        assert!(validate_name("qos_deadline_chatter", true).is_ok());
        assert!(validate_name("/robot/chatter", true).is_ok());
        assert!(validate_name("robot//chatter", true).is_err());
        assert!(validate_name("/", true).is_err());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            Error::InvalidDomainId(300).to_string(),
            "Invalid domain_id: 300 (must be 0-232)"
        );
        let err = Error::TypeMismatch {
            topic: "chatter".to_string(),
            registered: "u32",
            requested: "alloc::string::String",
        };
        assert!(err.to_string().contains("chatter"));
    }

    #[test]
    fn test_guid_display() {
        let guid = Guid {
            domain_id: 7,
            entity_id: 0x2a,
        };
        assert_eq!(guid.to_string(), "0007.00000000002a");
    }
}
