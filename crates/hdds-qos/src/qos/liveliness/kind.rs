// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use std::fmt;
use std::str::FromStr;

/// LIVELINESS QoS kinds (DDS v1.4 Sec.2.2.3.10).
///
/// Ordered from weakest to strongest guarantee, which is the order used for
/// RxO matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LivelinessKind {
    /// The runtime asserts liveliness for as long as the publisher exists.
    #[default]
    Automatic,
    /// Application must assert per node (any publisher of the node counts).
    ManualByParticipant,
    /// Application must assert per publisher.
    ManualByTopic,
}

impl LivelinessKind {
    /// Canonical DDS spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            LivelinessKind::Automatic => "AUTOMATIC",
            LivelinessKind::ManualByParticipant => "MANUAL_BY_PARTICIPANT",
            LivelinessKind::ManualByTopic => "MANUAL_BY_TOPIC",
        }
    }

    /// True for kinds that require the application to assert.
    pub fn is_manual(self) -> bool {
        !matches!(self, LivelinessKind::Automatic)
    }
}

impl fmt::Display for LivelinessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LivelinessKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AUTOMATIC" => Ok(LivelinessKind::Automatic),
            "MANUAL_BY_PARTICIPANT" => Ok(LivelinessKind::ManualByParticipant),
            "MANUAL_BY_TOPIC" => Ok(LivelinessKind::ManualByTopic),
            other => Err(format!("Unknown liveliness kind: {}", other)),
        }
    }
}
