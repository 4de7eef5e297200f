// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! LIVELINESS QoS policy (DDS v1.4 Sec.2.2.3.10).

mod kind;
mod monitor;
mod policy;

pub use kind::LivelinessKind;
pub use monitor::LivelinessMonitor;
pub use policy::Liveliness;
