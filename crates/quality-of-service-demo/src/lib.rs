// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # quality_of_service_demo
//!
//! Nodes demonstrating the timing-related QoS policies on the in-process
//! [`hdds_qos`] runtime. The package installs three commands:
//!
//! | command      | entry point                                   |
//! |--------------|-----------------------------------------------|
//! | `lifespan`   | [`lifespan::main`]                            |
//! | `liveliness` | [`liveliness::main`]                          |
//! | `deadline`   | [`deadline::main`]                            |
//!
//! Each demo wires a [`Talker`](common_nodes::Talker) and a
//! [`Listener`](common_nodes::Listener) on a shared topic and logs the QoS
//! events they raise.
//!
//! ```bash
//! deadline 600 --publish-for 5000 --pause-for 1000
//! liveliness 1000 --policy MANUAL_BY_TOPIC --topic-assert-period 600
//! lifespan 1000 --publish-count 10 --subscribe-after 3000
//! ```

pub mod common_nodes;
pub mod config;
pub mod deadline;
pub mod demo;
pub mod error;
pub mod events;
pub mod lifespan;
pub mod liveliness;
pub mod logging;
pub mod manifest;
pub mod messages;

pub use error::{DemoError, Result};
