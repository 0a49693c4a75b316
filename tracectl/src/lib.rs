// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Log targets and their levels.
//!
//! Every crate declares the tracing target it logs under with [`trace_target!`], together
//! with a default level and a set of tags. The declarations are gathered at link time, so
//! the [`TracingControl`] knows about every target before any of them logs, and levels can
//! be changed at runtime per target, per tag or globally.

pub mod control;
pub mod targets;

pub use control::{TraceCtlError, TracingControl, get_trace_ctl};
pub use tracing_subscriber::filter::LevelFilter;
