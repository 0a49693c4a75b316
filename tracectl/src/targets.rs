// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Link-time registry of tracing targets

use crate::LevelFilter;
use linkme::distributed_slice;

/// A tracing target declared with [`trace_target!`](crate::trace_target).
pub struct TraceTarget {
    pub(crate) target: &'static str,
    pub(crate) name: &'static str,
    pub(crate) level: LevelFilter,
    pub(crate) tags: &'static [&'static str],
}

impl TraceTarget {
    #[must_use]
    pub const fn new(
        target: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
    ) -> Self {
        Self {
            target,
            name,
            level,
            tags,
        }
    }

    /// The module path logs are filtered on.
    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn tags(&self) -> &'static [&'static str] {
        self.tags
    }
}

#[distributed_slice]
pub static TRACE_TARGETS: [TraceTarget];

/// Declare the module invoking the macro as a tracing target with a short name, a default
/// level and tags. Invoked at the crate root it covers the whole crate.
///
/// The calling crate needs `linkme` among its dependencies.
#[macro_export]
macro_rules! trace_target {
    ($name:expr, $level:expr, $tags:expr) => {
        // a const block per invocation keeps the static's name local
        const _: () = {
            #[allow(unused_imports)]
            use $crate::LevelFilter;
            use $crate::targets::{TRACE_TARGETS, TraceTarget};
            use linkme::distributed_slice;

            #[distributed_slice(TRACE_TARGETS)]
            static TARGET: TraceTarget = TraceTarget::new(module_path!(), $name, $level, $tags);
        };
    };
}
