// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Tracing runtime control.

use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use ordermap::OrderMap;
use tracing::{debug, info};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{EnvFilter, Registry, prelude::*, reload};

use crate::LevelFilter;
use crate::targets::TRACE_TARGETS;
use crate::trace_target;

trace_target!("tracectl", LevelFilter::INFO, &[]);

/// Errors applying a tracing configuration.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TraceCtlError {
    #[error("invalid directive '{0}': expected name=level")]
    Syntax(String),
    #[error("invalid level '{0}'")]
    Level(String),
    #[error("no target or tag named '{0}'")]
    Unknown(String),
}

/// Current configuration of one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetCfg {
    pub target: &'static str,
    pub name: &'static str,
    pub level: LevelFilter,
    pub tags: Vec<&'static str>,
}

impl TargetCfg {
    fn answers_to(&self, key: &str) -> bool {
        self.name == key || self.target == key || self.tags.contains(&key)
    }
}

#[derive(Debug)]
struct TargetDb {
    default: LevelFilter,
    targets: OrderMap<&'static str, TargetCfg>,
}

impl TargetDb {
    fn new(default: LevelFilter) -> Self {
        let mut targets = OrderMap::new();
        for t in TRACE_TARGETS {
            targets.insert(
                t.target,
                TargetCfg {
                    target: t.target,
                    name: t.name,
                    level: t.level,
                    tags: t.tags.to_vec(),
                },
            );
        }
        Self { default, targets }
    }

    fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::new(self.default.to_string());
        for t in self.targets.values() {
            if let Ok(directive) = Directive::from_str(&format!("{}={}", t.target, t.level)) {
                filter = filter.add_directive(directive);
            }
        }
        filter
    }

    fn set_level(&mut self, key: &str, level: LevelFilter) -> usize {
        let mut changed = 0;
        for t in self.targets.values_mut().filter(|t| t.answers_to(key)) {
            t.level = level;
            changed += 1;
        }
        changed
    }

    fn knows(&self, key: &str) -> bool {
        key == "default" || key == "all" || self.targets.values().any(|t| t.answers_to(key))
    }

    fn config_string(&self) -> String {
        let mut out = format!("default={}", self.default);
        for t in self.targets.values() {
            out.push_str(&format!(",{}={}", t.name, t.level));
        }
        out
    }
}

/// Parse `name=level[,name=level...]`.
fn parse_config(input: &str) -> Result<Vec<(String, LevelFilter)>, TraceCtlError> {
    input
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (name, level) = item
                .split_once('=')
                .ok_or_else(|| TraceCtlError::Syntax(item.to_string()))?;
            let level = LevelFilter::from_str(level.trim())
                .map_err(|_| TraceCtlError::Level(level.trim().to_string()))?;
            Ok((name.trim().to_string(), level))
        })
        .collect()
}

/// Owner of the process-wide subscriber filter.
pub struct TracingControl {
    db: Mutex<TargetDb>,
    handle: reload::Handle<EnvFilter, Registry>,
}

impl TracingControl {
    fn new(install: bool) -> Self {
        let db = TargetDb::new(LevelFilter::INFO);
        let (filter, handle) = reload::Layer::new(db.env_filter());
        if install {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .with_line_number(true);
            if let Err(e) = tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
            {
                // someone else owns the global subscriber (test harnesses do); levels set
                // here will then have no effect
                eprintln!("tracing subscriber already installed: {e}");
            }
        }
        Self {
            db: Mutex::new(db),
            handle,
        }
    }

    /// Make sure the global subscriber is installed.
    pub fn init() {
        get_trace_ctl();
    }

    fn db(&self) -> MutexGuard<'_, TargetDb> {
        self.db.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn reload(&self, db: &TargetDb) {
        if let Err(e) = self.handle.reload(db.env_filter()) {
            debug!("tracing filter not reloaded: {e}");
        }
    }

    /// Set the level of every target whose name, module path or tag is `key`.
    /// Returns how many targets matched.
    pub fn set_level(&self, key: &str, level: LevelFilter) -> usize {
        let mut db = self.db();
        let changed = db.set_level(key, level);
        if changed > 0 {
            self.reload(&db);
            info!("log level of '{key}' set to {level} ({changed} targets)");
        }
        changed
    }

    /// Set the level of logs from modules no target covers.
    pub fn set_default_level(&self, level: LevelFilter) {
        let mut db = self.db();
        db.default = level;
        self.reload(&db);
    }

    /// The level of logs from modules no target covers.
    pub fn default_level(&self) -> LevelFilter {
        self.db().default
    }

    /// Configuration of the target named (or at module path) `key`.
    pub fn target(&self, key: &str) -> Option<TargetCfg> {
        self.db()
            .targets
            .values()
            .find(|t| t.name == key || t.target == key)
            .cloned()
    }

    /// Apply a `name=level` list such as `default=warn,all=info,learning=debug`.
    ///
    /// `default` sets the fallback level, `all` every registered target, anything else the
    /// targets with that name or tag, in that order. Nothing is applied unless the whole
    /// string is valid.
    pub fn setup_from_string(&self, input: &str) -> Result<(), TraceCtlError> {
        let config = parse_config(input)?;
        let mut db = self.db();
        if let Some((unknown, _)) = config.iter().find(|(name, _)| !db.knows(name)) {
            return Err(TraceCtlError::Unknown(unknown.clone()));
        }
        for (name, level) in &config {
            if name == "default" {
                db.default = *level;
            }
        }
        for (name, level) in &config {
            if name == "all" {
                for t in db.targets.values_mut() {
                    t.level = *level;
                }
            }
        }
        for (name, level) in &config {
            if name != "default" && name != "all" {
                db.set_level(name, *level);
            }
        }
        self.reload(&db);
        Ok(())
    }

    /// The current configuration, in the syntax [`TracingControl::setup_from_string`] takes.
    pub fn as_config_string(&self) -> String {
        self.db().config_string()
    }
}

/// The process-wide [`TracingControl`], installing the subscriber on first use.
pub fn get_trace_ctl() -> &'static TracingControl {
    static CTL: OnceLock<TracingControl> = OnceLock::new();
    CTL.get_or_init(|| TracingControl::new(true))
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::{TraceCtlError, TracingControl, get_trace_ctl, parse_config};
    use crate::targets::TRACE_TARGETS;
    use crate::{LevelFilter, trace_target};

    trace_target!("ctl-test", LevelFilter::ERROR, &["test-tag"]);

    fn own_target(ctl: &TracingControl) -> LevelFilter {
        ctl.target("ctl-test").map(|t| t.level).unwrap()
    }

    #[test]
    fn targets_are_registered_at_link_time() {
        let names: Vec<_> = TRACE_TARGETS.iter().map(|t| t.name).collect();
        assert!(names.contains(&"tracectl"));
        assert!(names.contains(&"ctl-test"));
    }

    #[test]
    fn parse() {
        assert_eq!(
            parse_config("default=warn, ctl-test=debug").unwrap(),
            vec![
                ("default".to_string(), LevelFilter::WARN),
                ("ctl-test".to_string(), LevelFilter::DEBUG)
            ]
        );
        assert_eq!(
            parse_config("ctl-test"),
            Err(TraceCtlError::Syntax("ctl-test".to_string()))
        );
        assert_eq!(
            parse_config("ctl-test=loud"),
            Err(TraceCtlError::Level("loud".to_string()))
        );
    }

    #[test]
    fn levels_by_name_and_tag() {
        let ctl = TracingControl::new(false);
        assert_eq!(own_target(&ctl), LevelFilter::ERROR);
        assert_eq!(ctl.set_level("test-tag", LevelFilter::TRACE), 1);
        assert_eq!(own_target(&ctl), LevelFilter::TRACE);
        assert_eq!(ctl.set_level("nobody", LevelFilter::TRACE), 0);
    }

    #[test]
    fn config_string_order() {
        let ctl = TracingControl::new(false);
        ctl.setup_from_string("ctl-test=debug,all=warn,default=off")
            .unwrap();
        // per-name settings win over `all`
        assert_eq!(own_target(&ctl), LevelFilter::DEBUG);
        assert_eq!(ctl.target("tracectl").unwrap().level, LevelFilter::WARN);
        assert_eq!(ctl.default_level(), LevelFilter::OFF);
        assert!(ctl.as_config_string().starts_with("default=off"));
        assert!(ctl.as_config_string().contains("ctl-test=debug"));
    }

    #[test]
    fn unknown_names_apply_nothing() {
        let ctl = TracingControl::new(false);
        assert_eq!(
            ctl.setup_from_string("default=trace,bogus=info"),
            Err(TraceCtlError::Unknown("bogus".to_string()))
        );
        assert_eq!(ctl.default_level(), LevelFilter::INFO);
    }

    #[test]
    #[serial]
    fn global_control() {
        TracingControl::init();
        let ctl = get_trace_ctl();
        assert!(std::ptr::eq(ctl, get_trace_ctl()));
        ctl.set_default_level(LevelFilter::WARN);
        assert_eq!(ctl.default_level(), LevelFilter::WARN);
    }
}
