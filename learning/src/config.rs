// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Learning switch settings.

use tracing::{info, warn};

/// Timeouts and priority of one kind of installed rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleTiming {
    /// Seconds of inactivity before the rule expires, 0 for never.
    pub idle_timeout: u16,
    /// Seconds before the rule expires regardless of activity, 0 for never.
    pub hard_timeout: u16,
    pub priority: u16,
}

/// Resolved learning switch configuration.
///
/// Deserializing fills absent fields with the defaults; [`LearningConfig::from_properties`]
/// reads the flat string properties a module loader typically hands over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LearningConfig {
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub priority: u16,
    /// Also install the rule for the opposite direction when a destination is learned.
    pub reverse_flow: bool,
    pub reverse_idle_timeout: u16,
    pub reverse_hard_timeout: u16,
}

impl LearningConfig {
    pub const DEFAULT_IDLE_TIMEOUT: u16 = 5;
    pub const DEFAULT_HARD_TIMEOUT: u16 = 0;
    pub const DEFAULT_PRIORITY: u16 = 100;
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Self::DEFAULT_IDLE_TIMEOUT,
            hard_timeout: Self::DEFAULT_HARD_TIMEOUT,
            priority: Self::DEFAULT_PRIORITY,
            reverse_flow: false,
            reverse_idle_timeout: Self::DEFAULT_IDLE_TIMEOUT,
            reverse_hard_timeout: Self::DEFAULT_HARD_TIMEOUT,
        }
    }
}

/// Reasons a property is not applied.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    #[error("Unknown property '{0}'")]
    Unknown(String),
    #[error("Bad value '{value}' for property '{key}': {reason}")]
    BadValue {
        key: String,
        value: String,
        reason: &'static str,
    },
}

fn parse_u16(key: &str, value: &str) -> Result<u16, PropertyError> {
    value.parse().map_err(|_| PropertyError::BadValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: "expected an integer in [0, 65535]",
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, PropertyError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(PropertyError::BadValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected true or false",
        }),
    }
}

impl LearningConfig {
    /// Timing of forward rules.
    #[must_use]
    pub fn forward_timing(&self) -> RuleTiming {
        RuleTiming {
            idle_timeout: self.idle_timeout,
            hard_timeout: self.hard_timeout,
            priority: self.priority,
        }
    }

    /// Timing of reverse rules. They share the forward priority.
    #[must_use]
    pub fn reverse_timing(&self) -> RuleTiming {
        RuleTiming {
            idle_timeout: self.reverse_idle_timeout,
            hard_timeout: self.reverse_hard_timeout,
            priority: self.priority,
        }
    }

    /// Apply a single property. Keys are case insensitive.
    pub fn set_property(&mut self, key: &str, value: &str) -> Result<(), PropertyError> {
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "idletimeout" => self.idle_timeout = parse_u16(key, value)?,
            "hardtimeout" => self.hard_timeout = parse_u16(key, value)?,
            "priority" => self.priority = parse_u16(key, value)?,
            "enablereverseflow" => self.reverse_flow = parse_bool(key, value)?,
            "reverseidletimeout" => self.reverse_idle_timeout = parse_u16(key, value)?,
            "reversehardtimeout" => self.reverse_hard_timeout = parse_u16(key, value)?,
            _ => return Err(PropertyError::Unknown(key.to_string())),
        }
        Ok(())
    }

    /// Build a configuration from string properties, starting from the defaults.
    ///
    /// Properties that do not parse leave their field at the default and are reported with a
    /// warning. Unknown properties are ignored.
    pub fn from_properties<'a, I>(properties: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = Self::default();
        for (key, value) in properties {
            match config.set_property(key, value) {
                Ok(()) => {}
                Err(e @ PropertyError::Unknown(_)) => info!("Ignoring property: {e}"),
                Err(e) => warn!("{e}; keeping the default"),
            }
        }
        info!("Learning switch configuration: {config:?}");
        config
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use super::{LearningConfig, PropertyError};

    #[test]
    fn defaults() {
        let config = LearningConfig::default();
        assert_eq!(config.idle_timeout, 5);
        assert_eq!(config.hard_timeout, 0);
        assert_eq!(config.priority, 100);
        assert!(!config.reverse_flow);
        assert_eq!(config.reverse_timing().idle_timeout, 5);
        assert_eq!(config.reverse_timing().hard_timeout, 0);
    }

    #[test]
    fn properties() {
        let config = LearningConfig::from_properties([
            ("idletimeout", "30"),
            ("HardTimeout", "600"),
            ("priority", " 200 "),
            ("enablereverseflow", "TRUE"),
            ("reverseidletimeout", "10"),
        ]);
        assert_eq!(config.forward_timing().idle_timeout, 30);
        assert_eq!(config.forward_timing().hard_timeout, 600);
        assert_eq!(config.priority, 200);
        assert!(config.reverse_flow);
        assert_eq!(config.reverse_timing().idle_timeout, 10);
        assert_eq!(config.reverse_timing().hard_timeout, 0);
        assert_eq!(config.reverse_timing().priority, 200);
    }

    #[test]
    #[traced_test]
    fn malformed_values_keep_defaults() {
        let config = LearningConfig::from_properties([
            ("idletimeout", "-1"),
            ("hardtimeout", "70000"),
            ("priority", "high"),
            ("enablereverseflow", "maybe"),
            ("colour", "blue"),
        ]);
        assert_eq!(config, LearningConfig::default());
        assert!(logs_contain("Bad value 'high' for property 'priority'"));
        assert!(logs_contain("Ignoring property: Unknown property 'colour'"));
    }

    #[test]
    fn set_property_reports() {
        let mut config = LearningConfig::default();
        assert_eq!(
            config.set_property("nope", "1"),
            Err(PropertyError::Unknown("nope".to_string()))
        );
        assert!(matches!(
            config.set_property("hardtimeout", "x"),
            Err(PropertyError::BadValue { .. })
        ));
        assert_eq!(config.set_property("hardtimeout", "9"), Ok(()));
        assert_eq!(config.hard_timeout, 9);
    }

    #[test]
    fn from_yaml() {
        let config: LearningConfig =
            serde_yaml_ng::from_str("idle_timeout: 12\nreverse_flow: true\n").unwrap();
        assert_eq!(config.idle_timeout, 12);
        assert!(config.reverse_flow);
        assert_eq!(config.priority, 100);
        assert!(serde_yaml_ng::from_str::<LearningConfig>("idle: 1\n").is_err());
    }
}
