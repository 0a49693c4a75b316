// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Shared decoding helpers.

/// Errors decoding an OpenFlow 1.0 message body.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("{what} needs {expected} bytes, only {actual} available")]
    Truncated {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("action of type {0} is not supported")]
    UnsupportedAction(u16),
    #[error("action length {0} is invalid")]
    BadActionLength(u16),
    #[error("unknown {what} value {value}")]
    UnknownValue { what: &'static str, value: u16 },
}

/// Fails with [`WireError::Truncated`] unless `remaining` covers `expected` bytes.
pub(crate) fn ensure(remaining: usize, what: &'static str, expected: usize) -> Result<(), WireError> {
    if remaining < expected {
        return Err(WireError::Truncated {
            what,
            expected,
            actual: remaining,
        });
    }
    Ok(())
}
