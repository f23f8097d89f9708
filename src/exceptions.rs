//! ## Custom errors
//!
//! This module defines the error type used internally and at the edges of
//! the public API. Invalid configuration is never fatal: constructors clamp
//! to defaults and log a warning rather than returning an error, but the
//! error type exists for callers who want to observe that substitution
//! (see [`crate::rtree::RTree::try_with_config`]).

use std::error::Error;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents errors specific to invalid operations or parameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RtreeError {
    /// Occurs when a configuration field is out of range. Never fatal on its
    /// own: the caller's requested value is replaced by `default`.
    InvalidConfiguration {
        /// Name of the offending field (e.g. `"max_node_entries"`).
        field: &'static str,
        /// The value the caller supplied.
        value: i32,
        /// The default value substituted in its place.
        default: i32,
    },
}

impl fmt::Display for RtreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RtreeError::InvalidConfiguration {
                field,
                value,
                default,
            } => {
                write!(
                    f,
                    "invalid configuration: {field} = {value} is out of range, using default {default}"
                )
            }
        }
    }
}

impl Error for RtreeError {}
