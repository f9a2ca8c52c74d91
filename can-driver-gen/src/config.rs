//! Generator configuration types
//!
//! This module defines the minimal configuration needed by the generator
//! library. The one decision a caller must make is the direction policy:
//! historic databases encode message direction either as a per-message
//! attribute or implicitly through node membership, and the two schemes
//! disagree often enough that no default is assumed.

use serde::{Deserialize, Serialize};

/// Policy used to assign each message a transmit or receive role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "lowercase")]
pub enum DirectionPolicy {
    /// Read the per-message direction attribute: 0 means receive, 1 means
    /// transmit, any other value fails generation
    Attribute,
    /// Check the named node against each message's sender and receiver
    /// sets. Receivers are checked first. Messages the node neither sends
    /// nor receives are left out of the driver.
    Membership { node: String },
}

/// Configuration for one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// How messages are classified as TX or RX
    pub direction_policy: DirectionPolicy,
}

impl GeneratorConfig {
    /// Create a configuration with the given direction policy
    pub fn new(direction_policy: DirectionPolicy) -> Self {
        Self { direction_policy }
    }

    /// Shorthand for the attribute-based direction policy
    pub fn attribute_directions() -> Self {
        Self::new(DirectionPolicy::Attribute)
    }

    /// Shorthand for the membership-based direction policy
    pub fn membership_directions(node: impl Into<String>) -> Self {
        Self::new(DirectionPolicy::Membership { node: node.into() })
    }
}
