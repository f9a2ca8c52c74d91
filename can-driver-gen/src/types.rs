//! Core types for driver specification generation
//!
//! This module defines the resolved specification tree that the generator
//! produces and the error type shared by every pipeline stage. The
//! specification is plain data: emitters and external tooling consume it
//! without ever looking back at the database it was resolved from.

use serde::Serialize;
use std::fmt;

use crate::layout::ResolvedLayout;
use crate::transform::ResolvedTransform;

/// Result type for generator operations
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Errors that can occur during specification generation
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Failed to parse DBC input: {0}")]
    DbcParseError(String),

    #[error("Database contains no messages")]
    EmptyDatabase,

    #[error("Database defines no physical-type enumeration for signals")]
    MissingTypeEnumeration,

    #[error("Database carries no network name to derive the driver name from")]
    NoNetworkDefinition,

    #[error("Signal '{signal}' has no physical-type code and the database declares no default")]
    MissingTypeCode { signal: String },

    #[error("Signal '{signal}' references type code {code} outside the type enumeration")]
    UnknownTypeCode { signal: String, code: i64 },

    #[error("Message '{message}' cannot be classified: direction attribute is {value:?}")]
    UnclassifiedMessage {
        message: String,
        value: Option<i64>,
    },

    #[error("Signal '{signal}' is {bits} bits wide, exceeding the widest storage of 64 bits")]
    SignalTooWide { signal: String, bits: u16 },

    #[error("Signal '{signal}' has a bit length of zero")]
    ZeroWidthSignal { signal: String },

    #[error("Signals '{first}' and '{second}' in message '{message}' occupy overlapping bits")]
    OverlappingSignals {
        message: String,
        first: String,
        second: String,
    },

    #[error("Signal '{signal}' has a scale factor of zero")]
    ZeroScale { signal: String },

    #[error("Messages '{first}' and '{second}' share frame ID 0x{frame_id:X}")]
    DuplicateFrameId {
        first: String,
        second: String,
        frame_id: u32,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Transfer direction of a message, seen from the generated driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    /// The driver transmits this message
    Tx,
    /// The driver receives this message
    Rx,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Tx => write!(f, "TX"),
            Direction::Rx => write!(f, "RX"),
        }
    }
}

/// Whether an accessor writes a signal into an outgoing frame or reads it
/// out of a received one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AccessorKind {
    Setter,
    Getter,
}

/// One entry of the driver-wide frame identifier enumeration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageIdEntry {
    /// Symbolic label, derived from the message's instance-name attribute
    /// or its declared name
    pub label: String,
    /// Arbitration ID with the extended-frame marker bit stripped
    pub frame_id: u32,
}

/// Resolved storage slot for one signal of a message payload
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub signal_name: String,
    pub layout: ResolvedLayout,
}

/// Resolved accessor for one signal
#[derive(Debug, Clone, Serialize)]
pub struct AccessorSpec {
    pub signal_name: String,
    /// Physical type name taken from the database's type enumeration
    pub physical_type: String,
    pub kind: AccessorKind,
    pub transform: ResolvedTransform,
}

/// Fully resolved driver view of one message
#[derive(Debug, Clone, Serialize)]
pub struct MessageSpec {
    /// Message name as declared in the database
    pub name: String,
    /// Label used for this message's frame-ID enumeration entry
    pub id_label: String,
    /// Member-variable base name inside the driver class
    pub instance_name: String,
    pub frame_id: u32,
    pub is_extended: bool,
    pub direction: Direction,
    /// Payload fields in declaration order
    pub fields: Vec<FieldSpec>,
    /// Accessors in declaration order, parallel to `fields`
    pub accessors: Vec<AccessorSpec>,
}

/// The complete resolved driver interface specification
///
/// All collections preserve the declaration order of the source database.
/// A value of this type only exists if every contained message resolved
/// without error; generation never yields a partial specification.
#[derive(Debug, Clone, Serialize)]
pub struct DriverSpec {
    /// Driver class name, taken from the database's network name
    pub driver_name: String,
    /// Frame identifiers of every message the driver handles
    pub message_ids: Vec<MessageIdEntry>,
    /// Messages the driver transmits, in declaration order
    pub tx_messages: Vec<MessageSpec>,
    /// Messages the driver receives, in declaration order
    pub rx_messages: Vec<MessageSpec>,
}

impl DriverSpec {
    /// Total number of messages the driver handles
    pub fn message_count(&self) -> usize {
        self.tx_messages.len() + self.rx_messages.len()
    }

    /// Iterate over all messages, transmitted first, then received
    pub fn all_messages(&self) -> impl Iterator<Item = &MessageSpec> {
        self.tx_messages.iter().chain(self.rx_messages.iter())
    }
}
