//! Input database model
//!
//! The typed projection of a parsed CAN database that the generator
//! consumes. Every vendor-attribute lookup happens once, in the format
//! adapter; by the time a `Database` value exists, its network name and
//! physical-type table are already resolved.

use serde::Serialize;

/// Byte order of a signal inside the frame payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ByteOrder {
    /// Little-endian (Intel format)
    LittleEndian,
    /// Big-endian (Motorola format)
    BigEndian,
}

/// A parsed CAN database, ready for driver generation
#[derive(Debug, Clone)]
pub struct Database {
    /// Network name; becomes the generated driver's class name
    pub name: String,
    /// Enumeration of physical type names referenced by signals
    pub physical_types: PhysicalTypeTable,
    /// Messages in declaration order
    pub messages: Vec<Message>,
}

impl Database {
    /// Total number of signals across all messages
    pub fn signal_count(&self) -> usize {
        self.messages.iter().map(|m| m.signals.len()).sum()
    }
}

/// A message definition
#[derive(Debug, Clone)]
pub struct Message {
    /// Message name as declared
    pub name: String,
    /// Arbitration ID with the extended-frame marker bit stripped
    pub frame_id: u32,
    /// True if the declared ID carried the extended-frame marker
    pub is_extended: bool,
    /// Instance-name attribute override, if the database carries one
    pub instance_name: Option<String>,
    /// Raw direction attribute value, if the database carries one
    pub direction_attr: Option<i64>,
    /// Nodes that transmit this message
    pub senders: Vec<String>,
    /// Union of the receiver nodes of all signals
    pub receivers: Vec<String>,
    /// Signals in declaration order
    pub signals: Vec<Signal>,
}

impl Message {
    /// Base name of the generated member variable for this message
    pub fn member_name(&self) -> String {
        self.instance_name
            .as_deref()
            .unwrap_or(&self.name)
            .to_lowercase()
    }

    /// Label of this message's frame-ID enumeration entry
    pub fn id_label(&self) -> String {
        self.instance_name
            .as_deref()
            .unwrap_or(&self.name)
            .to_uppercase()
    }
}

/// A signal definition
#[derive(Debug, Clone)]
pub struct Signal {
    /// Signal name
    pub name: String,
    /// Start bit as declared; marks the most significant bit for
    /// big-endian signals
    pub bit_start: u16,
    /// Length in bits
    pub bit_length: u16,
    /// Byte order within the payload
    pub byte_order: ByteOrder,
    /// True if the raw value is a signed integer
    pub is_signed: bool,
    /// Scale factor from raw to physical value
    pub scale: f64,
    /// Offset added after scaling
    pub offset: f64,
    /// Index into the database's physical-type enumeration
    pub type_code: Option<i64>,
}

/// The driver-wide enumeration of physical type names
///
/// Signals reference entries by index. The table comes from a
/// database-level enumeration attribute, so its order is fixed by the
/// database author.
#[derive(Debug, Clone, Default)]
pub struct PhysicalTypeTable {
    names: Vec<String>,
}

impl PhysicalTypeTable {
    /// Create a table from the enumeration's choice list
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Look up the type name for a code
    pub fn name_for(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| self.names.get(idx))
            .map(String::as_str)
    }

    /// Look up the code for a type name
    pub fn code_for(&self, name: &str) -> Option<i64> {
        self.names.iter().position(|n| n == name).map(|idx| idx as i64)
    }

    /// Number of type names in the table
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
