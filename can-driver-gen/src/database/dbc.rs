//! DBC file adapter
//!
//! Parses Vector DBC files with the can-dbc crate and projects them into
//! the internal database model. All vendor-attribute resolution lives
//! here: the network name, the physical-type enumeration, per-message
//! direction and instance-name values, and per-signal type codes. The
//! rest of the pipeline never sees a raw attribute bag.

use std::collections::HashMap;
use std::path::Path;

use crate::database::model::{ByteOrder, Database, Message, PhysicalTypeTable, Signal};
use crate::types::{GeneratorError, Result};

/// Network-scope attribute carrying the name the driver class is named after
pub const NETWORK_NAME_ATTRIBUTE: &str = "DBName";
/// Signal-scope enumeration attribute listing the physical type names
pub const VAR_TYPE_ATTRIBUTE: &str = "CG_VarType";
/// Message-scope attribute holding the direction value (0 receive, 1 transmit)
pub const DIRECTION_ATTRIBUTE: &str = "CG_MsgDirection";
/// Message-scope attribute overriding the generated member-variable name
pub const INSTANCE_NAME_ATTRIBUTE: &str = "CG_InstanceName";

/// Marker bit DBC files set on arbitration IDs of extended frames
const EXTENDED_ID_FLAG: u32 = 0x8000_0000;

/// Receiver placeholder DBC tools write when no real node is assigned
const UNASSIGNED_NODE: &str = "Vector__XXX";

/// Parse a DBC file and project it into a `Database`
pub fn load_dbc_file(path: &Path) -> Result<Database> {
    log::info!("Loading DBC file: {:?}", path);

    // Read as bytes first (handle non-UTF8 encodings)
    let bytes = std::fs::read(path)?;

    // Try UTF-8 first, then fall back to Latin-1/Windows-1252 encoding
    let content = match String::from_utf8(bytes) {
        Ok(content) => content,
        Err(err) => {
            log::warn!("DBC file is not UTF-8, trying Latin-1 encoding");
            err.into_bytes().iter().map(|&b| b as char).collect()
        }
    };

    parse_dbc(&content)
}

/// Parse DBC text and project it into a `Database`
pub fn parse_dbc(content: &str) -> Result<Database> {
    let dbc = can_dbc::DBC::from_slice(content.as_bytes())
        .map_err(|e| GeneratorError::DbcParseError(format!("{:?}", e)))?;
    project_database(&dbc)
}

/// Project a parsed DBC into the internal database model
///
/// Fails fast if the DBC lacks the network name or the physical-type
/// enumeration, or if two messages share a frame ID.
pub fn project_database(dbc: &can_dbc::DBC) -> Result<Database> {
    let name = network_name(dbc)?;
    let physical_types = physical_type_table(dbc)?;
    let default_type_code = default_type_code(dbc, &physical_types);

    let attributes = MessageAttributes::collect(dbc);
    let extra_transmitters = extra_transmitters(dbc);

    let mut messages = Vec::with_capacity(dbc.messages().len());
    let mut seen_ids: HashMap<u32, String> = HashMap::new();

    for dbc_msg in dbc.messages() {
        let message = convert_message(dbc_msg, &attributes, &extra_transmitters, default_type_code);

        if let Some(previous) = seen_ids.insert(message.frame_id, message.name.clone()) {
            return Err(GeneratorError::DuplicateFrameId {
                first: previous,
                second: message.name.clone(),
                frame_id: message.frame_id,
            });
        }

        messages.push(message);
    }

    log::info!(
        "Projected database '{}': {} messages, {} type names",
        name,
        messages.len(),
        physical_types.len()
    );

    Ok(Database {
        name,
        physical_types,
        messages,
    })
}

/// Per-message and per-signal vendor attribute values, keyed by the raw
/// arbitration ID as written in the DBC (marker bit included)
struct MessageAttributes {
    directions: HashMap<u32, i64>,
    instance_names: HashMap<u32, String>,
    type_codes: HashMap<(u32, String), i64>,
}

impl MessageAttributes {
    fn collect(dbc: &can_dbc::DBC) -> Self {
        let mut directions = HashMap::new();
        let mut instance_names = HashMap::new();
        let mut type_codes = HashMap::new();

        for attr in dbc.attribute_values() {
            match attr.attribute_value() {
                can_dbc::AttributeValuedForObjectType::MessageDefinitionAttributeValue(
                    id,
                    Some(value),
                ) => {
                    if attr.attribute_name() == DIRECTION_ATTRIBUTE {
                        if let Some(direction) = attribute_as_i64(value) {
                            directions.insert(id.0, direction);
                        }
                    } else if attr.attribute_name() == INSTANCE_NAME_ATTRIBUTE {
                        if let can_dbc::AttributeValue::AttributeValueCharString(name) = value {
                            if !name.is_empty() {
                                instance_names.insert(id.0, name.clone());
                            }
                        }
                    }
                }
                can_dbc::AttributeValuedForObjectType::SignalAttributeValue(
                    id,
                    signal_name,
                    value,
                ) => {
                    if attr.attribute_name() == VAR_TYPE_ATTRIBUTE {
                        if let Some(code) = attribute_as_i64(value) {
                            type_codes.insert((id.0, signal_name.clone()), code);
                        }
                    }
                }
                _ => {}
            }
        }

        Self {
            directions,
            instance_names,
            type_codes,
        }
    }
}

/// Extract the network name from the database-level name attribute
fn network_name(dbc: &can_dbc::DBC) -> Result<String> {
    for attr in dbc.attribute_values() {
        if attr.attribute_name() != NETWORK_NAME_ATTRIBUTE {
            continue;
        }
        if let can_dbc::AttributeValuedForObjectType::RawAttributeValue(
            can_dbc::AttributeValue::AttributeValueCharString(name),
        ) = attr.attribute_value()
        {
            if !name.is_empty() {
                return Ok(name.clone());
            }
        }
    }
    Err(GeneratorError::NoNetworkDefinition)
}

/// Extract the physical-type enumeration from the attribute definitions
fn physical_type_table(dbc: &can_dbc::DBC) -> Result<PhysicalTypeTable> {
    for definition in dbc.attribute_definitions() {
        let raw = match definition {
            can_dbc::AttributeDefinition::Signal(raw) => raw,
            _ => continue,
        };
        if let Some((name, choices)) = parse_enum_definition(raw) {
            if name == VAR_TYPE_ATTRIBUTE {
                return Ok(PhysicalTypeTable::new(choices));
            }
        }
    }
    Err(GeneratorError::MissingTypeEnumeration)
}

/// Resolve the database-level default type code, if one is declared
///
/// DBC tools write enumeration defaults as the choice string; older
/// exports write the numeric index directly. Both are accepted.
fn default_type_code(dbc: &can_dbc::DBC, types: &PhysicalTypeTable) -> Option<i64> {
    for default in dbc.attribute_defaults() {
        if default.attribute_name() != VAR_TYPE_ATTRIBUTE {
            continue;
        }
        let code = match default.attribute_value() {
            can_dbc::AttributeValue::AttributeValueCharString(choice) => {
                let code = types.code_for(choice);
                if code.is_none() {
                    log::warn!(
                        "Default type '{}' is not a declared type name, ignoring",
                        choice
                    );
                }
                code
            }
            other => attribute_as_i64(other),
        };
        if code.is_some() {
            return code;
        }
    }
    None
}

/// Collect extra transmitter nodes declared separately from the message
fn extra_transmitters(dbc: &can_dbc::DBC) -> HashMap<u32, Vec<String>> {
    let mut extras: HashMap<u32, Vec<String>> = HashMap::new();
    for entry in dbc.message_transmitters() {
        let nodes = extras.entry(entry.message_id().0).or_default();
        for transmitter in entry.transmitter() {
            if let can_dbc::Transmitter::NodeName(node) = transmitter {
                if !nodes.contains(node) {
                    nodes.push(node.clone());
                }
            }
        }
    }
    extras
}

/// Convert a can-dbc message into the internal model
fn convert_message(
    dbc_msg: &can_dbc::Message,
    attributes: &MessageAttributes,
    extra_transmitters: &HashMap<u32, Vec<String>>,
    default_type_code: Option<i64>,
) -> Message {
    let raw_id = dbc_msg.message_id().0;
    let frame_id = raw_id & !EXTENDED_ID_FLAG;
    let is_extended = raw_id & EXTENDED_ID_FLAG != 0;

    let mut senders = Vec::new();
    if let can_dbc::Transmitter::NodeName(node) = dbc_msg.transmitter() {
        senders.push(node.clone());
    }
    if let Some(extras) = extra_transmitters.get(&raw_id) {
        for node in extras {
            if !senders.contains(node) {
                senders.push(node.clone());
            }
        }
    }

    // Receiver sets are declared per signal; the message-level set is
    // their union in first-seen order
    let mut receivers: Vec<String> = Vec::new();
    let mut signals = Vec::with_capacity(dbc_msg.signals().len());

    for dbc_sig in dbc_msg.signals() {
        for node in dbc_sig.receivers() {
            if node != UNASSIGNED_NODE && !receivers.contains(node) {
                receivers.push(node.clone());
            }
        }
        signals.push(convert_signal(dbc_sig, raw_id, attributes, default_type_code));
    }

    Message {
        name: dbc_msg.message_name().to_string(),
        frame_id,
        is_extended,
        instance_name: attributes.instance_names.get(&raw_id).cloned(),
        direction_attr: attributes.directions.get(&raw_id).copied(),
        senders,
        receivers,
        signals,
    }
}

/// Convert a can-dbc signal into the internal model
fn convert_signal(
    dbc_sig: &can_dbc::Signal,
    raw_id: u32,
    attributes: &MessageAttributes,
    default_type_code: Option<i64>,
) -> Signal {
    let byte_order = match *dbc_sig.byte_order() {
        can_dbc::ByteOrder::LittleEndian => ByteOrder::LittleEndian,
        can_dbc::ByteOrder::BigEndian => ByteOrder::BigEndian,
    };

    let is_signed = matches!(*dbc_sig.value_type(), can_dbc::ValueType::Signed);

    let type_code = attributes
        .type_codes
        .get(&(raw_id, dbc_sig.name().to_string()))
        .copied()
        .or(default_type_code);

    Signal {
        name: dbc_sig.name().to_string(),
        bit_start: *dbc_sig.start_bit() as u16,
        bit_length: *dbc_sig.signal_size() as u16,
        byte_order,
        is_signed,
        scale: *dbc_sig.factor(),
        offset: *dbc_sig.offset(),
        type_code,
    }
}

/// Interpret an attribute value as an integer
///
/// can-dbc parses bare numbers as floats, so integral floats are accepted.
fn attribute_as_i64(value: &can_dbc::AttributeValue) -> Option<i64> {
    match value {
        can_dbc::AttributeValue::AttributeValueU64(v) => i64::try_from(*v).ok(),
        can_dbc::AttributeValue::AttributeValueI64(v) => Some(*v),
        can_dbc::AttributeValue::AttributeValueF64(v) if v.fract() == 0.0 => Some(*v as i64),
        _ => None,
    }
}

/// Split an enumeration attribute definition into its name and choices
///
/// The raw text looks like `"CG_VarType" ENUM  "uint8_t","uint16_t"`.
/// Returns `None` for non-enumeration definitions.
fn parse_enum_definition(raw: &str) -> Option<(String, Vec<String>)> {
    let (name, rest) = take_quoted(raw.trim_start())?;
    let rest = rest.trim_start().strip_prefix("ENUM")?;

    let mut choices = Vec::new();
    let mut rest = rest;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if !rest.starts_with('"') {
            break;
        }
        let (choice, tail) = take_quoted(rest)?;
        choices.push(choice);
        rest = tail;
    }

    if choices.is_empty() {
        None
    } else {
        Some((name, choices))
    }
}

/// Take a leading double-quoted string, returning it and the remainder
fn take_quoted(s: &str) -> Option<(String, &str)> {
    let rest = s.strip_prefix('"')?;
    let end = rest.find('"')?;
    Some((rest[..end].to_string(), &rest[end + 1..]))
}
