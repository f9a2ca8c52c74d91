//! Driver code emitters
//!
//! Deterministic text renderers turning a resolved `DriverSpec` into a
//! C++ driver class header and source pair. Both emitters draw their
//! names, type spellings, and conversion formulas from the helpers in
//! this module, so a declaration in the header and its definition in the
//! source cannot drift apart.

pub mod header;
pub mod source;

// Re-export the entry points for convenience
pub use header::render_header;
pub use source::render_source;

use crate::layout::{ResolvedLayout, StorageWidth};
use crate::transform::{ResolvedTransform, TransformForm};
use crate::types::{AccessorKind, AccessorSpec, MessageSpec};

/// C storage type spelling for a resolved layout
fn storage_type(layout: &ResolvedLayout) -> &'static str {
    match (layout.storage_width, layout.storage_signed) {
        (StorageWidth::W8, false) => "uint8_t",
        (StorageWidth::W8, true) => "int8_t",
        (StorageWidth::W16, false) => "uint16_t",
        (StorageWidth::W16, true) => "int16_t",
        (StorageWidth::W32, false) => "uint32_t",
        (StorageWidth::W32, true) => "int32_t",
        (StorageWidth::W64, false) => "uint64_t",
        (StorageWidth::W64, true) => "int64_t",
    }
}

/// Name of the packed payload struct of a message
fn payload_struct(message: &MessageSpec) -> String {
    format!("{}_t", message.instance_name)
}

/// Name of the driver's member variable for a message
fn member_name(message: &MessageSpec) -> String {
    format!("{}_", message.instance_name)
}

/// Frame ID literal with uppercase hex digits
fn hex_id(frame_id: u32) -> String {
    format!("0x{:X}", frame_id)
}

/// Float literal that stays floating-point in C++ arithmetic
///
/// Integral values get an explicit decimal point so expressions like
/// `value / 2.0` never degrade to integer division.
fn float_literal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Accessor signature, shared between declaration and definition
///
/// `qualifier` is empty for the in-class declaration and `"Driver::"`
/// for the out-of-class definition.
fn accessor_signature(accessor: &AccessorSpec, qualifier: &str) -> String {
    match accessor.kind {
        AccessorKind::Setter => format!(
            "void {}set_{}(const {} &value)",
            qualifier, accessor.signal_name, accessor.physical_type
        ),
        AccessorKind::Getter => format!(
            "{} {}get_{}()",
            accessor.physical_type, qualifier, accessor.signal_name
        ),
    }
}

/// Right-hand side a setter stores: the physical `value` encoded to raw
///
/// The cast to the storage type truncates toward zero, which is the
/// narrowing behavior the drivers rely on.
fn encode_expr(transform: &ResolvedTransform, storage: &str) -> String {
    let raw = match transform.form {
        TransformForm::Identity => "value".to_string(),
        TransformForm::OffsetOnly => format!("value - {}", float_literal(transform.offset)),
        TransformForm::ScaleOnly => format!("value / {}", float_literal(transform.scale)),
        TransformForm::Affine => format!(
            "(value - {}) / {}",
            float_literal(transform.offset),
            float_literal(transform.scale)
        ),
    };
    format!("static_cast<{}>({})", storage, raw)
}

/// Expression a getter returns: the raw field decoded to physical units
fn decode_expr(transform: &ResolvedTransform, field: &str, physical_type: &str) -> String {
    let physical = match transform.form {
        TransformForm::Identity => field.to_string(),
        TransformForm::OffsetOnly => format!("{} + {}", field, float_literal(transform.offset)),
        TransformForm::ScaleOnly => format!("{} * {}", field, float_literal(transform.scale)),
        TransformForm::Affine => format!(
            "{} * {} + {}",
            field,
            float_literal(transform.scale),
            float_literal(transform.offset)
        ),
    };
    format!("static_cast<{}>({})", physical_type, physical)
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use crate::database::ByteOrder;
    use crate::layout::{ResolvedLayout, StorageWidth};
    use crate::transform::{ResolvedTransform, TransformForm};
    use crate::types::{
        AccessorKind, AccessorSpec, Direction, DriverSpec, FieldSpec, MessageIdEntry, MessageSpec,
    };

    fn layout(width: StorageWidth, offset: i32, length: u16) -> ResolvedLayout {
        ResolvedLayout {
            storage_width: width,
            storage_signed: false,
            endianness: ByteOrder::LittleEndian,
            normalized_bit_offset: offset,
            bit_length: length,
        }
    }

    /// A two-message specification exercising both directions, both frame
    /// formats, and three transform shapes
    pub(crate) fn sample_spec() -> DriverSpec {
        let tx = MessageSpec {
            name: "TmsCommand".to_string(),
            id_label: "TMS_COMMAND".to_string(),
            instance_name: "tms_command".to_string(),
            frame_id: 0x18FF8283,
            is_extended: true,
            direction: Direction::Tx,
            fields: vec![FieldSpec {
                signal_name: "TAct_J1993".to_string(),
                layout: layout(StorageWidth::W16, 16, 11),
            }],
            accessors: vec![AccessorSpec {
                signal_name: "TAct_J1993".to_string(),
                physical_type: "float".to_string(),
                kind: AccessorKind::Setter,
                transform: ResolvedTransform {
                    form: TransformForm::Affine,
                    scale: 0.03125,
                    offset: -273.0,
                },
            }],
        };

        let rx = MessageSpec {
            name: "EbtmStatus".to_string(),
            id_label: "EBTMSTATUS".to_string(),
            instance_name: "ebtmstatus".to_string(),
            frame_id: 0x123,
            is_extended: false,
            direction: Direction::Rx,
            fields: vec![
                FieldSpec {
                    signal_name: "StatusFlags".to_string(),
                    layout: layout(StorageWidth::W8, 0, 8),
                },
                FieldSpec {
                    signal_name: "CoolantTemp".to_string(),
                    layout: layout(StorageWidth::W8, 8, 8),
                },
            ],
            accessors: vec![
                AccessorSpec {
                    signal_name: "StatusFlags".to_string(),
                    physical_type: "uint8_t".to_string(),
                    kind: AccessorKind::Getter,
                    transform: ResolvedTransform {
                        form: TransformForm::Identity,
                        scale: 1.0,
                        offset: 0.0,
                    },
                },
                AccessorSpec {
                    signal_name: "CoolantTemp".to_string(),
                    physical_type: "float".to_string(),
                    kind: AccessorKind::Getter,
                    transform: ResolvedTransform {
                        form: TransformForm::OffsetOnly,
                        scale: 1.0,
                        offset: -40.0,
                    },
                },
            ],
        };

        DriverSpec {
            driver_name: "EBTM".to_string(),
            message_ids: vec![
                MessageIdEntry {
                    label: "TMS_COMMAND".to_string(),
                    frame_id: 0x18FF8283,
                },
                MessageIdEntry {
                    label: "EBTMSTATUS".to_string(),
                    frame_id: 0x123,
                },
            ],
            tx_messages: vec![tx],
            rx_messages: vec![rx],
        }
    }
}
