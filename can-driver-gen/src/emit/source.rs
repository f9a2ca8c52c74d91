//! Driver source emitter
//!
//! Renders the C++ source: message constructors and destructors, the
//! transmit/receive payload handlers, the device constructor wiring every
//! message member to its frame ID, and the accessor definitions with the
//! resolved conversion formulas.

use super::{accessor_signature, decode_expr, encode_expr, member_name, payload_struct, storage_type};
use crate::types::{Direction, DriverSpec, MessageSpec};

/// Render the complete driver source
pub fn render_source(spec: &DriverSpec) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "#include \"../inc/{}.h\"\n\n",
        spec.driver_name.to_lowercase()
    ));
    out.push_str("using namespace std;\nusing namespace common_lib;\nusing namespace driver_lib;\n\n");

    push_section(&mut out, "TX Constructors");
    for message in &spec.tx_messages {
        push_constructor(&mut out, spec, message);
    }

    push_section(&mut out, "TX Destructors");
    for message in &spec.tx_messages {
        push_destructor(&mut out, spec, message);
    }

    push_section(&mut out, "Transmit Handlers");
    for message in &spec.tx_messages {
        push_transmit_handler(&mut out, spec, message);
    }

    push_section(&mut out, "RX Constructors");
    for message in &spec.rx_messages {
        push_constructor(&mut out, spec, message);
    }

    push_section(&mut out, "RX Destructors");
    for message in &spec.rx_messages {
        push_destructor(&mut out, spec, message);
    }

    push_section(&mut out, "Receive Handlers");
    for message in &spec.rx_messages {
        push_receive_handler(&mut out, spec, message);
    }

    push_section(&mut out, "Device Constructor");
    push_device_constructor(&mut out, spec);

    push_section(&mut out, "Device Destructor");
    out.push_str(&format!(
        "{}::~{}()\n{{\n}}\n\n",
        spec.driver_name, spec.driver_name
    ));

    push_section(&mut out, "Setters");
    for message in &spec.tx_messages {
        push_accessors(&mut out, spec, message);
    }

    push_section(&mut out, "Getters");
    for message in &spec.rx_messages {
        push_accessors(&mut out, spec, message);
    }

    out
}

fn push_section(out: &mut String, title: &str) {
    out.push_str("// =====================================================\n");
    out.push_str(&format!("// {}\n", title));
}

/// Base-class name and timing parameter for a message's constructor
fn constructor_parts(message: &MessageSpec) -> (&'static str, &'static str) {
    match message.direction {
        Direction::Tx => ("CanTxMessage", "_cycle_time"),
        Direction::Rx => ("CanRxMessage", "_timeout"),
    }
}

fn push_constructor(out: &mut String, spec: &DriverSpec, message: &MessageSpec) {
    let (base_class, timing_arg) = constructor_parts(message);
    out.push_str(&format!(
        "{}::{}::{}(\n    const uint32_t &_can_id,\n    const uint8_t &_channel,\n    const uint8_t &_frame_type,\n    const uint32_t &{})\n    : {}(_can_id, _channel, _frame_type, {}), data_{{}}\n{{\n}}\n\n",
        spec.driver_name, message.name, message.name, timing_arg, base_class, timing_arg
    ));
}

fn push_destructor(out: &mut String, spec: &DriverSpec, message: &MessageSpec) {
    out.push_str(&format!(
        "{}::{}::~{}()\n{{\n}}\n\n",
        spec.driver_name, message.name, message.name
    ));
}

fn push_transmit_handler(out: &mut String, spec: &DriverSpec, message: &MessageSpec) {
    let payload = payload_struct(message);
    out.push_str(&format!(
        "void {}::{}::set_data()\n{{\n  {} buffer = data_;\n  memcpy(can_frame.data, &buffer, sizeof({}));\n}}\n\n",
        spec.driver_name, message.name, payload, payload
    ));
}

fn push_receive_handler(out: &mut String, spec: &DriverSpec, message: &MessageSpec) {
    out.push_str(&format!(
        "void {}::{}::receive_handler(const can_word_t *data)\n{{\n  memcpy(&data_, data, sizeof({}));\n}}\n\n",
        spec.driver_name, message.name, payload_struct(message)
    ));
}

/// Emit the device constructor with one initializer per message member
///
/// Transmitted messages are wired with the cycle-time constant, received
/// ones with the timeout constant; the frame-type macro follows the
/// declared frame format.
fn push_device_constructor(out: &mut String, spec: &DriverSpec) {
    let initializers: Vec<String> = spec
        .all_messages()
        .map(|message| {
            let frame_type = if message.is_extended {
                "IO_CAN_EXT_FRAME"
            } else {
                "IO_CAN_STD_FRAME"
            };
            let timing = match message.direction {
                Direction::Tx => "_CYCLE_TIME",
                Direction::Rx => "_TIMEOUT",
            };
            format!(
                "{}({}_ID, _channel, {}, {})",
                member_name(message),
                message.id_label,
                frame_type,
                timing
            )
        })
        .collect();

    out.push_str(&format!(
        "{}::{}(const uint8_t &_channel)\n",
        spec.driver_name, spec.driver_name
    ));
    for (idx, initializer) in initializers.iter().enumerate() {
        let lead = if idx == 0 { "    : " } else { "      " };
        let tail = if idx + 1 == initializers.len() { "" } else { "," };
        out.push_str(&format!("{}{}{}\n", lead, initializer, tail));
    }
    out.push_str("{\n}\n\n");
}

/// Emit the accessor definitions for one message
fn push_accessors(out: &mut String, spec: &DriverSpec, message: &MessageSpec) {
    let qualifier = format!("{}::", spec.driver_name);
    let member = member_name(message);

    for (field, accessor) in message.fields.iter().zip(&message.accessors) {
        let signature = accessor_signature(accessor, &qualifier);
        let field_access = format!("{}.data_.{}", member, field.signal_name);

        let body = match message.direction {
            Direction::Tx => format!(
                "  {} = {};",
                field_access,
                encode_expr(&accessor.transform, storage_type(&field.layout))
            ),
            Direction::Rx => format!(
                "  return {};",
                decode_expr(&accessor.transform, &field_access, &accessor.physical_type)
            ),
        };

        out.push_str(&format!("{}\n{{\n{}\n}}\n\n", signature, body));
    }
}
