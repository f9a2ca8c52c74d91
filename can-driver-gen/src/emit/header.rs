//! Driver header emitter
//!
//! Renders the C++ header: one nested message class per handled message
//! with its packed payload struct, the frame-ID enumeration, and the
//! public setter/getter surface of the driver class.

use super::{accessor_signature, hex_id, member_name, payload_struct, storage_type};
use crate::types::{Direction, DriverSpec, MessageSpec};

/// Render the complete driver header
pub fn render_header(spec: &DriverSpec) -> String {
    let mut out = String::new();
    let guard = format!("__{}_H_", spec.driver_name.to_uppercase());

    out.push_str(&format!("#ifndef {}\n#define {}\n\n", guard, guard));
    out.push_str("#include <can_service.h>\n");
    out.push_str("#include <stddef.h>\n");
    out.push_str("#include <stdint.h>\n\n");
    out.push_str("namespace driver_lib\n{\n");
    out.push_str(&format!("class {}\n{{\n", spec.driver_name));

    for message in spec.all_messages() {
        push_message_class(&mut out, &spec.driver_name, message);
    }

    push_id_enum(&mut out, spec);

    out.push_str(&format!(
        "    {}(const uint8_t &_channel);\n    ~{}();\n\n",
        spec.driver_name, spec.driver_name
    ));

    out.push_str("    //====================================================\n");
    out.push_str("    // Setters\n");
    for message in &spec.tx_messages {
        for accessor in &message.accessors {
            out.push_str(&format!("    {};\n", accessor_signature(accessor, "")));
        }
    }

    out.push_str("\n    //====================================================\n");
    out.push_str("    // Getters\n");
    for message in &spec.rx_messages {
        for accessor in &message.accessors {
            out.push_str(&format!("    {};\n", accessor_signature(accessor, "")));
        }
    }

    out.push_str("\n  private:\n");
    for message in spec.all_messages() {
        out.push_str(&format!(
            "    {} {};\n",
            message.name,
            member_name(message)
        ));
    }

    out.push_str("};\n};\n\n#endif\n");
    out
}

/// Emit the nested class declaration for one message
fn push_message_class(out: &mut String, driver_name: &str, message: &MessageSpec) {
    let (base_class, timing_arg, hook) = match message.direction {
        Direction::Tx => (
            "CanTxMessage",
            "_cycle_time",
            "virtual void set_data() override;",
        ),
        Direction::Rx => (
            "CanRxMessage",
            "_timeout",
            "virtual void receive_handler(const common_lib::can_word_t *data) override;",
        ),
    };

    out.push_str(&format!(
        "    class {} : public common_lib::{}\n    {{\n        friend class {};\n\n      public:\n",
        message.name, base_class, driver_name
    ));
    out.push_str(&format!(
        "        {}(\n          const uint32_t &_can_id,\n          const uint8_t &_channel,\n          const uint8_t &_frame_type,\n          const uint32_t &{});\n\n",
        message.name, timing_arg
    ));
    out.push_str(&format!("        ~{}();\n\n", message.name));
    out.push_str(&format!("        {}\n\n", hook));

    out.push_str(&format!(
        "      private:\n        struct {}\n        {{\n",
        payload_struct(message)
    ));
    for field in &message.fields {
        out.push_str(&format!(
            "          {}  {} : {};\n",
            storage_type(&field.layout),
            field.signal_name,
            field.layout.bit_length
        ));
    }
    out.push_str("        } data_;\n    };\n\n");
}

/// Emit the public frame-ID enumeration
fn push_id_enum(out: &mut String, spec: &DriverSpec) {
    out.push_str("  public:\n    typedef enum\n    {\n");
    for entry in &spec.message_ids {
        out.push_str(&format!(
            "      {}_ID = {},\n",
            entry.label,
            hex_id(entry.frame_id)
        ));
    }
    out.push_str("    } message_ids;\n\n");
}
