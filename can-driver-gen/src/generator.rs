//! Main generator API
//!
//! This module provides the primary interface for the generator library.
//! The Generator struct is the entry point: load a database, then resolve
//! it into a complete `DriverSpec`. Resolution is fail-fast: the first
//! structural problem aborts the run, so a returned specification is
//! always complete and internally consistent.

use std::collections::HashMap;
use std::path::Path;

use crate::classify::classify;
use crate::config::GeneratorConfig;
use crate::database::{self, Database, Message};
use crate::layout::{check_overlap, resolve_layout};
use crate::transform::resolve_transform;
use crate::types::{
    AccessorKind, AccessorSpec, Direction, DriverSpec, FieldSpec, GeneratorError, MessageIdEntry,
    MessageSpec, Result,
};

/// The main generator struct - entry point for driver generation
pub struct Generator {
    /// The projected database driving the generation
    database: Database,
}

impl Generator {
    /// Create a generator from an already projected database
    pub fn from_database(database: Database) -> Self {
        Self { database }
    }

    /// Load a DBC file and create a generator for it
    ///
    /// # Arguments
    /// * `path` - Path to the DBC file
    ///
    /// # Example
    /// ```no_run
    /// use can_driver_gen::Generator;
    /// use std::path::Path;
    ///
    /// let generator = Generator::from_dbc_file(Path::new("ebtm.dbc")).unwrap();
    /// ```
    pub fn from_dbc_file(path: &Path) -> Result<Self> {
        Ok(Self {
            database: database::dbc::load_dbc_file(path)?,
        })
    }

    /// Parse DBC text and create a generator for it
    pub fn from_dbc_str(content: &str) -> Result<Self> {
        Ok(Self {
            database: database::dbc::parse_dbc(content)?,
        })
    }

    /// Access the projected database
    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Resolve the complete driver specification
    ///
    /// Classifies messages under the configured direction policy, resolves
    /// the storage layout and value transform of every signal, and
    /// assembles the result. Declaration order is preserved throughout.
    ///
    /// # Arguments
    /// * `config` - Generation configuration (direction policy)
    ///
    /// # Returns
    /// * `Result<DriverSpec>` - The resolved specification, or the first
    ///   error encountered
    pub fn generate(&self, config: &GeneratorConfig) -> Result<DriverSpec> {
        if self.database.messages.is_empty() {
            return Err(GeneratorError::EmptyDatabase);
        }

        log::info!(
            "Generating driver '{}' from {} messages",
            self.database.name,
            self.database.messages.len()
        );

        let classified = classify(&self.database, &config.direction_policy)?;
        if classified.is_empty() {
            log::warn!(
                "No message of '{}' survived classification, the driver will be empty",
                self.database.name
            );
        }

        let mut message_ids = Vec::with_capacity(classified.len());
        let mut tx_messages = Vec::new();
        let mut rx_messages = Vec::new();
        let mut seen_ids: HashMap<u32, String> = HashMap::new();

        for entry in &classified {
            let message = entry.message;

            // The adapter already rejects duplicate IDs across the whole
            // database; this re-checks the surviving set so hand-built
            // databases get the same guarantee
            if let Some(previous) = seen_ids.insert(message.frame_id, message.name.clone()) {
                return Err(GeneratorError::DuplicateFrameId {
                    first: previous,
                    second: message.name.clone(),
                    frame_id: message.frame_id,
                });
            }

            message_ids.push(MessageIdEntry {
                label: message.id_label(),
                frame_id: message.frame_id,
            });

            let spec = self.resolve_message(message, entry.direction)?;
            match entry.direction {
                Direction::Tx => tx_messages.push(spec),
                Direction::Rx => rx_messages.push(spec),
            }
        }

        log::info!(
            "Driver '{}' resolved: {} TX messages, {} RX messages",
            self.database.name,
            tx_messages.len(),
            rx_messages.len()
        );

        Ok(DriverSpec {
            driver_name: self.database.name.clone(),
            message_ids,
            tx_messages,
            rx_messages,
        })
    }

    /// Resolve the field and accessor lists for one classified message
    fn resolve_message(&self, message: &Message, direction: Direction) -> Result<MessageSpec> {
        let mut fields = Vec::with_capacity(message.signals.len());
        for signal in &message.signals {
            fields.push(FieldSpec {
                signal_name: signal.name.clone(),
                layout: resolve_layout(signal)?,
            });
        }
        check_overlap(&message.name, &fields)?;

        let kind = match direction {
            Direction::Tx => AccessorKind::Setter,
            Direction::Rx => AccessorKind::Getter,
        };

        let mut accessors = Vec::with_capacity(message.signals.len());
        for signal in &message.signals {
            let transform = resolve_transform(signal)?;

            let code = signal
                .type_code
                .ok_or_else(|| GeneratorError::MissingTypeCode {
                    signal: signal.name.clone(),
                })?;
            let physical_type = self
                .database
                .physical_types
                .name_for(code)
                .ok_or_else(|| GeneratorError::UnknownTypeCode {
                    signal: signal.name.clone(),
                    code,
                })?
                .to_string();

            accessors.push(AccessorSpec {
                signal_name: signal.name.clone(),
                physical_type,
                kind,
                transform,
            });
        }

        Ok(MessageSpec {
            name: message.name.clone(),
            id_label: message.id_label(),
            instance_name: message.member_name(),
            frame_id: message.frame_id,
            is_extended: message.is_extended,
            direction,
            fields,
            accessors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::{ByteOrder, PhysicalTypeTable, Signal};
    use crate::transform::TransformForm;

    fn signal(name: &str, bit_start: u16, bit_length: u16, scale: f64, offset: f64) -> Signal {
        Signal {
            name: name.to_string(),
            bit_start,
            bit_length,
            byte_order: ByteOrder::LittleEndian,
            is_signed: false,
            scale,
            offset,
            type_code: Some(0),
        }
    }

    fn message(name: &str, frame_id: u32, direction_attr: Option<i64>, signals: Vec<Signal>) -> Message {
        Message {
            name: name.to_string(),
            frame_id,
            is_extended: false,
            instance_name: None,
            direction_attr,
            senders: Vec::new(),
            receivers: Vec::new(),
            signals,
        }
    }

    fn database(messages: Vec<Message>) -> Database {
        Database {
            name: "TEST".to_string(),
            physical_types: PhysicalTypeTable::new(vec![
                "uint8_t".to_string(),
                "float".to_string(),
            ]),
            messages,
        }
    }

    #[test]
    fn test_empty_database_rejected() {
        let generator = Generator::from_database(database(Vec::new()));
        let err = generator
            .generate(&GeneratorConfig::attribute_directions())
            .unwrap_err();
        assert!(matches!(err, GeneratorError::EmptyDatabase));
    }

    #[test]
    fn test_assembly_preserves_order_and_direction() {
        let generator = Generator::from_database(database(vec![
            message("A", 1, Some(1), vec![signal("S1", 0, 8, 1.0, 0.0)]),
            message("B", 2, Some(0), vec![signal("S2", 0, 8, 1.0, 0.0)]),
            message("C", 3, Some(1), vec![signal("S3", 0, 8, 1.0, 0.0)]),
        ]));

        let spec = generator
            .generate(&GeneratorConfig::attribute_directions())
            .unwrap();

        // ID entries cover all survivors in declaration order
        let labels: Vec<&str> = spec.message_ids.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);

        let tx_names: Vec<&str> = spec.tx_messages.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(tx_names, vec!["A", "C"]);
        let rx_names: Vec<&str> = spec.rx_messages.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(rx_names, vec!["B"]);

        // TX messages get setters, RX messages get getters
        assert_eq!(spec.tx_messages[0].accessors[0].kind, AccessorKind::Setter);
        assert_eq!(spec.rx_messages[0].accessors[0].kind, AccessorKind::Getter);
    }

    #[test]
    fn test_fail_fast_on_zero_scale() {
        let generator = Generator::from_database(database(vec![
            message("Good", 1, Some(1), vec![signal("S1", 0, 8, 1.0, 0.0)]),
            message("Bad", 2, Some(1), vec![signal("S2", 0, 8, 0.0, 0.0)]),
        ]));

        let err = generator
            .generate(&GeneratorConfig::attribute_directions())
            .unwrap_err();
        assert!(matches!(err, GeneratorError::ZeroScale { .. }));
    }

    #[test]
    fn test_fail_fast_on_overlap() {
        let generator = Generator::from_database(database(vec![message(
            "M",
            1,
            Some(0),
            vec![
                signal("S1", 0, 8, 1.0, 0.0),
                signal("S2", 4, 8, 1.0, 0.0),
            ],
        )]));

        let err = generator
            .generate(&GeneratorConfig::attribute_directions())
            .unwrap_err();
        assert!(matches!(err, GeneratorError::OverlappingSignals { .. }));
    }

    #[test]
    fn test_unknown_type_code() {
        let mut bad = signal("S1", 0, 8, 1.0, 0.0);
        bad.type_code = Some(7);
        let generator =
            Generator::from_database(database(vec![message("M", 1, Some(0), vec![bad])]));

        let err = generator
            .generate(&GeneratorConfig::attribute_directions())
            .unwrap_err();
        match err {
            GeneratorError::UnknownTypeCode { signal, code } => {
                assert_eq!(signal, "S1");
                assert_eq!(code, 7);
            }
            other => panic!("expected UnknownTypeCode, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_type_code() {
        let mut bare = signal("S1", 0, 8, 1.0, 0.0);
        bare.type_code = None;
        let generator =
            Generator::from_database(database(vec![message("M", 1, Some(0), vec![bare])]));

        let err = generator
            .generate(&GeneratorConfig::attribute_directions())
            .unwrap_err();
        assert!(matches!(err, GeneratorError::MissingTypeCode { .. }));
    }

    #[test]
    fn test_duplicate_frame_id_over_survivors() {
        let generator = Generator::from_database(database(vec![
            message("First", 5, Some(1), vec![signal("S1", 0, 8, 1.0, 0.0)]),
            message("Second", 5, Some(0), vec![signal("S2", 0, 8, 1.0, 0.0)]),
        ]));

        let err = generator
            .generate(&GeneratorConfig::attribute_directions())
            .unwrap_err();
        assert!(matches!(err, GeneratorError::DuplicateFrameId { .. }));
    }

    #[test]
    fn test_transform_and_type_resolution() {
        let mut sig = signal("Temp", 0, 11, 0.03125, -273.0);
        sig.type_code = Some(1);
        let generator =
            Generator::from_database(database(vec![message("M", 1, Some(0), vec![sig])]));

        let spec = generator
            .generate(&GeneratorConfig::attribute_directions())
            .unwrap();
        let accessor = &spec.rx_messages[0].accessors[0];
        assert_eq!(accessor.physical_type, "float");
        assert_eq!(accessor.transform.form, TransformForm::Affine);
        assert_eq!(accessor.transform.scale, 0.03125);
    }

    #[test]
    fn test_all_excluded_yields_empty_spec() {
        let generator = Generator::from_database(database(vec![message(
            "Unrelated",
            1,
            None,
            vec![signal("S1", 0, 8, 1.0, 0.0)],
        )]));

        let config = GeneratorConfig::membership_directions("FVT_ECU");
        let spec = generator.generate(&config).unwrap();
        assert_eq!(spec.message_count(), 0);
        assert!(spec.message_ids.is_empty());
    }
}
