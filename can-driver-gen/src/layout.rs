//! Bit-layout resolution
//!
//! Resolves each signal into a concrete storage slot: the narrowest
//! conventional integer width that holds it, its signedness, and its
//! position normalized into a single linear bit space. Big-endian start
//! bits in CAN databases mark the most significant bit, so they are
//! rebased by subtracting 7 to get the least-significant-bit offset the
//! packed layout counts from. An off-by-one here corrupts every
//! big-endian signal in the generated driver.

use serde::Serialize;

use crate::database::{ByteOrder, Signal};
use crate::types::{FieldSpec, GeneratorError, Result};

/// Storage widths available for packed payload fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum StorageWidth {
    W8,
    W16,
    W32,
    W64,
}

impl StorageWidth {
    /// Width in bits
    pub fn bits(self) -> u16 {
        match self {
            StorageWidth::W8 => 8,
            StorageWidth::W16 => 16,
            StorageWidth::W32 => 32,
            StorageWidth::W64 => 64,
        }
    }

    /// Narrowest width that holds a signal of the given bit length
    fn for_length(bits: u16) -> Option<StorageWidth> {
        match bits {
            1..=8 => Some(StorageWidth::W8),
            9..=16 => Some(StorageWidth::W16),
            17..=32 => Some(StorageWidth::W32),
            33..=64 => Some(StorageWidth::W64),
            _ => None,
        }
    }
}

/// A signal's resolved storage slot within its message payload
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResolvedLayout {
    /// Narrowest storage width holding the signal
    pub storage_width: StorageWidth,
    /// True if the storage type is signed
    pub storage_signed: bool,
    /// Byte order the signal uses on the wire
    pub endianness: ByteOrder,
    /// Offset of the least significant bit in the linear payload bit space.
    /// Negative values can occur for big-endian signals declared near the
    /// start of the payload.
    pub normalized_bit_offset: i32,
    /// Length in bits
    pub bit_length: u16,
}

/// Resolve the storage slot for one signal
pub fn resolve_layout(signal: &Signal) -> Result<ResolvedLayout> {
    if signal.bit_length == 0 {
        return Err(GeneratorError::ZeroWidthSignal {
            signal: signal.name.clone(),
        });
    }

    let storage_width = StorageWidth::for_length(signal.bit_length).ok_or_else(|| {
        GeneratorError::SignalTooWide {
            signal: signal.name.clone(),
            bits: signal.bit_length,
        }
    })?;

    let normalized_bit_offset = match signal.byte_order {
        ByteOrder::LittleEndian => i32::from(signal.bit_start),
        // The declared start bit is the MSB; rebase to the LSB offset
        ByteOrder::BigEndian => i32::from(signal.bit_start) - 7,
    };

    Ok(ResolvedLayout {
        storage_width,
        storage_signed: signal.is_signed,
        endianness: signal.byte_order,
        normalized_bit_offset,
        bit_length: signal.bit_length,
    })
}

/// Check that no two fields of a message claim the same payload bits
///
/// Fields are compared pairwise in declaration order and the first
/// intersecting pair is reported.
pub fn check_overlap(message: &str, fields: &[FieldSpec]) -> Result<()> {
    for (idx, first) in fields.iter().enumerate() {
        let first_start = i64::from(first.layout.normalized_bit_offset);
        let first_end = first_start + i64::from(first.layout.bit_length);

        for second in &fields[idx + 1..] {
            let second_start = i64::from(second.layout.normalized_bit_offset);
            let second_end = second_start + i64::from(second.layout.bit_length);

            if first_start < second_end && second_start < first_end {
                return Err(GeneratorError::OverlappingSignals {
                    message: message.to_string(),
                    first: first.signal_name.clone(),
                    second: second.signal_name.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(name: &str, bit_start: u16, bit_length: u16, byte_order: ByteOrder) -> Signal {
        Signal {
            name: name.to_string(),
            bit_start,
            bit_length,
            byte_order,
            is_signed: false,
            scale: 1.0,
            offset: 0.0,
            type_code: Some(0),
        }
    }

    fn field(signal: &Signal) -> FieldSpec {
        FieldSpec {
            signal_name: signal.name.clone(),
            layout: resolve_layout(signal).unwrap(),
        }
    }

    #[test]
    fn test_storage_ladder() {
        let cases = [
            (1, StorageWidth::W8),
            (8, StorageWidth::W8),
            (9, StorageWidth::W16),
            (16, StorageWidth::W16),
            (17, StorageWidth::W32),
            (32, StorageWidth::W32),
            (33, StorageWidth::W64),
            (64, StorageWidth::W64),
        ];
        for (bits, expected) in cases {
            let layout = resolve_layout(&signal("S", 0, bits, ByteOrder::LittleEndian)).unwrap();
            assert_eq!(layout.storage_width, expected, "{} bits", bits);
        }
    }

    #[test]
    fn test_too_wide_signal() {
        let err = resolve_layout(&signal("Wide", 0, 65, ByteOrder::LittleEndian)).unwrap_err();
        match err {
            GeneratorError::SignalTooWide { signal, bits } => {
                assert_eq!(signal, "Wide");
                assert_eq!(bits, 65);
            }
            other => panic!("expected SignalTooWide, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_width_signal() {
        let err = resolve_layout(&signal("Empty", 0, 0, ByteOrder::LittleEndian)).unwrap_err();
        assert!(matches!(err, GeneratorError::ZeroWidthSignal { .. }));
    }

    #[test]
    fn test_little_endian_offset_unchanged() {
        let layout = resolve_layout(&signal("S", 16, 11, ByteOrder::LittleEndian)).unwrap();
        assert_eq!(layout.normalized_bit_offset, 16);
    }

    #[test]
    fn test_big_endian_rebase() {
        // MSB at bit 15 means the LSB sits at bit 8
        let layout = resolve_layout(&signal("S", 15, 8, ByteOrder::BigEndian)).unwrap();
        assert_eq!(layout.normalized_bit_offset, 8);

        // Start bits below 7 rebase to negative offsets
        let layout = resolve_layout(&signal("S", 3, 4, ByteOrder::BigEndian)).unwrap();
        assert_eq!(layout.normalized_bit_offset, -4);
    }

    #[test]
    fn test_signedness_carried_through() {
        let mut sig = signal("S", 0, 12, ByteOrder::LittleEndian);
        sig.is_signed = true;
        let layout = resolve_layout(&sig).unwrap();
        assert!(layout.storage_signed);
        assert_eq!(layout.storage_width, StorageWidth::W16);
    }

    #[test]
    fn test_overlap_detected() {
        let a = signal("A", 0, 8, ByteOrder::LittleEndian);
        let b = signal("B", 0, 8, ByteOrder::LittleEndian);
        let fields = vec![field(&a), field(&b)];

        let err = check_overlap("EngineData", &fields).unwrap_err();
        match err {
            GeneratorError::OverlappingSignals {
                message,
                first,
                second,
            } => {
                assert_eq!(message, "EngineData");
                assert_eq!(first, "A");
                assert_eq!(second, "B");
            }
            other => panic!("expected OverlappingSignals, got {:?}", other),
        }
    }

    #[test]
    fn test_adjacent_fields_do_not_overlap() {
        let a = signal("A", 0, 8, ByteOrder::LittleEndian);
        let b = signal("B", 8, 8, ByteOrder::LittleEndian);
        assert!(check_overlap("M", &[field(&a), field(&b)]).is_ok());
    }

    #[test]
    fn test_partial_overlap_detected() {
        let a = signal("A", 0, 12, ByteOrder::LittleEndian);
        let b = signal("B", 11, 4, ByteOrder::LittleEndian);
        assert!(check_overlap("M", &[field(&a), field(&b)]).is_err());
    }

    #[test]
    fn test_mixed_endianness_overlap() {
        // Big-endian start bit 7 rebases to LSB offset 0, colliding with
        // a little-endian signal at offset 0
        let a = signal("A", 7, 8, ByteOrder::BigEndian);
        let b = signal("B", 0, 8, ByteOrder::LittleEndian);
        assert!(check_overlap("M", &[field(&a), field(&b)]).is_err());
    }
}
