//! Physical-value transform resolution
//!
//! Every signal carries a scale factor and an offset relating its raw
//! storage value to physical units. Most signals use trivial values for
//! one or both, and emitting the full affine formula everywhere wastes
//! floating-point work on small targets. This module classifies each
//! signal into the minimal formula shape. Encode and decode always share
//! one scale/offset pair, so the two directions cannot drift apart.

use serde::Serialize;

use crate::database::Signal;
use crate::types::{GeneratorError, Result};

/// Shape of the conversion formula between raw and physical values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TransformForm {
    /// Raw and physical values are identical
    Identity,
    /// Physical = raw + offset
    OffsetOnly,
    /// Physical = raw * scale
    ScaleOnly,
    /// Physical = raw * scale + offset
    Affine,
}

/// A signal's resolved conversion formula
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResolvedTransform {
    pub form: TransformForm,
    pub scale: f64,
    pub offset: f64,
}

impl ResolvedTransform {
    /// Convert a physical value to its raw representation
    ///
    /// No rounding is applied. Narrowing the result to the storage width
    /// truncates toward zero and is the storage layer's step, not part of
    /// the transform.
    pub fn encode_raw(&self, physical: f64) -> f64 {
        match self.form {
            TransformForm::Identity => physical,
            TransformForm::OffsetOnly => physical - self.offset,
            TransformForm::ScaleOnly => physical / self.scale,
            TransformForm::Affine => (physical - self.offset) / self.scale,
        }
    }

    /// Convert a raw storage value to physical units
    pub fn decode_physical(&self, raw: f64) -> f64 {
        match self.form {
            TransformForm::Identity => raw,
            TransformForm::OffsetOnly => raw + self.offset,
            TransformForm::ScaleOnly => raw * self.scale,
            TransformForm::Affine => raw * self.scale + self.offset,
        }
    }
}

/// Resolve the conversion formula for one signal
///
/// A zero scale factor is rejected: decoding would collapse every raw
/// value to the offset and encoding would divide by zero.
pub fn resolve_transform(signal: &Signal) -> Result<ResolvedTransform> {
    if signal.scale == 0.0 {
        return Err(GeneratorError::ZeroScale {
            signal: signal.name.clone(),
        });
    }

    let form = match (signal.offset == 0.0, signal.scale == 1.0) {
        (true, true) => TransformForm::Identity,
        (false, true) => TransformForm::OffsetOnly,
        (true, false) => TransformForm::ScaleOnly,
        (false, false) => TransformForm::Affine,
    };

    Ok(ResolvedTransform {
        form,
        scale: signal.scale,
        offset: signal.offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ByteOrder;

    fn signal(scale: f64, offset: f64) -> Signal {
        Signal {
            name: "S".to_string(),
            bit_start: 0,
            bit_length: 16,
            byte_order: ByteOrder::LittleEndian,
            is_signed: false,
            scale,
            offset,
            type_code: Some(0),
        }
    }

    #[test]
    fn test_form_selection() {
        let cases = [
            (1.0, 0.0, TransformForm::Identity),
            (1.0, 10.0, TransformForm::OffsetOnly),
            (0.5, 0.0, TransformForm::ScaleOnly),
            (2.0, 5.0, TransformForm::Affine),
        ];
        for (scale, offset, expected) in cases {
            let transform = resolve_transform(&signal(scale, offset)).unwrap();
            assert_eq!(transform.form, expected, "scale={} offset={}", scale, offset);
        }
    }

    #[test]
    fn test_zero_scale_rejected() {
        let err = resolve_transform(&signal(0.0, 5.0)).unwrap_err();
        assert!(matches!(err, GeneratorError::ZeroScale { .. }));
    }

    #[test]
    fn test_identity_passthrough() {
        let transform = resolve_transform(&signal(1.0, 0.0)).unwrap();
        assert_eq!(transform.encode_raw(42.0), 42.0);
        assert_eq!(transform.decode_physical(42.0), 42.0);
    }

    #[test]
    fn test_offset_only_formulas() {
        let transform = resolve_transform(&signal(1.0, 10.0)).unwrap();
        assert_eq!(transform.encode_raw(25.0), 15.0);
        assert_eq!(transform.decode_physical(15.0), 25.0);
    }

    #[test]
    fn test_scale_only_formulas() {
        let transform = resolve_transform(&signal(0.5, 0.0)).unwrap();
        assert_eq!(transform.encode_raw(21.0), 42.0);
        assert_eq!(transform.decode_physical(42.0), 21.0);
    }

    #[test]
    fn test_affine_formulas() {
        let transform = resolve_transform(&signal(2.0, 5.0)).unwrap();
        assert_eq!(transform.decode_physical(10.0), 25.0);
        assert_eq!(transform.encode_raw(25.0), 10.0);
    }

    #[test]
    fn test_encode_does_not_round() {
        let transform = resolve_transform(&signal(2.0, 0.0)).unwrap();
        assert_eq!(transform.encode_raw(15.5), 7.75);
    }

    #[test]
    fn test_reversibility() {
        // Scale and offset chosen to stay exact in binary floating point
        let transform = resolve_transform(&signal(0.03125, -273.0)).unwrap();
        let physical = -200.0;
        let raw = transform.encode_raw(physical);
        assert_eq!(transform.decode_physical(raw), physical);
    }

    #[test]
    fn test_round_trip_after_truncation() {
        // Narrowing to storage truncates toward zero; the round trip then
        // lands within one scale unit of the original
        let transform = resolve_transform(&signal(0.5, -40.0)).unwrap();
        for physical in [-39.9, 0.0, 23.3, 87.6] {
            let raw = transform.encode_raw(physical).trunc();
            let back = transform.decode_physical(raw);
            assert!(
                (back - physical).abs() <= transform.scale.abs() + 1e-9,
                "physical {} came back as {}",
                physical,
                back
            );
        }
    }
}
