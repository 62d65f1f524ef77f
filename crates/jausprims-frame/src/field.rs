use std::fmt;

use jausprims_types::{
    Byte, BytePresenceVector, Integer, Quantized, ScaleRange, ScaledInteger, Short,
    ShortPresenceVector, TypeError, UnsignedInteger, UnsignedShort,
};

use crate::layout::FieldKind;

/// A decoded payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Byte(Byte),
    Short(Short),
    UnsignedShort(UnsignedShort),
    Integer(Integer),
    UnsignedInteger(UnsignedInteger),
    BytePresenceVector(BytePresenceVector),
    ShortPresenceVector(ShortPresenceVector),
}

impl FieldValue {
    /// Zero value of the given kind.
    pub fn default_for(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Byte => FieldValue::Byte(Byte::default()),
            FieldKind::Short => FieldValue::Short(Short::default()),
            FieldKind::UnsignedShort => FieldValue::UnsignedShort(UnsignedShort::default()),
            FieldKind::Integer => FieldValue::Integer(Integer::default()),
            FieldKind::UnsignedInteger => FieldValue::UnsignedInteger(UnsignedInteger::default()),
            FieldKind::BytePresenceVector => {
                FieldValue::BytePresenceVector(BytePresenceVector::default())
            }
            FieldKind::ShortPresenceVector => {
                FieldValue::ShortPresenceVector(ShortPresenceVector::default())
            }
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Byte(_) => FieldKind::Byte,
            FieldValue::Short(_) => FieldKind::Short,
            FieldValue::UnsignedShort(_) => FieldKind::UnsignedShort,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::UnsignedInteger(_) => FieldKind::UnsignedInteger,
            FieldValue::BytePresenceVector(_) => FieldKind::BytePresenceVector,
            FieldValue::ShortPresenceVector(_) => FieldKind::ShortPresenceVector,
        }
    }

    /// Encoded width in bytes.
    pub fn size(&self) -> usize {
        self.kind().size()
    }

    /// Decode a field of `kind` at `offset`.
    pub fn decode(kind: FieldKind, buffer: &[u8], offset: usize) -> Result<Self, TypeError> {
        Ok(match kind {
            FieldKind::Byte => FieldValue::Byte(Byte::decode(buffer, offset)?),
            FieldKind::Short => FieldValue::Short(Short::decode(buffer, offset)?),
            FieldKind::UnsignedShort => {
                FieldValue::UnsignedShort(UnsignedShort::decode(buffer, offset)?)
            }
            FieldKind::Integer => FieldValue::Integer(Integer::decode(buffer, offset)?),
            FieldKind::UnsignedInteger => {
                FieldValue::UnsignedInteger(UnsignedInteger::decode(buffer, offset)?)
            }
            FieldKind::BytePresenceVector => {
                FieldValue::BytePresenceVector(BytePresenceVector::decode(buffer, offset)?)
            }
            FieldKind::ShortPresenceVector => {
                FieldValue::ShortPresenceVector(ShortPresenceVector::decode(buffer, offset)?)
            }
        })
    }

    /// Encode the field at `offset`.
    pub fn encode(&self, buffer: &mut [u8], offset: usize) -> Result<(), TypeError> {
        match self {
            FieldValue::Byte(v) => v.encode(buffer, offset),
            FieldValue::Short(v) => v.encode(buffer, offset),
            FieldValue::UnsignedShort(v) => v.encode(buffer, offset),
            FieldValue::Integer(v) => v.encode(buffer, offset),
            FieldValue::UnsignedInteger(v) => v.encode(buffer, offset),
            FieldValue::BytePresenceVector(v) => v.encode(buffer, offset),
            FieldValue::ShortPresenceVector(v) => v.encode(buffer, offset),
        }
    }

    /// Numeric field of `kind` holding `raw`, or `None` if `raw` does not fit
    /// the width. Presence vectors are not numeric.
    pub fn from_i64(kind: FieldKind, raw: i64) -> Option<Self> {
        fn fit<T: ScaledInteger>(raw: i64) -> Option<T> {
            (T::MIN_RAW..=T::MAX_RAW)
                .contains(&raw)
                .then(|| T::from_i64_saturating(raw))
        }

        Some(match kind {
            FieldKind::Byte => FieldValue::Byte(fit(raw)?),
            FieldKind::Short => FieldValue::Short(fit(raw)?),
            FieldKind::UnsignedShort => FieldValue::UnsignedShort(fit(raw)?),
            FieldKind::Integer => FieldValue::Integer(fit(raw)?),
            FieldKind::UnsignedInteger => FieldValue::UnsignedInteger(fit(raw)?),
            FieldKind::BytePresenceVector | FieldKind::ShortPresenceVector => return None,
        })
    }

    /// Raw integer value (presence vectors yield their bit pattern).
    pub fn as_i64(&self) -> i64 {
        match self {
            FieldValue::Byte(v) => v.to_i64(),
            FieldValue::Short(v) => v.to_i64(),
            FieldValue::UnsignedShort(v) => v.to_i64(),
            FieldValue::Integer(v) => v.to_i64(),
            FieldValue::UnsignedInteger(v) => v.to_i64(),
            FieldValue::BytePresenceVector(v) => v.raw().to_i64(),
            FieldValue::ShortPresenceVector(v) => v.raw().to_i64(),
        }
    }

    /// Uppercase zero-padded hex of the raw value.
    pub fn to_hex(&self) -> String {
        match self {
            FieldValue::Byte(v) => v.to_hex(),
            FieldValue::Short(v) => v.to_hex(),
            FieldValue::UnsignedShort(v) => v.to_hex(),
            FieldValue::Integer(v) => v.to_hex(),
            FieldValue::UnsignedInteger(v) => v.to_hex(),
            FieldValue::BytePresenceVector(v) => v.raw().to_hex(),
            FieldValue::ShortPresenceVector(v) => v.raw().to_hex(),
        }
    }

    /// Presence bits, if this is a presence vector.
    pub fn presence_bits(&self) -> Option<u16> {
        match self {
            FieldValue::BytePresenceVector(v) => Some(u16::from(v.raw().value())),
            FieldValue::ShortPresenceVector(v) => Some(v.raw().value()),
            _ => None,
        }
    }

    /// Dequantize over `range`. Presence vectors have no real value.
    pub fn to_real(&self, range: ScaleRange) -> Option<f64> {
        let ScaleRange { min, max } = range;
        match self {
            FieldValue::Byte(v) => Some(v.to_real(min, max)),
            FieldValue::Short(v) => Some(v.to_real(min, max)),
            FieldValue::UnsignedShort(v) => Some(v.to_real(min, max)),
            FieldValue::Integer(v) => Some(v.to_real(min, max)),
            FieldValue::UnsignedInteger(v) => Some(v.to_real(min, max)),
            FieldValue::BytePresenceVector(_) | FieldValue::ShortPresenceVector(_) => None,
        }
    }

    /// Quantize `value` into a field of `kind`. Presence vectors have no real value.
    pub fn quantize(kind: FieldKind, value: f64, range: ScaleRange) -> Option<Quantized<Self>> {
        let ScaleRange { min, max } = range;
        Some(match kind {
            FieldKind::Byte => Byte::quantize(value, min, max).map(FieldValue::Byte),
            FieldKind::Short => Short::quantize(value, min, max).map(FieldValue::Short),
            FieldKind::UnsignedShort => {
                UnsignedShort::quantize(value, min, max).map(FieldValue::UnsignedShort)
            }
            FieldKind::Integer => Integer::quantize(value, min, max).map(FieldValue::Integer),
            FieldKind::UnsignedInteger => {
                UnsignedInteger::quantize(value, min, max).map(FieldValue::UnsignedInteger)
            }
            FieldKind::BytePresenceVector | FieldKind::ShortPresenceVector => return None,
        })
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::BytePresenceVector(v) => write!(f, "{:08b}", v.raw().value()),
            FieldValue::ShortPresenceVector(v) => write!(f, "{:016b}", v.raw().value()),
            other => write!(f, "{}", other.as_i64()),
        }
    }
}

macro_rules! field_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for FieldValue {
                fn from(value: $variant) -> Self {
                    FieldValue::$variant(value)
                }
            }
        )*
    };
}

field_from!(
    Byte,
    Short,
    UnsignedShort,
    Integer,
    UnsignedInteger,
    BytePresenceVector,
    ShortPresenceVector,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_each_kind() {
        let buf = [0x01, 0x02, 0x03, 0x04];
        assert_eq!(
            FieldValue::decode(FieldKind::UnsignedShort, &buf, 2).unwrap(),
            FieldValue::UnsignedShort(UnsignedShort::new(0x0403))
        );
        assert_eq!(
            FieldValue::decode(FieldKind::Integer, &buf, 0).unwrap(),
            FieldValue::Integer(Integer::new(0x0403_0201))
        );
        assert_eq!(
            FieldValue::decode(FieldKind::BytePresenceVector, &buf, 3)
                .unwrap()
                .presence_bits(),
            Some(0x04)
        );
        assert!(FieldValue::decode(FieldKind::UnsignedInteger, &buf, 1).is_err());
    }

    #[test]
    fn default_matches_kind() {
        for kind in [
            FieldKind::Byte,
            FieldKind::Short,
            FieldKind::UnsignedShort,
            FieldKind::Integer,
            FieldKind::UnsignedInteger,
            FieldKind::BytePresenceVector,
            FieldKind::ShortPresenceVector,
        ] {
            let value = FieldValue::default_for(kind);
            assert_eq!(value.kind(), kind);
            assert_eq!(value.size(), kind.size());
            assert_eq!(value.as_i64(), 0);
        }
    }

    #[test]
    fn quantize_rejects_presence_vectors() {
        let range = ScaleRange::new(0.0, 1.0);
        assert!(FieldValue::quantize(FieldKind::ShortPresenceVector, 0.5, range).is_none());
        assert!(FieldValue::default_for(FieldKind::BytePresenceVector)
            .to_real(range)
            .is_none());
    }

    #[test]
    fn quantize_reports_clamp() {
        let range = ScaleRange::new(0.0, 100.0);
        let q = FieldValue::quantize(FieldKind::UnsignedInteger, 150.0, range).unwrap();
        assert!(q.clamped);
        assert_eq!(q.value, FieldValue::UnsignedInteger(UnsignedInteger::MAX));
    }

    #[test]
    fn from_i64_checks_width() {
        assert_eq!(
            FieldValue::from_i64(FieldKind::Short, -32768),
            Some(FieldValue::Short(Short::new(-32768)))
        );
        assert_eq!(FieldValue::from_i64(FieldKind::Byte, 256), None);
        assert_eq!(FieldValue::from_i64(FieldKind::UnsignedInteger, -1), None);
        assert_eq!(FieldValue::from_i64(FieldKind::BytePresenceVector, 1), None);
    }

    #[test]
    fn display_and_hex() {
        let value = FieldValue::from(Short::new(-3));
        assert_eq!(value.to_string(), "-3");
        assert_eq!(value.to_hex(), "FFFD");

        let mut pv = BytePresenceVector::new();
        pv.set_bit(1).unwrap();
        assert_eq!(FieldValue::from(pv).to_string(), "00000010");
    }
}
