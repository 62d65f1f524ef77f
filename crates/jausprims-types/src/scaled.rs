use std::fmt;

use crate::error::{Result, TypeError};

/// Real-valued bounds used to (de)quantize a scaled integer field.
///
/// Bounds are supplied per conversion and never stored on the integer itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRange {
    pub min: f64,
    pub max: f64,
}

impl ScaleRange {
    /// Create a new range.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Bounds ordered low-to-high. A reversed range is swapped rather than rejected.
    pub fn ordered(self) -> (f64, f64) {
        if self.max < self.min {
            (self.max, self.min)
        } else {
            (self.min, self.max)
        }
    }

    /// Real value represented by one raw step of `T` over this range.
    pub fn scale_factor<T: ScaledInteger>(self) -> f64 {
        let (min, max) = self.ordered();
        (max - min) / T::RANGE
    }
}

/// Outcome of a real-to-raw conversion.
///
/// `clamped` is true when the input had to be pulled into `[min, max]`
/// (or was NaN) before quantization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantized<T> {
    pub value: T,
    pub clamped: bool,
}

impl<T> Quantized<T> {
    /// Discard the clamping report.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Map the quantized value, keeping the clamping report.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Quantized<U> {
        Quantized {
            value: f(self.value),
            clamped: self.clamped,
        }
    }
}

/// A fixed-width little-endian integer with linear real-value quantization.
///
/// ```text
/// real = raw * scale_factor + bias
/// raw  = round((real - bias) / scale_factor)
///
/// scale_factor = (max - min) / RANGE
/// bias         = (max + min) / 2   signed types
///              = min               unsigned types
/// ```
///
/// `RANGE` is the protocol's nominal span for the width. For signed types it
/// is one less than the full unsigned span (65534, 4294967294). Peers quantize
/// with the same constants, so they must not be "corrected".
pub trait ScaledInteger:
    Copy + Default + PartialEq + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Native integer type holding the raw value.
    type Raw: Copy;

    /// Encoded width in bytes.
    const SIZE_BYTES: usize;
    /// Nominal span used as the quantization denominator.
    const RANGE: f64;
    /// Whether the bias is the midpoint (signed) or the lower bound (unsigned).
    const SIGNED: bool;
    /// Smallest representable raw value.
    const MIN_RAW: i64;
    /// Largest representable raw value.
    const MAX_RAW: i64;

    fn from_raw(raw: Self::Raw) -> Self;
    fn raw(self) -> Self::Raw;

    /// Raw value widened to `i64`.
    fn to_i64(self) -> i64;

    /// Build from an `i64`, saturating at the width's bounds.
    fn from_i64_saturating(value: i64) -> Self;

    /// Raw bits, zero-extended (two's complement for signed types).
    fn to_bits(self) -> u32;

    /// Build from the low `SIZE_BYTES` bytes of `bits`.
    fn from_bits(bits: u32) -> Self;

    /// Decode exactly `SIZE_BYTES` little-endian bytes at `offset`.
    fn decode(buffer: &[u8], offset: usize) -> Result<Self> {
        let bytes = offset
            .checked_add(Self::SIZE_BYTES)
            .and_then(|end| buffer.get(offset..end))
            .ok_or(TypeError::TooShort {
                needed: Self::SIZE_BYTES,
                available: buffer.len().saturating_sub(offset),
            })?;

        let bits = bytes
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, byte)| acc | (u32::from(*byte) << (i * 8)));
        Ok(Self::from_bits(bits))
    }

    /// Encode `SIZE_BYTES` little-endian bytes at `offset`.
    ///
    /// The buffer is left untouched on failure.
    fn encode(self, buffer: &mut [u8], offset: usize) -> Result<()> {
        let available = buffer.len().saturating_sub(offset);
        let dst = offset
            .checked_add(Self::SIZE_BYTES)
            .and_then(|end| buffer.get_mut(offset..end))
            .ok_or(TypeError::BufferTooSmall {
                needed: Self::SIZE_BYTES,
                available,
            })?;

        let bits = self.to_bits();
        for (i, slot) in dst.iter_mut().enumerate() {
            *slot = ((bits >> (i * 8)) & 0xFF) as u8;
        }
        Ok(())
    }

    /// Encoded width in bytes.
    fn size(self) -> usize {
        Self::SIZE_BYTES
    }

    /// Bias term for a `[min, max]` range (already ordered).
    fn bias(min: f64, max: f64) -> f64 {
        if Self::SIGNED {
            (max + min) / 2.0
        } else {
            min
        }
    }

    /// Dequantize into `[min, max]`.
    fn to_real(self, min: f64, max: f64) -> f64 {
        let range = ScaleRange::new(min, max);
        let (min, max) = range.ordered();
        let raw = self.to_i64().clamp(Self::MIN_RAW, Self::MAX_RAW);
        raw as f64 * range.scale_factor::<Self>() + Self::bias(min, max)
    }

    /// Quantize `value` over `[min, max]`, clamping out-of-range input.
    fn from_real(value: f64, min: f64, max: f64) -> Self {
        Self::quantize(value, min, max).value
    }

    /// Like [`from_real`](Self::from_real), but reports whether the input was clamped.
    fn quantize(value: f64, min: f64, max: f64) -> Quantized<Self> {
        let range = ScaleRange::new(min, max);
        let (min, max) = range.ordered();

        let (bounded, clamped) = if value.is_nan() {
            (Self::bias(min, max), true)
        } else if value < min {
            (min, true)
        } else if value > max {
            (max, true)
        } else {
            (value, false)
        };
        if clamped {
            tracing::trace!(value, min, max, "scaled value clamped into range");
        }

        // Round half up, matching peers that use floor(x + 0.5).
        let steps = ((bounded - Self::bias(min, max)) / range.scale_factor::<Self>() + 0.5).floor();
        let raw = if steps.is_nan() { 0 } else { steps as i64 };

        Quantized {
            value: Self::from_i64_saturating(raw),
            clamped,
        }
    }

    /// Uppercase hex, zero-padded to `2 * SIZE_BYTES` characters.
    fn to_hex(self) -> String {
        format!("{:0width$X}", self.to_bits(), width = Self::SIZE_BYTES * 2)
    }
}

macro_rules! scaled_integer {
    (
        $(#[$meta:meta])*
        $name:ident($raw:ty as $bits:ty), signed: $signed:expr, range: $range:expr
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name($raw);

        impl $name {
            /// Smallest raw value.
            pub const MIN: Self = Self(<$raw>::MIN);
            /// Largest raw value.
            pub const MAX: Self = Self(<$raw>::MAX);

            /// Wrap a raw value.
            pub const fn new(raw: $raw) -> Self {
                Self(raw)
            }

            /// The raw value.
            pub const fn value(self) -> $raw {
                self.0
            }
        }

        impl ScaledInteger for $name {
            type Raw = $raw;

            const SIZE_BYTES: usize = std::mem::size_of::<$raw>();
            const RANGE: f64 = $range;
            const SIGNED: bool = $signed;
            const MIN_RAW: i64 = <$raw>::MIN as i64;
            const MAX_RAW: i64 = <$raw>::MAX as i64;

            fn from_raw(raw: $raw) -> Self {
                Self(raw)
            }

            fn raw(self) -> $raw {
                self.0
            }

            fn to_i64(self) -> i64 {
                i64::from(self.0)
            }

            fn from_i64_saturating(value: i64) -> Self {
                Self(value.clamp(Self::MIN_RAW, Self::MAX_RAW) as $raw)
            }

            fn to_bits(self) -> u32 {
                u32::from(self.0 as $bits)
            }

            fn from_bits(bits: u32) -> Self {
                Self(bits as $bits as $raw)
            }
        }

        impl From<$raw> for $name {
            fn from(raw: $raw) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for $raw {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

scaled_integer! {
    /// Unsigned 8-bit field.
    Byte(u8 as u8), signed: false, range: 255.0
}

scaled_integer! {
    /// Signed 16-bit field.
    Short(i16 as u16), signed: true, range: 65534.0
}

scaled_integer! {
    /// Unsigned 16-bit field.
    UnsignedShort(u16 as u16), signed: false, range: 65535.0
}

scaled_integer! {
    /// Signed 32-bit field.
    ///
    /// The protocol defines the span as 4294967294, not 2^32 - 1.
    Integer(i32 as u32), signed: true, range: 4294967294.0
}

scaled_integer! {
    /// Unsigned 32-bit field.
    UnsignedInteger(u32 as u32), signed: false, range: 4294967295.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_reads_little_endian() {
        let buf = [0xAA, 0x34, 0x12, 0x78, 0x56];
        assert_eq!(UnsignedShort::decode(&buf, 1).unwrap().value(), 0x1234);
        assert_eq!(UnsignedInteger::decode(&buf, 1).unwrap().value(), 0x5678_1234);
        assert_eq!(Byte::decode(&buf, 4).unwrap().value(), 0x56);
    }

    #[test]
    fn decode_signed_sign_extends() {
        let buf = [0xFE, 0xFF];
        assert_eq!(Short::decode(&buf, 0).unwrap().value(), -2);

        let buf = [0x00, 0x00, 0x00, 0x80];
        assert_eq!(Integer::decode(&buf, 0).unwrap().value(), i32::MIN);
    }

    #[test]
    fn decode_too_short() {
        let buf = [0x01, 0x02, 0x03];
        let err = Integer::decode(&buf, 0).unwrap_err();
        assert_eq!(
            err,
            TypeError::TooShort {
                needed: 4,
                available: 3
            }
        );
        assert!(UnsignedShort::decode(&buf, 2).is_err());
    }

    #[test]
    fn decode_offset_past_end() {
        let buf = [0x01];
        let err = Byte::decode(&buf, 5).unwrap_err();
        assert_eq!(
            err,
            TypeError::TooShort {
                needed: 1,
                available: 0
            }
        );
    }

    #[test]
    fn encode_writes_at_offset() {
        let mut buf = [0u8; 6];
        Integer::new(-2).encode(&mut buf, 1).unwrap();
        assert_eq!(buf, [0x00, 0xFE, 0xFF, 0xFF, 0xFF, 0x00]);
    }

    #[test]
    fn encode_too_small_leaves_buffer_untouched() {
        let mut buf = [0x11u8; 3];
        let err = UnsignedInteger::new(0xDEAD_BEEF)
            .encode(&mut buf, 0)
            .unwrap_err();
        assert_eq!(
            err,
            TypeError::BufferTooSmall {
                needed: 4,
                available: 3
            }
        );
        assert_eq!(buf, [0x11; 3]);
    }

    #[test]
    fn hex_is_padded_uppercase() {
        assert_eq!(Byte::new(0x0A).to_hex(), "0A");
        assert_eq!(UnsignedShort::new(0xBEEF).to_hex(), "BEEF");
        assert_eq!(Short::new(-1).to_hex(), "FFFF");
        assert_eq!(UnsignedInteger::new(1).to_hex(), "00000001");
        assert_eq!(Integer::new(i32::MIN).to_hex(), "80000000");
    }

    #[test]
    fn unsigned_bias_is_min() {
        let raw = UnsignedShort::from_real(0.0, 0.0, 1092.0);
        assert_eq!(raw.value(), 0);
        let raw = UnsignedShort::from_real(1092.0, 0.0, 1092.0);
        assert_eq!(raw.value(), u16::MAX);
        assert!((UnsignedShort::MAX.to_real(0.0, 1092.0) - 1092.0).abs() < 1e-9);
    }

    #[test]
    fn signed_bias_is_midpoint() {
        assert_eq!(Short::from_real(0.0, -32.767, 32.767).value(), 0);
        assert_eq!(Short::from_real(32.767, -32.767, 32.767).value(), 32767);
        assert_eq!(Short::from_real(-32.767, -32.767, 32.767).value(), -32767);
        assert_eq!(Integer::from_real(65.534, -65.534, 65.534).value(), i32::MAX);
    }

    #[test]
    fn signed_range_constants_are_protocol_values() {
        assert_eq!(Short::RANGE, 65534.0);
        assert_eq!(Integer::RANGE, 4294967294.0);
        assert_eq!(UnsignedShort::RANGE, 65535.0);
        assert_eq!(UnsignedInteger::RANGE, 4294967295.0);
        assert_eq!(Byte::RANGE, 255.0);
    }

    #[test]
    fn from_real_clamps_input() {
        assert_eq!(
            UnsignedShort::from_real(-5.0, 0.0, 100.0),
            UnsignedShort::from_real(0.0, 0.0, 100.0)
        );
        assert_eq!(
            Short::from_real(1e9, -1.0, 1.0),
            Short::from_real(1.0, -1.0, 1.0)
        );
    }

    #[test]
    fn quantize_reports_clamping() {
        let q = Byte::quantize(300.0, 0.0, 255.0);
        assert!(q.clamped);
        assert_eq!(q.value.value(), 255);

        let q = Byte::quantize(17.0, 0.0, 255.0);
        assert!(!q.clamped);
        assert_eq!(q.value.value(), 17);
    }

    #[test]
    fn nan_quantizes_to_bias() {
        let q = Short::quantize(f64::NAN, -10.0, 10.0);
        assert!(q.clamped);
        assert_eq!(q.value.value(), 0);
        assert_eq!(UnsignedShort::from_real(f64::NAN, 3.0, 9.0).value(), 0);
    }

    #[test]
    fn reversed_range_is_swapped() {
        assert_eq!(
            UnsignedShort::from_real(10.0, 100.0, 0.0),
            UnsignedShort::from_real(10.0, 0.0, 100.0)
        );
        let raw = UnsignedShort::new(1000);
        assert_eq!(raw.to_real(100.0, 0.0), raw.to_real(0.0, 100.0));
    }

    #[test]
    fn degenerate_range_does_not_panic() {
        let raw = UnsignedShort::from_real(5.0, 5.0, 5.0);
        assert_eq!(raw.value(), 0);
        assert_eq!(raw.to_real(5.0, 5.0), 5.0);
        assert_eq!(Integer::from_real(2.0, 2.0, 2.0).value(), 0);
    }

    #[test]
    fn update_rate_scenario() {
        let range = ScaleRange::new(0.0, 1092.0);
        let raw = UnsignedShort::from_real(546.0, range.min, range.max);
        let real = raw.to_real(range.min, range.max);
        assert!((real - 546.0).abs() <= range.scale_factor::<UnsignedShort>());

        let mut buf = [0u8; 2];
        raw.encode(&mut buf, 0).unwrap();
        let decoded = UnsignedShort::decode(&buf, 0).unwrap();
        assert_eq!(decoded, raw);

        let mut again = [0u8; 2];
        decoded.encode(&mut again, 0).unwrap();
        assert_eq!(buf, again);
    }

    #[test]
    fn from_i64_saturates() {
        assert_eq!(Byte::from_i64_saturating(-3), Byte::MIN);
        assert_eq!(Byte::from_i64_saturating(1000), Byte::MAX);
        assert_eq!(Short::from_i64_saturating(40_000), Short::MAX);
        assert_eq!(Integer::from_i64_saturating(i64::MIN), Integer::MIN);
    }
}
