use std::fmt;

use crate::error::{Result, TypeError};
use crate::scaled::{Byte, ScaledInteger, UnsignedShort};

/// Storage types a presence vector can be built on.
pub trait PresenceStorage: ScaledInteger {
    /// Number of addressable bits.
    const WIDTH_BITS: usize;

    fn bits(self) -> u16;
    fn with_bits(bits: u16) -> Self;
}

impl PresenceStorage for Byte {
    const WIDTH_BITS: usize = 8;

    fn bits(self) -> u16 {
        u16::from(self.value())
    }

    fn with_bits(bits: u16) -> Self {
        Byte::new((bits & 0xFF) as u8)
    }
}

impl PresenceStorage for UnsignedShort {
    const WIDTH_BITS: usize = 16;

    fn bits(self) -> u16 {
        self.value()
    }

    fn with_bits(bits: u16) -> Self {
        UnsignedShort::new(bits)
    }
}

/// Bitmask marking which optional fields a message carries.
///
/// Bit `i` set means optional field `i` is present in the payload. The vector
/// is a bit-indexed view over a single 8- or 16-bit field and is encoded
/// exactly like that field.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PresenceVector<S: PresenceStorage> {
    raw: S,
}

/// 8-bit presence vector.
pub type BytePresenceVector = PresenceVector<Byte>;

/// 16-bit presence vector.
pub type ShortPresenceVector = PresenceVector<UnsignedShort>;

impl<S: PresenceStorage> PresenceVector<S> {
    /// Number of addressable bits.
    pub const WIDTH_BITS: usize = S::WIDTH_BITS;

    /// Encoded width in bytes.
    pub const SIZE_BYTES: usize = S::SIZE_BYTES;

    /// An empty vector (no fields present).
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a raw field value.
    pub fn from_raw(raw: S) -> Self {
        Self { raw }
    }

    /// The underlying field value.
    pub fn raw(&self) -> S {
        self.raw
    }

    /// Mark field `index` present.
    pub fn set_bit(&mut self, index: usize) -> Result<()> {
        let mask = Self::mask(index)?;
        self.raw = S::with_bits(self.raw.bits() | mask);
        Ok(())
    }

    /// Mark field `index` absent.
    pub fn clear_bit(&mut self, index: usize) -> Result<()> {
        let mask = Self::mask(index)?;
        self.raw = S::with_bits(self.raw.bits() & !mask);
        Ok(())
    }

    /// Whether field `index` is present. Out-of-range indices are never set.
    pub fn is_set(&self, index: usize) -> bool {
        Self::mask(index)
            .map(|mask| self.raw.bits() & mask != 0)
            .unwrap_or(false)
    }

    /// True if no bits are set.
    pub fn is_empty(&self) -> bool {
        self.raw.bits() == 0
    }

    /// Indices of set bits, lowest first.
    pub fn set_bits(&self) -> impl Iterator<Item = usize> + '_ {
        (0..Self::WIDTH_BITS).filter(move |&index| self.is_set(index))
    }

    /// Encoded width in bytes.
    pub fn size(&self) -> usize {
        Self::SIZE_BYTES
    }

    /// Decode the vector at `offset`.
    pub fn decode(buffer: &[u8], offset: usize) -> Result<Self> {
        S::decode(buffer, offset).map(Self::from_raw)
    }

    /// Encode the vector at `offset`.
    pub fn encode(&self, buffer: &mut [u8], offset: usize) -> Result<()> {
        self.raw.encode(buffer, offset)
    }

    fn mask(index: usize) -> Result<u16> {
        if index >= Self::WIDTH_BITS {
            return Err(TypeError::InvalidBitIndex {
                index,
                width: Self::WIDTH_BITS,
            });
        }
        Ok(1u16 << index)
    }
}

impl<S: PresenceStorage> fmt::Debug for PresenceVector<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PresenceVector({:0width$b})",
            self.raw.bits(),
            width = Self::WIDTH_BITS
        )
    }
}
