use jausprims_types::{
    Byte, BytePresenceVector, Integer, ScaleRange, ScaledInteger, Short, ShortPresenceVector,
    UnsignedInteger, UnsignedShort,
};

use crate::error::{FrameError, Result};
use crate::header::MAX_DATA_SIZE;

/// Wire type of a payload field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Byte,
    Short,
    UnsignedShort,
    Integer,
    UnsignedInteger,
    BytePresenceVector,
    ShortPresenceVector,
}

impl FieldKind {
    /// Encoded width in bytes.
    pub const fn size(self) -> usize {
        match self {
            FieldKind::Byte => Byte::SIZE_BYTES,
            FieldKind::Short => Short::SIZE_BYTES,
            FieldKind::UnsignedShort => UnsignedShort::SIZE_BYTES,
            FieldKind::Integer => Integer::SIZE_BYTES,
            FieldKind::UnsignedInteger => UnsignedInteger::SIZE_BYTES,
            FieldKind::BytePresenceVector => BytePresenceVector::SIZE_BYTES,
            FieldKind::ShortPresenceVector => ShortPresenceVector::SIZE_BYTES,
        }
    }

    pub const fn is_presence_vector(self) -> bool {
        matches!(
            self,
            FieldKind::BytePresenceVector | FieldKind::ShortPresenceVector
        )
    }

    /// Number of bits addressable when this is a presence vector.
    pub const fn presence_width(self) -> Option<usize> {
        match self {
            FieldKind::BytePresenceVector => Some(BytePresenceVector::WIDTH_BITS),
            FieldKind::ShortPresenceVector => Some(ShortPresenceVector::WIDTH_BITS),
            _ => None,
        }
    }

    /// Short lowercase type name.
    pub const fn name(self) -> &'static str {
        match self {
            FieldKind::Byte => "byte",
            FieldKind::Short => "short",
            FieldKind::UnsignedShort => "ushort",
            FieldKind::Integer => "int",
            FieldKind::UnsignedInteger => "uint",
            FieldKind::BytePresenceVector => "byte_pv",
            FieldKind::ShortPresenceVector => "short_pv",
        }
    }
}

/// One payload field: its wire type, whether it is optional, and its scaling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Presence vector bit guarding this field. `None` means always present.
    pub presence_bit: Option<usize>,
    /// Real-value range for scaled fields.
    pub scale: Option<ScaleRange>,
}

impl FieldDescriptor {
    /// A mandatory, unscaled field.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            presence_bit: None,
            scale: None,
        }
    }

    /// Guard this field with presence vector bit `bit`.
    pub const fn optional(self, bit: usize) -> Self {
        Self {
            presence_bit: Some(bit),
            ..self
        }
    }

    /// Attach a real-value range.
    pub const fn scaled(self, min: f64, max: f64) -> Self {
        Self {
            scale: Some(ScaleRange::new(min, max)),
            ..self
        }
    }
}

/// A message type, described as data.
///
/// Fields are encoded in declaration order with no tags or padding; position
/// is the only addressing, so reordering `fields` changes the wire format.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MessageLayout {
    pub name: &'static str,
    pub command_code: u16,
    /// Largest payload this message can carry (all optional fields present).
    pub max_data_size: usize,
    pub fields: &'static [FieldDescriptor],
}

impl MessageLayout {
    /// Position of the presence vector field, if the message has one.
    pub fn presence_vector_index(&self) -> Option<usize> {
        self.fields
            .iter()
            .position(|field| field.kind.is_presence_vector())
    }

    /// Payload size with every field present.
    pub fn full_payload_size(&self) -> usize {
        self.fields.iter().map(|field| field.kind.size()).sum()
    }

    /// Position of the field called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Check that the layout can be packed and unpacked.
    ///
    /// Optional fields must follow a presence vector and use a bit inside its
    /// width, there is at most one presence vector, and the fully populated
    /// payload must fit `max_data_size`, which itself may not exceed
    /// [`MAX_DATA_SIZE`].
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason| FrameError::InvalidLayout {
            layout: self.name,
            reason,
        };

        let vectors = self
            .fields
            .iter()
            .filter(|field| field.kind.is_presence_vector())
            .count();
        if vectors > 1 {
            return Err(invalid("more than one presence vector"));
        }

        let pv_index = self.presence_vector_index();
        let width = pv_index.and_then(|index| self.fields[index].kind.presence_width());
        for (index, field) in self.fields.iter().enumerate() {
            let Some(bit) = field.presence_bit else {
                continue;
            };
            match (pv_index, width) {
                (Some(pv), Some(width)) if pv < index && bit < width => {}
                (Some(pv), _) if pv >= index => {
                    return Err(invalid("optional field precedes presence vector"))
                }
                (Some(_), _) => return Err(invalid("presence bit outside vector width")),
                (None, _) => return Err(invalid("optional field without presence vector")),
            }
            if field.kind.is_presence_vector() {
                return Err(invalid("presence vector cannot be optional"));
            }
        }

        if self.max_data_size > MAX_DATA_SIZE {
            return Err(invalid("max data size exceeds header limit"));
        }
        if self.full_payload_size() > self.max_data_size {
            return Err(invalid("fields exceed max data size"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PV: FieldDescriptor = FieldDescriptor::new("pv", FieldKind::BytePresenceVector);

    #[test]
    fn kind_sizes() {
        assert_eq!(FieldKind::Byte.size(), 1);
        assert_eq!(FieldKind::Short.size(), 2);
        assert_eq!(FieldKind::UnsignedInteger.size(), 4);
        assert_eq!(FieldKind::ShortPresenceVector.size(), 2);
        assert_eq!(FieldKind::BytePresenceVector.presence_width(), Some(8));
        assert_eq!(FieldKind::Integer.presence_width(), None);
    }

    #[test]
    fn descriptor_builders() {
        let field = FieldDescriptor::new("rate", FieldKind::UnsignedShort)
            .optional(3)
            .scaled(0.0, 1092.0);
        assert_eq!(field.presence_bit, Some(3));
        assert_eq!(field.scale, Some(ScaleRange::new(0.0, 1092.0)));
    }

    #[test]
    fn validate_accepts_well_formed() {
        static FIELDS: [FieldDescriptor; 2] =
            [PV, FieldDescriptor::new("a", FieldKind::Short).optional(7)];
        let layout = MessageLayout {
            name: "ok",
            command_code: 1,
            max_data_size: 3,
            fields: &FIELDS,
        };
        layout.validate().unwrap();
        assert_eq!(layout.presence_vector_index(), Some(0));
        assert_eq!(layout.index_of("a"), Some(1));
    }

    #[test]
    fn validate_rejects_bit_outside_width() {
        static FIELDS: [FieldDescriptor; 2] =
            [PV, FieldDescriptor::new("a", FieldKind::Short).optional(8)];
        let layout = MessageLayout {
            name: "wide",
            command_code: 1,
            max_data_size: 3,
            fields: &FIELDS,
        };
        assert!(matches!(
            layout.validate(),
            Err(FrameError::InvalidLayout { layout: "wide", .. })
        ));
    }

    #[test]
    fn validate_rejects_optional_without_vector() {
        static FIELDS: [FieldDescriptor; 1] =
            [FieldDescriptor::new("a", FieldKind::Byte).optional(0)];
        let layout = MessageLayout {
            name: "orphan",
            command_code: 1,
            max_data_size: 1,
            fields: &FIELDS,
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn validate_rejects_oversized_fields() {
        static FIELDS: [FieldDescriptor; 1] = [FieldDescriptor::new("a", FieldKind::Integer)];
        let layout = MessageLayout {
            name: "big",
            command_code: 1,
            max_data_size: 2,
            fields: &FIELDS,
        };
        assert!(layout.validate().is_err());
    }

    #[test]
    fn validate_rejects_max_above_header_limit() {
        static FIELDS: [FieldDescriptor; 1] = [FieldDescriptor::new("a", FieldKind::Byte)];
        let layout = MessageLayout {
            name: "huge",
            command_code: 1,
            max_data_size: MAX_DATA_SIZE + 1,
            fields: &FIELDS,
        };
        assert_eq!(
            layout.validate(),
            Err(FrameError::InvalidLayout {
                layout: "huge",
                reason: "max data size exceeds header limit",
            })
        );
    }

    #[test]
    fn validate_rejects_optional_before_vector() {
        static FIELDS: [FieldDescriptor; 2] =
            [FieldDescriptor::new("a", FieldKind::Byte).optional(0), PV];
        let layout = MessageLayout {
            name: "early",
            command_code: 1,
            max_data_size: 2,
            fields: &FIELDS,
        };
        assert_eq!(
            layout.validate(),
            Err(FrameError::InvalidLayout {
                layout: "early",
                reason: "optional field precedes presence vector",
            })
        );
    }
}
