use bytes::{Bytes, BytesMut};
use jausprims_types::Quantized;

use crate::config::FrameConfig;
use crate::error::{FrameError, HeaderMismatch, Result};
use crate::field::FieldValue;
use crate::header::{Address, DataFlag, Header, Properties, HEADER_SIZE, MAX_DATA_SIZE};
use crate::layout::{FieldDescriptor, MessageLayout};
use crate::raw::{ensure_capacity, payload_slice, RawMessage};
use crate::udp::{check_udp_header, write_udp_header, UDP_HEADER_SIZE};

/// A message of a known layout: header plus typed payload fields.
///
/// One generic implementation serves every message type; the
/// [`MessageLayout`] supplies the command code and the ordered field list.
/// Optional fields are only encoded or decoded when their presence vector bit
/// is set; absent fields keep their last value in memory but never reach the
/// wire.
///
/// The header's data size always reflects the payload that would be encoded
/// for the current presence vector. Every constructor checks the layout with
/// [`MessageLayout::validate`] first, so an encoded message always decodes
/// with the same layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    layout: &'static MessageLayout,
    header: Header,
    fields: Vec<FieldValue>,
}

impl Message {
    /// A message with a default header and zeroed fields.
    ///
    /// Fails with [`FrameError::InvalidLayout`] if `layout` does not pass
    /// [`MessageLayout::validate`].
    pub fn new(layout: &'static MessageLayout) -> Result<Self> {
        layout.validate()?;
        let fields = layout
            .fields
            .iter()
            .map(|field| FieldValue::default_for(field.kind))
            .collect();
        Ok(Self::assemble(layout, Header::new(layout.command_code), fields))
    }

    /// Decode a native frame at `offset`.
    pub fn decode_native(
        layout: &'static MessageLayout,
        buffer: &[u8],
        offset: usize,
    ) -> Result<Self> {
        Self::decode_native_with_config(layout, buffer, offset, &FrameConfig::default())
    }

    pub fn decode_native_with_config(
        layout: &'static MessageLayout,
        buffer: &[u8],
        offset: usize,
        config: &FrameConfig,
    ) -> Result<Self> {
        layout.validate()?;
        let header = decode_header(layout, buffer, offset)?;
        let payload = payload_slice(&header, buffer, offset + HEADER_SIZE, &limit(layout, config))?;
        let fields = decode_payload(layout, payload, config)?;
        Ok(Self::assemble(layout, header, fields))
    }

    /// Decode a UDP-wrapped frame at `offset`.
    pub fn decode_udp(layout: &'static MessageLayout, buffer: &[u8], offset: usize) -> Result<Self> {
        Self::decode_udp_with_config(layout, buffer, offset, &FrameConfig::default())
    }

    pub fn decode_udp_with_config(
        layout: &'static MessageLayout,
        buffer: &[u8],
        offset: usize,
        config: &FrameConfig,
    ) -> Result<Self> {
        layout.validate()?;
        let header = decode_header(layout, buffer, offset)?;
        check_udp_header(buffer, offset + HEADER_SIZE)?;
        let payload = payload_slice(
            &header,
            buffer,
            offset + HEADER_SIZE + UDP_HEADER_SIZE,
            &limit(layout, config),
        )?;
        let fields = decode_payload(layout, payload, config)?;
        Ok(Self::assemble(layout, header, fields))
    }

    /// Re-decode an already parsed frame as this layout.
    pub fn from_raw(layout: &'static MessageLayout, raw: &RawMessage) -> Result<Self> {
        Self::from_raw_with_config(layout, raw, &FrameConfig::default())
    }

    pub fn from_raw_with_config(
        layout: &'static MessageLayout,
        raw: &RawMessage,
        config: &FrameConfig,
    ) -> Result<Self> {
        layout.validate()?;
        check_command_code(layout, &raw.header)?;
        let payload = payload_slice(&raw.header, &raw.data, 0, &limit(layout, config))?;
        let fields = decode_payload(layout, payload, config)?;
        Ok(Self::assemble(layout, raw.header, fields))
    }

    /// Header plus encoded payload as an opaque frame.
    pub fn to_raw(&self) -> Result<RawMessage> {
        let mut data = vec![0u8; self.payload_size()];
        self.encode_payload(&mut data, 0)?;
        RawMessage::new(self.header, Bytes::from(data))
    }

    /// Encode as a native frame at `offset`, returning the bytes written.
    ///
    /// Nothing is written if the buffer cannot hold [`size`](Self::size) bytes
    /// from `offset`.
    pub fn encode_native(&self, buffer: &mut [u8], offset: usize) -> Result<usize> {
        check_payload_size(self.payload_size())?;
        ensure_capacity(buffer, offset, self.size())?;
        self.header.encode(buffer, offset)?;
        let end = self.encode_payload(buffer, offset + HEADER_SIZE)?;
        Ok(end - offset)
    }

    /// Encode as a UDP-wrapped frame at `offset`, returning the bytes written.
    ///
    /// The native header is written at `offset`, the wrapper right after it,
    /// and the payload follows the wrapper.
    pub fn encode_udp(&self, buffer: &mut [u8], offset: usize) -> Result<usize> {
        check_payload_size(self.payload_size())?;
        ensure_capacity(buffer, offset, self.udp_size())?;
        self.header.encode(buffer, offset)?;
        write_udp_header(buffer, offset + HEADER_SIZE)?;
        let end = self.encode_payload(buffer, offset + HEADER_SIZE + UDP_HEADER_SIZE)?;
        Ok(end - offset)
    }

    /// Append the native frame to `dst`.
    pub fn write_native(&self, dst: &mut BytesMut) -> Result<()> {
        let start = dst.len();
        dst.resize(start + self.size(), 0);
        if let Err(err) = self.encode_native(dst, start) {
            dst.truncate(start);
            return Err(err);
        }
        Ok(())
    }

    /// Native wire size for the current presence vector.
    pub fn size(&self) -> usize {
        HEADER_SIZE + self.payload_size()
    }

    /// UDP wire size for the current presence vector.
    pub fn udp_size(&self) -> usize {
        self.size() + UDP_HEADER_SIZE
    }

    /// Native wire size with every optional field present.
    pub fn max_size(&self) -> usize {
        HEADER_SIZE + self.layout.full_payload_size()
    }

    /// Encoded payload size for the current presence vector.
    pub fn payload_size(&self) -> usize {
        self.present_fields().map(|(value, _)| value.size()).sum()
    }

    pub fn layout(&self) -> &'static MessageLayout {
        self.layout
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn command_code(&self) -> u16 {
        self.header.command_code
    }

    pub fn source(&self) -> Address {
        self.header.source
    }

    pub fn set_source(&mut self, source: Address) {
        self.header.source = source;
    }

    pub fn destination(&self) -> Address {
        self.header.destination
    }

    pub fn set_destination(&mut self, destination: Address) {
        self.header.destination = destination;
    }

    pub fn set_properties(&mut self, properties: Properties) {
        self.header.properties = properties;
    }

    pub fn set_data_flag(&mut self, data_flag: DataFlag) {
        self.header.data_flag = data_flag;
    }

    pub fn set_sequence_number(&mut self, sequence_number: u16) {
        self.header.sequence_number = sequence_number;
    }

    /// All fields in declaration order, present or not.
    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldValue> {
        self.fields.get(index)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldValue> {
        self.layout
            .index_of(name)
            .and_then(|index| self.fields.get(index))
    }

    /// Replace field `index`. The value must match the field's kind.
    pub fn set_field(&mut self, index: usize, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        let descriptor = self.descriptor(index)?;
        if descriptor.kind != value.kind() {
            return Err(FrameError::FieldKindMismatch {
                index,
                expected: descriptor.kind,
                actual: value.kind(),
            });
        }
        self.fields[index] = value;
        self.sync_data_size();
        Ok(())
    }

    /// Dequantized value of scaled field `index`.
    pub fn real(&self, index: usize) -> Result<f64> {
        let descriptor = self.descriptor(index)?;
        let range = descriptor.scale.ok_or(FrameError::NotScaled(index))?;
        self.fields[index]
            .to_real(range)
            .ok_or(FrameError::NotScaled(index))
    }

    /// Quantize `value` into scaled field `index`.
    ///
    /// Out-of-range input is clamped, not rejected; the returned
    /// [`Quantized`] reports whether that happened and what was stored.
    pub fn set_real(&mut self, index: usize, value: f64) -> Result<Quantized<FieldValue>> {
        let descriptor = self.descriptor(index)?;
        let range = descriptor.scale.ok_or(FrameError::NotScaled(index))?;
        let quantized = FieldValue::quantize(descriptor.kind, value, range)
            .ok_or(FrameError::NotScaled(index))?;
        self.fields[index] = quantized.value;
        Ok(quantized)
    }

    /// Whether field `index` would be encoded.
    pub fn is_present(&self, index: usize) -> bool {
        self.layout
            .fields
            .get(index)
            .is_some_and(|descriptor| self.is_descriptor_present(descriptor))
    }

    /// The presence vector field, if the layout has one.
    pub fn presence_vector(&self) -> Option<&FieldValue> {
        self.layout
            .presence_vector_index()
            .and_then(|index| self.fields.get(index))
    }

    /// Mark optional field bit `bit` present.
    pub fn set_presence_bit(&mut self, bit: usize) -> Result<()> {
        self.update_presence(bit, true)
    }

    /// Mark optional field bit `bit` absent.
    pub fn clear_presence_bit(&mut self, bit: usize) -> Result<()> {
        self.update_presence(bit, false)
    }

    fn update_presence(&mut self, bit: usize, present: bool) -> Result<()> {
        let name = self.layout.name;
        let no_vector = move || FrameError::NoPresenceVector(name);
        let index = self.layout.presence_vector_index().ok_or_else(no_vector)?;
        match (&mut self.fields[index], present) {
            (FieldValue::BytePresenceVector(pv), true) => pv.set_bit(bit)?,
            (FieldValue::BytePresenceVector(pv), false) => pv.clear_bit(bit)?,
            (FieldValue::ShortPresenceVector(pv), true) => pv.set_bit(bit)?,
            (FieldValue::ShortPresenceVector(pv), false) => pv.clear_bit(bit)?,
            _ => return Err(no_vector()),
        }
        self.sync_data_size();
        Ok(())
    }

    fn assemble(layout: &'static MessageLayout, header: Header, fields: Vec<FieldValue>) -> Self {
        let mut message = Self {
            layout,
            header,
            fields,
        };
        message.sync_data_size();
        message
    }

    fn sync_data_size(&mut self) {
        // Validated layouts never exceed MAX_DATA_SIZE.
        self.header.data_size = self.payload_size() as u16;
    }

    fn descriptor(&self, index: usize) -> Result<&'static FieldDescriptor> {
        self.layout
            .fields
            .get(index)
            .ok_or(FrameError::FieldIndexOutOfRange {
                index,
                len: self.layout.fields.len(),
            })
    }

    fn presence_bits(&self) -> Option<u16> {
        self.presence_vector().and_then(FieldValue::presence_bits)
    }

    fn is_descriptor_present(&self, descriptor: &FieldDescriptor) -> bool {
        is_present(descriptor, self.presence_bits())
    }

    fn present_fields(&self) -> impl Iterator<Item = (&FieldValue, &'static FieldDescriptor)> {
        let bits = self.presence_bits();
        self.fields
            .iter()
            .zip(self.layout.fields.iter())
            .filter(move |(_, descriptor)| is_present(descriptor, bits))
    }

    fn encode_payload(&self, buffer: &mut [u8], start: usize) -> Result<usize> {
        let mut cursor = start;
        for (value, _) in self.present_fields() {
            value.encode(buffer, cursor)?;
            cursor += value.size();
        }
        Ok(cursor)
    }
}

fn is_present(descriptor: &FieldDescriptor, presence_bits: Option<u16>) -> bool {
    match descriptor.presence_bit {
        None => true,
        Some(bit) => presence_bits.is_some_and(|bits| bit < 16 && bits & (1 << bit) != 0),
    }
}

/// Payloads must fit the header's data size field.
fn check_payload_size(size: usize) -> Result<()> {
    if size > MAX_DATA_SIZE {
        return Err(FrameError::PayloadTooLarge {
            size,
            max: MAX_DATA_SIZE,
        });
    }
    Ok(())
}

/// Decoding never accepts more than the layout can carry.
fn limit(layout: &MessageLayout, config: &FrameConfig) -> FrameConfig {
    FrameConfig {
        max_data_size: config.max_data_size.min(layout.max_data_size),
        ..*config
    }
}

fn check_command_code(layout: &MessageLayout, header: &Header) -> Result<()> {
    if header.command_code != layout.command_code {
        tracing::debug!(
            layout = layout.name,
            expected = layout.command_code,
            actual = header.command_code,
            "command code mismatch"
        );
        return Err(HeaderMismatch::CommandCode {
            expected: layout.command_code,
            actual: header.command_code,
        }
        .into());
    }
    Ok(())
}

fn decode_header(layout: &MessageLayout, buffer: &[u8], offset: usize) -> Result<Header> {
    let header = Header::decode(buffer, offset)?;
    check_command_code(layout, &header)?;
    Ok(header)
}

/// Decode every field of `layout` from `payload`, in declaration order.
fn decode_payload(
    layout: &MessageLayout,
    payload: &[u8],
    config: &FrameConfig,
) -> Result<Vec<FieldValue>> {
    let mut fields = Vec::with_capacity(layout.fields.len());
    let mut presence_bits = None;
    let mut cursor = 0;

    for descriptor in layout.fields {
        if !is_present(descriptor, presence_bits) {
            fields.push(FieldValue::default_for(descriptor.kind));
            continue;
        }
        let value = FieldValue::decode(descriptor.kind, payload, cursor)?;
        cursor += value.size();
        if presence_bits.is_none() {
            presence_bits = value.presence_bits();
        }
        fields.push(value);
    }

    if config.strict_length && cursor != payload.len() {
        tracing::debug!(
            layout = layout.name,
            declared = payload.len(),
            consumed = cursor,
            "payload length mismatch"
        );
        return Err(HeaderMismatch::DataSizeMismatch {
            declared: payload.len(),
            consumed: cursor,
        }
        .into());
    }
    Ok(fields)
}
