use jausprims_frame::catalog::{self, command_name};
use jausprims_frame::{FrameConfig, Header, Message, RawMessage};
use serde::Serialize;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, CliError, CliResult, SUCCESS};
use crate::output::{self, OutputFormat};

#[derive(Serialize)]
struct HeaderOutput {
    command_code: String,
    command_name: &'static str,
    priority: u8,
    ack_nak: String,
    service_connection: bool,
    experimental: bool,
    version: u8,
    destination: String,
    source: String,
    data_flag: u8,
    data_size: u16,
    sequence_number: u16,
}

impl From<&Header> for HeaderOutput {
    fn from(header: &Header) -> Self {
        Self {
            command_code: output::command_code(header.command_code),
            command_name: command_name(header.command_code),
            priority: header.properties.priority,
            ack_nak: format!("{:?}", header.properties.ack_nak),
            service_connection: header.properties.service_connection,
            experimental: header.properties.experimental,
            version: header.properties.version,
            destination: header.destination.to_string(),
            source: header.source.to_string(),
            data_flag: header.data_flag.bits(),
            data_size: header.data_size,
            sequence_number: header.sequence_number,
        }
    }
}

#[derive(Serialize)]
struct FieldOutput {
    name: &'static str,
    kind: &'static str,
    present: bool,
    raw: i64,
    hex: String,
    real: Option<f64>,
}

#[derive(Serialize)]
struct DecodeOutput {
    schema_id: &'static str,
    framing: &'static str,
    header: HeaderOutput,
    layout: Option<&'static str>,
    fields: Vec<FieldOutput>,
    /// Undecoded payload when the command code has no layout.
    payload: Option<String>,
}

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.hex)?;
    let config = FrameConfig {
        strict_length: !args.lenient,
        ..FrameConfig::default()
    };

    let raw = if args.udp {
        RawMessage::decode_udp_with_config(&bytes, args.offset, &config)
    } else {
        RawMessage::decode_native_with_config(&bytes, args.offset, &config)
    }
    .map_err(|err| frame_error("decode", err))?;

    let consumed = args.offset + if args.udp { raw.udp_size() } else { raw.size() };
    if consumed < bytes.len() {
        tracing::debug!(trailing = bytes.len() - consumed, "ignoring bytes after frame");
    }

    let out = match catalog::lookup(raw.command_code()) {
        Some(layout) => {
            let message = Message::from_raw_with_config(layout, &raw, &config)
                .map_err(|err| frame_error("decode", err))?;
            DecodeOutput {
                layout: Some(layout.name),
                fields: field_outputs(&message),
                payload: None,
                ..base_output(&args, &raw)
            }
        }
        None => {
            tracing::warn!(
                command_code = raw.command_code(),
                "no layout for command code, payload left undecoded"
            );
            DecodeOutput {
                payload: Some(hex::encode_upper(&raw.data)),
                ..base_output(&args, &raw)
            }
        }
    };

    print_decoded(&out, format);
    Ok(SUCCESS)
}

fn base_output(args: &DecodeArgs, raw: &RawMessage) -> DecodeOutput {
    DecodeOutput {
        schema_id: "https://schemas.3leaps.dev/jausprims/cli/v1/decoded-message.schema.json",
        framing: if args.udp { "udp" } else { "native" },
        header: HeaderOutput::from(&raw.header),
        layout: None,
        fields: Vec::new(),
        payload: None,
    }
}

fn field_outputs(message: &Message) -> Vec<FieldOutput> {
    message
        .layout()
        .fields
        .iter()
        .zip(message.fields())
        .enumerate()
        .map(|(index, (descriptor, value))| FieldOutput {
            name: descriptor.name,
            kind: descriptor.kind.name(),
            present: message.is_present(index),
            raw: value.as_i64(),
            hex: value.to_hex(),
            real: message.real(index).ok(),
        })
        .collect()
}

fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);
    hex::decode(digits).map_err(|err| CliError::usage(format!("invalid hex input: {err}")))
}

fn print_decoded(out: &DecodeOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(out),
        OutputFormat::Table => {
            let h = &out.header;
            let mut header = output::table(vec!["COMMAND", "NAME", "SOURCE", "DEST", "SIZE", "SEQ"]);
            header.add_row(vec![
                h.command_code.clone(),
                h.command_name.to_string(),
                h.source.clone(),
                h.destination.clone(),
                h.data_size.to_string(),
                h.sequence_number.to_string(),
            ]);
            println!("{header}");

            if let Some(payload) = &out.payload {
                println!("payload: {payload}");
                return;
            }
            let mut fields = output::table(vec!["FIELD", "TYPE", "PRESENT", "RAW", "HEX", "REAL"]);
            for field in &out.fields {
                fields.add_row(vec![
                    field.name.to_string(),
                    field.kind.to_string(),
                    field.present.to_string(),
                    field.raw.to_string(),
                    field.hex.clone(),
                    output::real(field.real),
                ]);
            }
            println!("{fields}");
        }
        OutputFormat::Pretty => {
            let h = &out.header;
            println!(
                "{} {} {} -> {} size={} seq={} framing={}",
                h.command_code,
                h.command_name,
                h.source,
                h.destination,
                h.data_size,
                h.sequence_number,
                out.framing
            );
            if let Some(payload) = &out.payload {
                println!("  payload={payload}");
            }
            for field in out.fields.iter().filter(|field| field.present) {
                match field.real {
                    Some(real) => println!("  {}={} ({real:.6})", field.name, field.raw),
                    None => println!("  {}={}", field.name, field.raw),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_ignores_spacing_and_prefix() {
        assert_eq!(parse_hex("0x0A 0b\n0C").unwrap(), vec![0x0A, 0x0B, 0x0C]);
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
    }
}
