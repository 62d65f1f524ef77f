use clap::{ArgGroup, Args, Subcommand, ValueEnum};
use jausprims_frame::FieldKind;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod layouts;
pub mod scale;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a hex-encoded message.
    Decode(DecodeArgs),
    /// Convert between real and raw scaled-integer values.
    Scale(ScaleArgs),
    /// List the built-in message layouts.
    Layouts(LayoutsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Scale(args) => scale::run(args, format),
        Command::Layouts(args) => layouts::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Message bytes as hex (whitespace and a leading 0x are ignored).
    pub hex: String,
    /// The buffer carries the UDP wrapper after the header.
    #[arg(long)]
    pub udp: bool,
    /// Byte offset of the header within the buffer.
    #[arg(long, default_value = "0")]
    pub offset: usize,
    /// Accept a declared data size larger than the fields consume.
    #[arg(long)]
    pub lenient: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ScaleType {
    Byte,
    Short,
    Ushort,
    Int,
    Uint,
}

impl ScaleType {
    pub fn kind(self) -> FieldKind {
        match self {
            ScaleType::Byte => FieldKind::Byte,
            ScaleType::Short => FieldKind::Short,
            ScaleType::Ushort => FieldKind::UnsignedShort,
            ScaleType::Int => FieldKind::Integer,
            ScaleType::Uint => FieldKind::UnsignedInteger,
        }
    }
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["real", "raw"])))]
pub struct ScaleArgs {
    /// Integer width.
    #[arg(value_name = "TYPE")]
    pub kind: ScaleType,
    /// Lower bound of the real range.
    #[arg(long, allow_negative_numbers = true)]
    pub min: f64,
    /// Upper bound of the real range.
    #[arg(long, allow_negative_numbers = true)]
    pub max: f64,
    /// Real value to quantize.
    #[arg(long, allow_negative_numbers = true)]
    pub real: Option<f64>,
    /// Raw integer to dequantize.
    #[arg(long, allow_negative_numbers = true)]
    pub raw: Option<i64>,
}

#[derive(Args, Debug)]
pub struct LayoutsArgs {
    /// Show the fields of one layout (name or command code, e.g. 0x4404).
    pub layout: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
