use jausprims_frame::FieldValue;
use jausprims_types::ScaleRange;
use serde::Serialize;

use crate::cmd::ScaleArgs;
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{self, OutputFormat};

#[derive(Serialize)]
struct ScaleOutput {
    kind: &'static str,
    min: f64,
    max: f64,
    raw: i64,
    hex: String,
    real: f64,
    /// Only reported when quantizing a real value.
    clamped: Option<bool>,
}

pub fn run(args: ScaleArgs, format: OutputFormat) -> CliResult<i32> {
    if !args.min.is_finite() || !args.max.is_finite() {
        return Err(CliError::usage("--min and --max must be finite"));
    }
    let kind = args.kind.kind();
    let range = ScaleRange::new(args.min, args.max);

    let (value, clamped) = match (args.real, args.raw) {
        (Some(real), _) => {
            let quantized = FieldValue::quantize(kind, real, range)
                .ok_or_else(|| CliError::new(INTERNAL, "type has no real value"))?;
            if quantized.clamped {
                tracing::info!(real, min = args.min, max = args.max, "value clamped into range");
            }
            (quantized.value, Some(quantized.clamped))
        }
        (None, Some(raw)) => {
            let value = FieldValue::from_i64(kind, raw).ok_or_else(|| {
                CliError::usage(format!("raw value {raw} does not fit a {}", kind.name()))
            })?;
            (value, None)
        }
        (None, None) => return Err(CliError::usage("either --real or --raw is required")),
    };

    let out = ScaleOutput {
        kind: kind.name(),
        min: args.min,
        max: args.max,
        raw: value.as_i64(),
        hex: value.to_hex(),
        real: value.to_real(range).unwrap_or(f64::NAN),
        clamped,
    };
    print_scale(&out, format);
    Ok(SUCCESS)
}

fn print_scale(out: &ScaleOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(out),
        OutputFormat::Table => {
            let mut table = output::table(vec!["TYPE", "RANGE", "RAW", "HEX", "REAL", "CLAMPED"]);
            table.add_row(vec![
                out.kind.to_string(),
                format!("[{}, {}]", out.min, out.max),
                out.raw.to_string(),
                out.hex.clone(),
                output::real(Some(out.real)),
                out.clamped.map_or_else(|| "-".to_string(), |c| c.to_string()),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{} raw={} hex={} real={:.6}{}",
                out.kind,
                out.raw,
                out.hex,
                out.real,
                if out.clamped == Some(true) { " (clamped)" } else { "" }
            );
        }
    }
}
