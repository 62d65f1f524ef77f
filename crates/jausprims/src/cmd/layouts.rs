use jausprims_frame::catalog;
use jausprims_frame::{FieldDescriptor, MessageLayout};
use serde::Serialize;

use crate::cmd::LayoutsArgs;
use crate::exit::{CliError, CliResult, SUCCESS};
use crate::output::{self, OutputFormat};

#[derive(Serialize)]
struct LayoutSummary {
    name: &'static str,
    command_code: String,
    max_data_size: usize,
    fields: usize,
}

#[derive(Serialize)]
struct FieldSummary {
    name: &'static str,
    kind: &'static str,
    size: usize,
    presence_bit: Option<usize>,
    min: Option<f64>,
    max: Option<f64>,
}

#[derive(Serialize)]
struct LayoutDetail {
    schema_id: &'static str,
    name: &'static str,
    command_code: String,
    max_data_size: usize,
    fields: Vec<FieldSummary>,
}

pub fn run(args: LayoutsArgs, format: OutputFormat) -> CliResult<i32> {
    match args.layout {
        Some(query) => {
            let layout = find(&query)
                .ok_or_else(|| CliError::usage(format!("unknown layout: {query}")))?;
            print_detail(layout, format);
        }
        None => print_summary(format),
    }
    Ok(SUCCESS)
}

/// Match by name (case-insensitive) or by command code in hex or decimal.
fn find(query: &str) -> Option<&'static MessageLayout> {
    let code = match query.strip_prefix("0x").or_else(|| query.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => query.parse::<u16>().ok(),
    };
    if let Some(layout) = code.and_then(catalog::lookup) {
        return Some(layout);
    }
    catalog::ALL
        .iter()
        .copied()
        .find(|layout| layout.name.eq_ignore_ascii_case(query))
}

fn summary(layout: &MessageLayout) -> LayoutSummary {
    LayoutSummary {
        name: layout.name,
        command_code: output::command_code(layout.command_code),
        max_data_size: layout.max_data_size,
        fields: layout.fields.len(),
    }
}

fn field_summary(field: &FieldDescriptor) -> FieldSummary {
    FieldSummary {
        name: field.name,
        kind: field.kind.name(),
        size: field.kind.size(),
        presence_bit: field.presence_bit,
        min: field.scale.map(|s| s.min),
        max: field.scale.map(|s| s.max),
    }
}

fn print_summary(format: OutputFormat) {
    let layouts: Vec<LayoutSummary> = catalog::ALL.iter().map(|l| summary(l)).collect();
    match format {
        OutputFormat::Json => output::print_json(&layouts),
        OutputFormat::Table => {
            let mut table = output::table(vec!["CODE", "NAME", "MAX SIZE", "FIELDS"]);
            for layout in &layouts {
                table.add_row(vec![
                    layout.command_code.clone(),
                    layout.name.to_string(),
                    layout.max_data_size.to_string(),
                    layout.fields.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for layout in &layouts {
                println!(
                    "{} {} max={} fields={}",
                    layout.command_code, layout.name, layout.max_data_size, layout.fields
                );
            }
        }
    }
}

fn print_detail(layout: &MessageLayout, format: OutputFormat) {
    let detail = LayoutDetail {
        schema_id: "https://schemas.3leaps.dev/jausprims/cli/v1/message-layout.schema.json",
        name: layout.name,
        command_code: output::command_code(layout.command_code),
        max_data_size: layout.max_data_size,
        fields: layout.fields.iter().map(field_summary).collect(),
    };
    match format {
        OutputFormat::Json => output::print_json(&detail),
        OutputFormat::Table => {
            let mut table = output::table(vec!["FIELD", "TYPE", "SIZE", "PV BIT", "RANGE"]);
            for field in &detail.fields {
                table.add_row(vec![
                    field.name.to_string(),
                    field.kind.to_string(),
                    field.size.to_string(),
                    field.presence_bit.map_or_else(|| "-".to_string(), |b| b.to_string()),
                    range_text(field),
                ]);
            }
            println!("{} {}", detail.command_code, detail.name);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{} {} max={}", detail.command_code, detail.name, detail.max_data_size);
            for field in &detail.fields {
                println!("  {} {} {}", field.name, field.kind, range_text(field));
            }
        }
    }
}

fn range_text(field: &FieldSummary) -> String {
    match (field.min, field.max) {
        (Some(min), Some(max)) => format!("[{min}, {max}]"),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_by_name_or_code() {
        assert_eq!(find("0x4404").map(|l| l.name), Some("ReportVelocityState"));
        assert_eq!(find("9").map(|l| l.name), Some("ConfirmServiceConnection"));
        assert_eq!(find("queryglobalpose").map(|l| l.name), Some("QueryGlobalPose"));
        assert!(find("0x9999").is_none());
        assert!(find("nope").is_none());
    }
}
