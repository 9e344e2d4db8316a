use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde_json::{Map, Value};

const HEADER_KEYS: [&str; 4] = ["msgId", "type", "sysid", "compid"];

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Print one telemetry event, given as the JSON line subscribers receive.
pub fn print_event(event: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{event}"),
        OutputFormat::Table | OutputFormat::Pretty => match serde_json::from_str::<Value>(event) {
            Ok(Value::Object(map)) => println!("{}", render(&map, format)),
            _ => println!("{event}"),
        },
    }
}

fn render(event: &Map<String, Value>, format: OutputFormat) -> String {
    let header = |key: &str| event.get(key).map(plain).unwrap_or_default();
    let fields = payload_fields(event);

    match format {
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TYPE", "MSGID", "SYSID", "COMPID", "FIELDS"])
                .add_row(vec![
                    header("type"),
                    header("msgId"),
                    header("sysid"),
                    header("compid"),
                    if fields.is_empty() {
                        "-".to_string()
                    } else {
                        fields.join("\n")
                    },
                ]);
            table.to_string()
        }
        _ => {
            let mut line = format!(
                "{} msgId={} sysid={} compid={}",
                header("type"),
                header("msgId"),
                header("sysid"),
                header("compid")
            );
            for field in fields {
                line.push(' ');
                line.push_str(&field);
            }
            line
        }
    }
}

/// `name=value` pairs of the nested payload object, if the event has one.
fn payload_fields(event: &Map<String, Value>) -> Vec<String> {
    event
        .iter()
        .filter(|(key, _)| !HEADER_KEYS.contains(&key.as_str()))
        .find_map(|(_, value)| value.as_object())
        .map(|payload| {
            payload
                .iter()
                .map(|(name, value)| format!("{name}={}", plain(value)))
                .collect()
        })
        .unwrap_or_default()
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
