//! CLI presentation: text and json formatters for replay results.

use crate::replay::{ReplayEvent, ReplayReport};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;

pub fn format_replay_text(report: &ReplayReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Root: {}\n", report.root));
    out.push_str(&format!("  Applied: {}\n", report.applied));
    out.push_str(&format!("  Rejected: {}\n", report.failures.len()));
    out.push_str(&format!("  Entries: {}\n\n", report.entries.len()));

    if !report.entries.is_empty() {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Path", "Value"]);
        for (path, value) in &report.entries {
            table.add_row(vec![path.to_string(), value.to_string()]);
        }
        out.push_str(&format!("{}\n\n", table));
    }

    if !report.events.is_empty() {
        out.push_str("Notifications\n\n");
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Event", "Path", "Value"]);
        for event in &report.events {
            let row = match event {
                ReplayEvent::Deleted { path, value, .. } => {
                    vec!["deleted".to_string(), path.to_string(), value.to_string()]
                }
                ReplayEvent::Relocated {
                    from, to, value, ..
                } => vec![
                    "relocated".to_string(),
                    format!("{} -> {}", from, to),
                    value.to_string(),
                ],
            };
            table.add_row(row);
        }
        out.push_str(&format!("{}\n\n", table));
    }

    if !report.failures.is_empty() {
        out.push_str("Rejected operations\n\n");
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Line", "Error"]);
        for failure in &report.failures {
            table.add_row(vec![failure.line.to_string(), failure.error.clone()]);
        }
        out.push_str(&format!("{}\n", table));
    }
    out.trim_end().to_string()
}

pub fn format_replay_json(report: &ReplayReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|e| format!("{{\"error\":\"{}\"}}", e))
}
