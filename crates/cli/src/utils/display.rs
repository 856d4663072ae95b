//! Display utilities for the sicct-replay output

use std::fmt::{self, Display};

use colored::Colorize;
use sicct_apdu_core::ApduRecord;

/// A formatted section title
pub(crate) struct SectionTitle<'a>(pub(crate) &'a str);

impl Display for SectionTitle<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\n{}", self.0.bold().underline())
    }
}

/// Format a section header
pub(crate) const fn section_title(title: &str) -> SectionTitle<'_> {
    SectionTitle(title)
}

/// Format a success message
pub(crate) fn success(message: &str) -> String {
    format!("✅ {}", message.green().bold())
}

/// Format a warning message
pub(crate) fn warning(message: &str) -> String {
    format!("⚠️  {}", message.yellow().bold())
}

/// Format an error message
pub(crate) fn failure(message: &str) -> String {
    format!("❌ {}", message.red().bold())
}

/// Format a key-value section
pub(crate) fn key_value_box<K: Display>(
    title: &str,
    items: impl IntoIterator<Item = (K, String)>,
) -> String {
    let mut result = format!("{}", title.bold().underline());

    for (key, value) in items {
        result.push_str(&format!("\n  {}: {}", key.to_string().bold(), value));
    }

    result
}

/// One-line summary of a record with its mnemonic
pub(crate) fn record_line(index: usize, record: &ApduRecord) -> String {
    let name = record
        .instruction_name()
        .map_or_else(|| "UNKNOWN".dimmed(), |name| name.cyan());
    format!("{:>4}. {} {}", index + 1, record, name)
}

/// Structured dump of every decoded field plus the full hex
pub(crate) fn record_detail(record: &ApduRecord) -> String {
    let mut items: Vec<(String, String)> = record
        .fields()
        .iter()
        .map(|(field, value)| (field.to_string(), value.clone()))
        .collect();
    items.push(("Class".into(), record.header().class_kind().to_string()));
    items.push(("Hex".into(), record.hex_dump()));
    key_value_box(
        record.instruction_name().unwrap_or("Unknown instruction"),
        items,
    )
}
