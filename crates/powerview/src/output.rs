//! Output formatting.
//!
//! Every view supplies a human rendering and a one-value-per-line plain
//! rendering; JSON output always comes straight from serde.

use std::io::{self, Write};

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;

/// Render `data` in the chosen format.
pub fn render<T: Serialize + ?Sized>(
    format: &OutputFormat,
    data: &T,
    human: impl FnOnce(&T) -> String,
    plain: impl FnOnce(&T) -> String,
) -> String {
    let json = match format {
        OutputFormat::Table => return human(data),
        OutputFormat::Plain => return plain(data),
        OutputFormat::Json => serde_json::to_string_pretty(data),
        OutputFormat::JsonCompact => serde_json::to_string(data),
    };
    json.unwrap_or_else(|e| format!("{{\"error\": \"serialization failed: {e}\"}}"))
}

/// Rounded table of `Tabled` rows.
pub fn table<R: Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Print to stdout unless quiet or empty.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let _ = writeln!(io::stdout().lock(), "{output}");
}
