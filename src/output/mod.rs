mod json;
mod table;
mod text;

pub use json::render_json;
pub use table::render_table;
pub use text::render_text;

use crate::error::Result;
use crate::model::Inventory;

/// Output format for discovery results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Numbered, line-oriented report
    Text,
    /// Human-readable table format
    Table,
    /// JSON format for programmatic use
    Json,
}

impl OutputFormat {
    /// True for formats meant for a person at a terminal.
    pub fn is_interactive(&self) -> bool {
        !matches!(self, OutputFormat::Json)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "list" => Ok(OutputFormat::Text),
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Unknown format: {}. Use 'text', 'table', or 'json'",
                s
            )),
        }
    }
}

/// Renders an inventory to a string in the given format.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn render(inventory: &Inventory, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(inventory)),
        OutputFormat::Table => Ok(render_table(inventory)),
        OutputFormat::Json => render_json(inventory),
    }
}

pub fn print_result(inventory: &Inventory, format: OutputFormat) -> Result<()> {
    let rendered = render(inventory, format)?;
    println!("{}", rendered);
    Ok(())
}
