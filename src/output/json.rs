use crate::error::Result;
use crate::model::Inventory;

/// Renders `{"extensions": [...], "total": N}`.
pub fn render_json(inventory: &Inventory) -> Result<String> {
    Ok(serde_json::to_string_pretty(inventory)?)
}
