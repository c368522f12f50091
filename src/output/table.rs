use crate::model::Inventory;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ExtensionRow {
    #[tabled(rename = "Browser")]
    browser: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Profile")]
    profile: String,
    #[tabled(rename = "ID")]
    id: String,
}

pub fn render_table(inventory: &Inventory) -> String {
    if inventory.extensions.is_empty() {
        return "No extensions found.".to_string();
    }

    let rows: Vec<ExtensionRow> = inventory
        .extensions
        .iter()
        .map(|e| ExtensionRow {
            browser: e.browser.display_name().to_string(),
            name: truncate(&e.name, 40),
            version: format_version(&e.version),
            enabled: if e.enabled { "yes" } else { "no" }.to_string(),
            profile: e.profile_name.clone().unwrap_or_else(|| e.profile.clone()),
            id: truncate(&e.id, 40),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    format!("{}\n\nTotal extensions: {}", table, inventory.total)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len - 3).collect();
        format!("{}...", cut)
    }
}

fn format_version(version: &str) -> String {
    if version.is_empty() {
        "-".to_string()
    } else {
        version.to_string()
    }
}
