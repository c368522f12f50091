use crate::model::Inventory;
use std::fmt::Write;

const SEPARATOR: &str = "------------------";

/// Renders the numbered, line-oriented report.
pub fn render_text(inventory: &Inventory) -> String {
    if inventory.extensions.is_empty() {
        return "No extensions found.".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "Browser Extensions:");
    let _ = writeln!(out, "===================");
    for (i, ext) in inventory.extensions.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, ext.name);
        let _ = writeln!(out, "   Browser: {}", ext.browser);
        let _ = writeln!(out, "   Version: {}", ext.version);
        let _ = writeln!(out, "   ID: {}", ext.id);
        let _ = writeln!(out, "   Enabled: {}", ext.enabled);
        if !ext.profile.is_empty() {
            match &ext.profile_name {
                Some(name) => {
                    let _ = writeln!(out, "   Profile: {} ({})", ext.profile, name);
                }
                None => {
                    let _ = writeln!(out, "   Profile: {}", ext.profile);
                }
            }
        }
        let _ = writeln!(out, "{}", SEPARATOR);
    }
    let _ = write!(out, "Total extensions: {}", inventory.total);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Browser, Extension};

    #[test]
    fn test_empty_report() {
        assert_eq!(render_text(&Inventory::new(Vec::new())), "No extensions found.");
    }

    #[test]
    fn test_report_lines() {
        let inventory = Inventory::new(vec![
            Extension::new("abc", "Alpha", "1.0", Browser::Chrome)
                .with_profile("Profile 1")
                .with_profile_name(Some("Work".into())),
            Extension::new("def", "Beta", "2.0", Browser::Firefox).with_enabled(false),
        ]);
        let report = render_text(&inventory);

        assert!(report.contains("1. Alpha\n   Browser: Chrome\n   Version: 1.0\n   ID: abc\n   Enabled: true\n   Profile: Profile 1 (Work)\n"));
        assert!(report.contains("2. Beta\n"));
        assert!(report.contains("   Enabled: false\n------------------\n"));
        assert!(report.ends_with("Total extensions: 2"));
        assert_eq!(report.matches("Profile:").count(), 1);
    }
}
