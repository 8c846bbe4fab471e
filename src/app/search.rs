// ABOUTME: Case-insensitive substring filter over the dashboard tool entries

use crate::models::ToolEntry;

/// Show every entry whose name or description contains `query`, hide the rest.
/// Order is untouched. Returns the number of visible entries.
pub fn apply(query: &str, entries: &mut [ToolEntry]) -> usize {
    let needle = query.to_lowercase();
    let mut shown = 0;

    for entry in entries.iter_mut() {
        entry.visible = matches(&needle, entry);
        if entry.visible {
            shown += 1;
        }
    }

    shown
}

fn matches(needle: &str, entry: &ToolEntry) -> bool {
    entry.name_attr.contains(needle) || entry.description.to_lowercase().contains(needle)
}
