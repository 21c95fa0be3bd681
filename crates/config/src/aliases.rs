//! Read-only aliases for settings that were renamed or relocated
//!
//! Consulted by the validator and the loader only. Files are always written
//! with the current names, so an upgraded file converges on the new layout.

use toml::{Table, Value};

/// A location in the document: `(section, key)`, with `None` for top-level keys
pub type FieldLocation = (Option<&'static str>, &'static str);

/// Current location paired with the legacy location it used to live at
pub const FIELD_ALIASES: &[(FieldLocation, FieldLocation)] = &[
    ((None, "config_version"), (None, "version")),
    (
        (Some("search"), "enable_popularity_sort"),
        (Some("general"), "enable_popularity_sort"),
    ),
    ((Some("logging"), "max_log_size"), (Some("logging"), "max_size")),
    ((Some("logging"), "max_log_files"), (Some("logging"), "max_files")),
];

/// Dotted display path of a location
pub fn display_path(location: FieldLocation) -> String {
    match location {
        (Some(section), key) => format!("{}.{}", section, key),
        (None, key) => key.to_string(),
    }
}

fn get<'a>(doc: &'a Table, location: FieldLocation) -> Option<&'a Value> {
    match location {
        (Some(section), key) => doc.get(section)?.as_table()?.get(key),
        (None, key) => doc.get(key),
    }
}

/// Finds a field by its current name, falling back to any legacy name
///
/// Returns the path the value was actually found at, so errors point at
/// what the user wrote.
pub fn lookup<'a>(doc: &'a Table, location: FieldLocation) -> Option<(String, &'a Value)> {
    if let Some(value) = get(doc, location) {
        return Some((display_path(location), value));
    }
    FIELD_ALIASES
        .iter()
        .filter(|(current, _)| *current == location)
        .find_map(|(_, legacy)| get(doc, *legacy).map(|value| (display_path(*legacy), value)))
}

/// Rewrites legacy field names to their current locations in place
///
/// Legacy keys are removed from their old location. A value already present
/// under the current name wins. Returns the number of values moved.
pub fn normalize(doc: &mut Table) -> usize {
    let mut moved = 0;
    for &(current, legacy) in FIELD_ALIASES {
        let Some(value) = take(doc, legacy) else {
            continue;
        };
        if get(doc, current).is_some() {
            log::debug!(
                "Ignoring legacy '{}' because '{}' is set",
                display_path(legacy),
                display_path(current)
            );
            continue;
        }
        if insert(doc, current, value) {
            log::debug!(
                "Read legacy '{}' as '{}'",
                display_path(legacy),
                display_path(current)
            );
            moved += 1;
        }
    }
    moved
}

fn take(doc: &mut Table, location: FieldLocation) -> Option<Value> {
    match location {
        (Some(section), key) => doc.get_mut(section)?.as_table_mut()?.remove(key),
        (None, key) => doc.remove(key),
    }
}

fn insert(doc: &mut Table, location: FieldLocation, value: Value) -> bool {
    match location {
        (Some(section), key) => {
            let entry = doc
                .entry(section.to_string())
                .or_insert(Value::Table(Table::new()));
            match entry.as_table_mut() {
                Some(table) => {
                    table.insert(key.to_string(), value);
                    true
                }
                None => false,
            }
        }
        (None, key) => {
            doc.insert(key.to_string(), value);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Table {
        toml::from_str(text).expect("valid toml")
    }

    #[test]
    fn test_lookup_prefers_current_name() {
        let doc = parse("config_version = \"2.0\"\nversion = \"1.0\"");
        let (path, value) = lookup(&doc, (None, "config_version")).expect("found");
        assert_eq!(path, "config_version");
        assert_eq!(value.as_str(), Some("2.0"));
    }

    #[test]
    fn test_lookup_falls_back_to_legacy_location() {
        let doc = parse("[general]\nenable_popularity_sort = false");
        let (path, value) = lookup(&doc, (Some("search"), "enable_popularity_sort")).expect("found");
        assert_eq!(path, "general.enable_popularity_sort");
        assert_eq!(value.as_bool(), Some(false));
    }

    #[test]
    fn test_normalize_relocates_into_new_section() {
        let mut doc = parse("version = \"1.0\"\n[general]\nenable_popularity_sort = false");
        assert_eq!(normalize(&mut doc), 2);

        assert_eq!(doc["config_version"].as_str(), Some("1.0"));
        assert!(!doc.contains_key("version"));
        assert_eq!(doc["search"]["enable_popularity_sort"].as_bool(), Some(false));
        assert!(!doc["general"]
            .as_table()
            .expect("table")
            .contains_key("enable_popularity_sort"));
    }

    #[test]
    fn test_normalize_keeps_current_value() {
        let mut doc = parse("[logging]\nmax_files = 9\nmax_log_files = 3");
        assert_eq!(normalize(&mut doc), 0);
        assert_eq!(doc["logging"]["max_log_files"].as_integer(), Some(3));
    }
}
