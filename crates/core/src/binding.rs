//! Discovery of dynamic-list containers from element attributes.
//!
//! A container opts in with the [`MARKER_ATTR`] attribute; its sibling
//! `data-*` attributes configure the list. Every value is coerced: bad JSON
//! becomes an empty seed list, a non-numeric capacity falls back to the
//! default. Nothing here fails.

use std::collections::BTreeMap;

use crate::dynamic_list::{ListConfig, ListMode, DEFAULT_MAX_FILE_ROWS};

/// Marker attribute. Its value names the list mode (`text` or `file`).
pub const MARKER_ATTR: &str = "data-dynamic-list";
pub const FIELD_NAME_ATTR: &str = "data-field-name";
pub const DATALIST_ATTR: &str = "data-datalist";
pub const ADD_BUTTON_ATTR: &str = "data-add-button";
pub const REQUIRED_ATTR: &str = "data-required";
pub const INITIAL_ATTR: &str = "data-initial";
pub const MAX_ROWS_ATTR: &str = "data-max-rows";

/// Default submitted field name of a text list.
pub const DEFAULT_TEXT_FIELD: &str = "destinations[]";

/// Default submitted field name of a file list.
pub const DEFAULT_FILE_FIELD: &str = "new_photos";

/// Attribute snapshot of one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementAttributes {
    attrs: BTreeMap<String, String>,
}

impl ElementAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ElementAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            attrs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Boolean attribute: present-and-empty counts as set, as do the usual
/// truthy spellings.
pub fn parse_flag(raw: Option<&str>) -> bool {
    match raw {
        None => false,
        Some(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "" | "true" | "1" | "yes" | "on" | "required"
        ),
    }
}

/// Seed values from a JSON array. Strings are kept as-is, numbers are
/// stringified, anything else is dropped. Malformed JSON yields no seeds.
pub fn parse_initial_values(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Vec::new();
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(value) => Some(value),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Ok(other) => {
            tracing::debug!(kind = json_kind(&other), "Seed list is not a JSON array");
            Vec::new()
        }
        Err(e) => {
            tracing::debug!(error = %e, "Seed list is not valid JSON");
            Vec::new()
        }
    }
}

/// Upload capacity. Integers and finite decimals (truncated) are accepted;
/// negatives floor at zero; anything else is [`DEFAULT_MAX_FILE_ROWS`].
pub fn parse_max_rows(raw: Option<&str>) -> usize {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return DEFAULT_MAX_FILE_ROWS;
    };
    let parsed = raw.parse::<i64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(|n| n.trunc() as i64)
    });
    match parsed {
        Some(n) => usize::try_from(n.max(0)).unwrap_or(DEFAULT_MAX_FILE_ROWS),
        None => {
            tracing::debug!(raw, "Non-numeric upload capacity, using default");
            DEFAULT_MAX_FILE_ROWS
        }
    }
}

/// Build a list configuration from a marked element's attributes.
pub fn config_from_attributes(attrs: &ElementAttributes) -> ListConfig {
    let mode = ListMode::from_attr(attrs.get(MARKER_ATTR).unwrap_or_default());
    let default_field = match mode {
        ListMode::Text => DEFAULT_TEXT_FIELD,
        ListMode::File => DEFAULT_FILE_FIELD,
    };
    let field_name = attrs
        .get(FIELD_NAME_ATTR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(default_field);
    let non_empty = |name: &str| {
        attrs
            .get(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let base = match mode {
        ListMode::Text => ListConfig::text(field_name)
            .with_required(parse_flag(attrs.get(REQUIRED_ATTR)))
            .with_initial_values(parse_initial_values(attrs.get(INITIAL_ATTR))),
        ListMode::File => {
            ListConfig::file(field_name).with_max_rows(parse_max_rows(attrs.get(MAX_ROWS_ATTR)))
        }
    };

    ListConfig {
        datalist: non_empty(DATALIST_ATTR),
        add_button: non_empty(ADD_BUTTON_ATTR),
        ..base
    }
}

/// Configurations for every element carrying [`MARKER_ATTR`], in document
/// order.
pub fn discover(elements: &[ElementAttributes]) -> Vec<ListConfig> {
    let configs: Vec<ListConfig> = elements
        .iter()
        .filter(|element| element.has(MARKER_ATTR))
        .map(config_from_attributes)
        .collect();
    tracing::debug!(count = configs.len(), "Discovered dynamic lists");
    configs
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamic_list::ListManager;

    #[test]
    fn flag_spellings() {
        assert!(parse_flag(Some("")));
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some(" Required ")));
        assert!(parse_flag(Some("1")));
        assert!(!parse_flag(Some("false")));
        assert!(!parse_flag(Some("0")));
        assert!(!parse_flag(None));
    }

    #[test]
    fn initial_values_accept_strings_and_numbers() {
        let values = parse_initial_values(Some(r#"["Goa", 42, null, {"x": 1}, "Pune"]"#));
        assert_eq!(values, vec!["Goa", "42", "Pune"]);
    }

    #[test]
    fn initial_values_tolerate_garbage() {
        assert!(parse_initial_values(Some("not-json")).is_empty());
        assert!(parse_initial_values(Some(r#"{"a": "b"}"#)).is_empty());
        assert!(parse_initial_values(Some("   ")).is_empty());
        assert!(parse_initial_values(None).is_empty());
    }

    #[test]
    fn max_rows_coercion() {
        assert_eq!(parse_max_rows(Some("5")), 5);
        assert_eq!(parse_max_rows(Some(" 3.9 ")), 3);
        assert_eq!(parse_max_rows(Some("-2")), 0);
        assert_eq!(parse_max_rows(Some("0")), 0);
        assert_eq!(parse_max_rows(Some("lots")), DEFAULT_MAX_FILE_ROWS);
        assert_eq!(parse_max_rows(Some("NaN")), DEFAULT_MAX_FILE_ROWS);
        assert_eq!(parse_max_rows(None), DEFAULT_MAX_FILE_ROWS);
    }

    #[test]
    fn text_container_config() {
        let attrs = ElementAttributes::new()
            .with(MARKER_ATTR, "")
            .with(FIELD_NAME_ATTR, "stops[]")
            .with(DATALIST_ATTR, "city-options")
            .with(REQUIRED_ATTR, "true")
            .with(INITIAL_ATTR, r#"["Goa"]"#);

        let config = config_from_attributes(&attrs);
        assert_eq!(config.mode, ListMode::Text);
        assert_eq!(config.field_name, "stops[]");
        assert_eq!(config.datalist.as_deref(), Some("city-options"));
        assert!(config.required);
        assert_eq!(config.initial_values, vec!["Goa"]);
        assert_eq!(config.add_button, None);
    }

    #[test]
    fn file_container_defaults() {
        let attrs = ElementAttributes::new()
            .with(MARKER_ATTR, "file")
            .with(REQUIRED_ATTR, "true");

        let config = config_from_attributes(&attrs);
        assert_eq!(config.mode, ListMode::File);
        assert_eq!(config.field_name, DEFAULT_FILE_FIELD);
        assert_eq!(config.max_rows, DEFAULT_MAX_FILE_ROWS);
        assert!(!config.required);
    }

    #[test]
    fn discover_skips_unmarked_elements() {
        let elements = vec![
            ElementAttributes::new().with("id", "plain"),
            ElementAttributes::new().with(MARKER_ATTR, "text"),
            ElementAttributes::new()
                .with(MARKER_ATTR, "file")
                .with(MAX_ROWS_ATTR, "4"),
        ];
        let configs = discover(&elements);
        assert_eq!(configs.len(), 2);
        assert_eq!(configs[0].mode, ListMode::Text);
        assert_eq!(configs[1].max_rows, 4);
    }

    #[test]
    fn malformed_seed_binds_single_empty_row() {
        let attrs: ElementAttributes = [
            (MARKER_ATTR, "text"),
            (REQUIRED_ATTR, "true"),
            (INITIAL_ATTR, "not-json"),
        ]
        .into_iter()
        .collect();

        let list = ListManager::bind(config_from_attributes(&attrs));
        assert_eq!(list.len(), 1);
        assert!(list.rows()[0].is_empty());
        assert_eq!(list.focused(), None);
    }
}
