//! Raw query parameters

use std::collections::HashMap;

/// Query-string key selecting the sort key
pub const SORT_BY_PARAM: &str = "sortBy";

/// Query-string key selecting the sort direction
pub const ASCENDING_PARAM: &str = "isAscending";

/// Raw, optional query parameters for a list request
///
/// Filter values are kept as the strings the client sent; typing happens
/// against the entity's [`FilterSet`](super::FilterSet), where anything that
/// does not parse is dropped.
///
/// # Example
/// ```text
/// GET /api/batches?batchName=Acme&status=true&sortBy=productionDate&isAscending=false
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParams {
    /// Filter name -> raw value
    pub filters: HashMap<String, String>,

    /// Sort key name, if any
    pub sort_by: Option<String>,

    /// Sort direction (defaults to ascending)
    pub ascending: bool,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            filters: HashMap::new(),
            sort_by: None,
            ascending: true,
        }
    }
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw filter value
    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(name.into(), value.into());
        self
    }

    /// Select a sort key and direction
    pub fn sort(mut self, key: impl Into<String>, ascending: bool) -> Self {
        self.sort_by = Some(key.into());
        self.ascending = ascending;
        self
    }

    /// Build from a decoded query string
    ///
    /// `sortBy` and `isAscending` are pulled out (case-insensitively); every
    /// other key is treated as a candidate filter. An `isAscending` value that
    /// is not a boolean keeps the ascending default.
    pub fn from_query_map(map: HashMap<String, String>) -> Self {
        let mut params = Self::default();
        for (key, value) in map {
            if key.eq_ignore_ascii_case(SORT_BY_PARAM) {
                let value = value.trim();
                if !value.is_empty() {
                    params.sort_by = Some(value.to_string());
                }
            } else if key.eq_ignore_ascii_case(ASCENDING_PARAM) {
                if let Some(ascending) = parse_bool(&value) {
                    params.ascending = ascending;
                }
            } else {
                params.filters.insert(key, value);
            }
        }
        params
    }

    /// Look up a raw filter value by name, ignoring ASCII case
    pub fn raw(&self, name: &str) -> Option<&str> {
        self.filters
            .get(name)
            .or_else(|| {
                self.filters
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, value)| value)
            })
            .map(String::as_str)
    }
}

/// Lenient boolean parse: `true`/`false` in any case, surrounding whitespace ignored
pub fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
