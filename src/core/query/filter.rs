//! Named, typed, optional filter predicates

use super::params::{QueryParams, parse_bool};
use crate::core::temporal::parse_date;
use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use std::sync::Arc;

/// A predicate compiled from one filter value
pub type Predicate<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

type Compiler<E> = Arc<dyn Fn(&str) -> Option<Predicate<E>> + Send + Sync>;

/// Declared input type of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Case-insensitive substring containment
    Contains,
    /// Ordinal equality
    Exact,
    /// `true` / `false`
    Bool,
    /// Signed integer
    Int,
    /// Calendar day (any `parse_date` input or `YYYY-MM-DD`)
    Date,
}

/// One named filter: a parse step and a predicate over the parsed value
pub struct FilterDef<E> {
    name: &'static str,
    kind: FilterKind,
    requires: Vec<&'static str>,
    compile: Compiler<E>,
}

impl<E> std::fmt::Debug for FilterDef<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterDef")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("requires", &self.requires)
            .finish()
    }
}

impl<E: 'static> FilterDef<E> {
    /// Build a filter from a parse function and a predicate over its output.
    ///
    /// `parse` returning `None` means the raw value is unusable and the
    /// filter is skipped for that query.
    pub fn typed<T, P, F>(name: &'static str, kind: FilterKind, parse: P, predicate: F) -> Self
    where
        T: Send + Sync + 'static,
        P: Fn(&str) -> Option<T> + Send + Sync + 'static,
        F: Fn(&T, &E) -> bool + Send + Sync + 'static,
    {
        let predicate = Arc::new(predicate);
        Self {
            name,
            kind,
            requires: Vec::new(),
            compile: Arc::new(move |raw: &str| {
                let value = parse(raw)?;
                let predicate = Arc::clone(&predicate);
                Some(Box::new(move |entity: &E| predicate(&value, entity)) as Predicate<E>)
            }),
        }
    }

    /// Case-insensitive substring match on a text field
    pub fn contains<F>(name: &'static str, get: F) -> Self
    where
        F: for<'a> Fn(&'a E) -> Option<&'a str> + Send + Sync + 'static,
    {
        Self::typed(
            name,
            FilterKind::Contains,
            |raw| parse_text(raw).map(|s| s.to_lowercase()),
            move |needle: &String, entity: &E| {
                get(entity).is_some_and(|hay| hay.to_lowercase().contains(needle.as_str()))
            },
        )
    }

    /// Ordinal equality on a text field; never matches a partial value
    pub fn exact<F>(name: &'static str, get: F) -> Self
    where
        F: for<'a> Fn(&'a E) -> Option<&'a str> + Send + Sync + 'static,
    {
        Self::typed(
            name,
            FilterKind::Exact,
            parse_text,
            move |expected: &String, entity: &E| get(entity) == Some(expected.as_str()),
        )
    }

    /// Equality on a boolean field
    pub fn flag<F>(name: &'static str, get: F) -> Self
    where
        F: Fn(&E) -> Option<bool> + Send + Sync + 'static,
    {
        Self::typed(
            name,
            FilterKind::Bool,
            parse_bool,
            move |expected: &bool, entity: &E| get(entity) == Some(*expected),
        )
    }

    /// Equality on an integer field
    pub fn int<F>(name: &'static str, get: F) -> Self
    where
        F: Fn(&E) -> Option<i64> + Send + Sync + 'static,
    {
        Self::typed(
            name,
            FilterKind::Int,
            parse_int,
            move |expected: &i64, entity: &E| get(entity) == Some(*expected),
        )
    }

    /// Timestamp falls on the given calendar day
    pub fn on_day<F>(name: &'static str, get: F) -> Self
    where
        F: Fn(&E) -> Option<NaiveDateTime> + Send + Sync + 'static,
    {
        Self::typed(
            name,
            FilterKind::Date,
            parse_day,
            move |day: &NaiveDate, entity: &E| get(entity).is_some_and(|ts| ts.date() == *day),
        )
    }

    /// Timestamp falls on or after the given calendar day
    pub fn since<F>(name: &'static str, get: F) -> Self
    where
        F: Fn(&E) -> Option<NaiveDateTime> + Send + Sync + 'static,
    {
        Self::typed(
            name,
            FilterKind::Date,
            parse_day,
            move |day: &NaiveDate, entity: &E| get(entity).is_some_and(|ts| ts.date() >= *day),
        )
    }

    /// Timestamp falls on or before the given calendar day
    pub fn until<F>(name: &'static str, get: F) -> Self
    where
        F: Fn(&E) -> Option<NaiveDateTime> + Send + Sync + 'static,
    {
        Self::typed(
            name,
            FilterKind::Date,
            parse_day,
            move |day: &NaiveDate, entity: &E| get(entity).is_some_and(|ts| ts.date() <= *day),
        )
    }

    /// Declare a related path this filter dereferences
    pub fn requires(mut self, path: &'static str) -> Self {
        self.requires.push(path);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn required_paths(&self) -> &[&'static str] {
        &self.requires
    }

    /// Compile a raw value. `None` when absent or unparsable.
    pub fn compile(&self, raw: &str) -> Option<Predicate<E>> {
        if raw.trim().is_empty() {
            return None;
        }
        (self.compile)(raw)
    }
}

fn parse_text(raw: &str) -> Option<String> {
    let s = raw.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    parse_date(raw)
        .map(|ts| ts.date())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
}

/// Per-entity table of filters, in declaration order
pub struct FilterSet<E> {
    defs: IndexMap<&'static str, FilterDef<E>>,
}

impl<E> std::fmt::Debug for FilterSet<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.defs.values()).finish()
    }
}

impl<E> Default for FilterSet<E> {
    fn default() -> Self {
        Self {
            defs: IndexMap::new(),
        }
    }
}

impl<E: 'static> FilterSet<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter. A later filter with the same name replaces the earlier one.
    pub fn insert(&mut self, def: FilterDef<E>) {
        self.defs.insert(def.name, def);
    }

    pub fn get(&self, name: &str) -> Option<&FilterDef<E>> {
        self.defs.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterDef<E>> {
        self.defs.values()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Combine every present, parsable filter value into one AND-ed predicate.
    ///
    /// Query keys that name no registered filter are ignored.
    pub fn compile(&self, params: &QueryParams) -> CompiledFilter<'_, E> {
        let mut compiled = CompiledFilter {
            predicates: Vec::new(),
            applied: Vec::new(),
        };

        for def in self.defs.values() {
            let Some(raw) = params.raw(def.name) else {
                continue;
            };
            match def.compile(raw) {
                Some(predicate) => {
                    compiled.predicates.push(predicate);
                    compiled.applied.push(def);
                }
                None if raw.trim().is_empty() => {}
                None => {
                    tracing::debug!(
                        filter = def.name,
                        kind = ?def.kind,
                        value = raw,
                        "ignoring unparsable filter value"
                    );
                }
            }
        }

        compiled
    }
}

/// The AND of every filter applied to one query
pub struct CompiledFilter<'s, E> {
    predicates: Vec<Predicate<E>>,
    applied: Vec<&'s FilterDef<E>>,
}

impl<E> CompiledFilter<'_, E> {
    pub fn matches(&self, entity: &E) -> bool {
        self.predicates.iter().all(|p| p(entity))
    }

    /// Names of the filters that will narrow the result
    pub fn applied(&self) -> Vec<&'static str> {
        self.applied.iter().map(|def| def.name).collect()
    }

    /// Related paths the applied filters dereference
    pub fn required_paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.applied.iter().flat_map(|def| def.requires.iter().copied())
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[derive(Debug, Clone)]
    struct Row {
        id: i64,
        name: String,
        status: bool,
        made: NaiveDateTime,
        owner: Option<String>,
    }

    fn made(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, d)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: 1,
                name: "Acme Batch".to_string(),
                status: true,
                made: made(1),
                owner: Some("Lab A".to_string()),
            },
            Row {
                id: 2,
                name: "Acme Batch Extra".to_string(),
                status: false,
                made: made(2),
                owner: None,
            },
        ]
    }

    fn set() -> FilterSet<Row> {
        let mut set = FilterSet::new();
        set.insert(FilterDef::contains("name", |r: &Row| Some(r.name.as_str())));
        set.insert(FilterDef::exact("exactName", |r: &Row| Some(r.name.as_str())));
        set.insert(FilterDef::flag("status", |r: &Row| Some(r.status)));
        set.insert(FilterDef::int("id", |r: &Row| Some(r.id)));
        set.insert(FilterDef::on_day("made", |r: &Row| Some(r.made)));
        set.insert(FilterDef::since("madeFrom", |r: &Row| Some(r.made)));
        set.insert(FilterDef::contains("owner", |r: &Row| r.owner.as_deref()).requires("owner"));
        set
    }

    fn ids(set: &FilterSet<Row>, params: &QueryParams) -> Vec<i64> {
        let compiled = set.compile(params);
        rows()
            .into_iter()
            .filter(|r| compiled.matches(r))
            .map(|r| r.id)
            .collect()
    }

    #[test]
    fn test_contains_and_flag_compose() {
        let params = QueryParams::new().filter("name", "acme").filter("status", "true");
        assert_eq!(ids(&set(), &params), vec![1]);
    }

    #[test]
    fn test_exact_never_matches_partial() {
        let params = QueryParams::new().filter("exactName", "Acme Batch");
        assert_eq!(ids(&set(), &params), vec![1]);
        let params = QueryParams::new().filter("exactName", "Acme");
        assert!(ids(&set(), &params).is_empty());
        let params = QueryParams::new().filter("exactName", "acme batch");
        assert!(ids(&set(), &params).is_empty());
    }

    #[test]
    fn test_absent_values_do_not_narrow() {
        for name in ["name", "exactName", "status", "id", "made", "owner"] {
            for raw in ["", "   "] {
                let params = QueryParams::new().filter(name, raw);
                assert_eq!(ids(&set(), &params), vec![1, 2], "{}={:?}", name, raw);
            }
        }
    }

    #[test]
    fn test_invalid_typed_values_do_not_narrow() {
        for (name, raw) in [("status", "maybe"), ("id", "one"), ("made", "31/02/2024")] {
            let params = QueryParams::new().filter(name, raw);
            let set = set();
            let compiled = set.compile(&params);
            assert!(compiled.is_empty(), "{} should be skipped", name);
            assert_eq!(ids(&set, &params), vec![1, 2]);
        }
    }

    #[test]
    fn test_date_filters() {
        let params = QueryParams::new().filter("made", "2/3/2024");
        assert_eq!(ids(&set(), &params), vec![2]);
        let params = QueryParams::new().filter("made", "2024-03-01");
        assert_eq!(ids(&set(), &params), vec![1]);
        let params = QueryParams::new().filter("madeFrom", "02/03/2024 00:00");
        assert_eq!(ids(&set(), &params), vec![2]);
    }

    #[test]
    fn test_missing_related_value_does_not_match() {
        let params = QueryParams::new().filter("owner", "lab");
        assert_eq!(ids(&set(), &params), vec![1]);
    }

    #[test]
    fn test_applied_and_required_paths() {
        let params = QueryParams::new()
            .filter("owner", "lab")
            .filter("status", "nope")
            .filter("unknown", "x");
        let set = set();
        let compiled = set.compile(&params);
        assert_eq!(compiled.applied(), vec!["owner"]);
        assert_eq!(compiled.required_paths().collect::<Vec<_>>(), vec!["owner"]);
    }

    #[test]
    fn test_declaration_order_and_replace() {
        let mut set = set();
        let before = set.len();
        set.insert(FilterDef::exact("name", |r: &Row| Some(r.name.as_str())));
        assert_eq!(set.len(), before);
        assert_eq!(set.get("name").unwrap().kind(), FilterKind::Exact);
        assert_eq!(set.iter().next().unwrap().name(), "name");
    }
}
