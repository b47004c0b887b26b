//! Named ordering keys

use indexmap::IndexMap;
use std::cmp::Ordering;
use std::sync::Arc;

type Comparator<E> = Arc<dyn Fn(&E, &E) -> Ordering + Send + Sync>;

/// One named ordering key
///
/// Keys that read through a related entity see `None` when that entity is
/// not loaded or missing; `None` sorts before every present value.
pub struct SortKey<E> {
    name: &'static str,
    requires: Vec<&'static str>,
    compare: Comparator<E>,
}

impl<E> std::fmt::Debug for SortKey<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortKey")
            .field("name", &self.name)
            .field("requires", &self.requires)
            .finish()
    }
}

impl<E: 'static> SortKey<E> {
    /// Order by any `Ord` value (`Option` keys put `None` first)
    pub fn by<K, F>(name: &'static str, key: F) -> Self
    where
        K: Ord,
        F: Fn(&E) -> K + Send + Sync + 'static,
    {
        Self {
            name,
            requires: Vec::new(),
            compare: Arc::new(move |a: &E, b: &E| key(a).cmp(&key(b))),
        }
    }

    /// Order by a text field, ignoring case first and falling back to ordinal order
    pub fn text<F>(name: &'static str, get: F) -> Self
    where
        F: for<'a> Fn(&'a E) -> Option<&'a str> + Send + Sync + 'static,
    {
        Self {
            name,
            requires: Vec::new(),
            compare: Arc::new(move |a: &E, b: &E| match (get(a), get(b)) {
                (Some(x), Some(y)) => x.to_lowercase().cmp(&y.to_lowercase()).then(x.cmp(y)),
                (x, y) => x.cmp(&y),
            }),
        }
    }

    /// Order by a float field using IEEE total order
    pub fn float<F>(name: &'static str, get: F) -> Self
    where
        F: Fn(&E) -> Option<f64> + Send + Sync + 'static,
    {
        Self {
            name,
            requires: Vec::new(),
            compare: Arc::new(move |a: &E, b: &E| match (get(a), get(b)) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                (x, y) => x.is_some().cmp(&y.is_some()),
            }),
        }
    }

    /// Declare a related path this key dereferences
    pub fn requires(mut self, path: &'static str) -> Self {
        self.requires.push(path);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn required_paths(&self) -> &[&'static str] {
        &self.requires
    }

    pub fn compare(&self, a: &E, b: &E) -> Ordering {
        (self.compare)(a, b)
    }

    /// Sort in place. Descending is the exact reverse of ascending, ties included.
    pub fn apply(&self, rows: &mut [E], ascending: bool) {
        rows.sort_by(|a, b| (self.compare)(a, b));
        if !ascending {
            rows.reverse();
        }
    }
}

/// Per-entity table of sort keys
pub struct SortSet<E> {
    keys: IndexMap<&'static str, SortKey<E>>,
}

impl<E> std::fmt::Debug for SortSet<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.keys.values()).finish()
    }
}

impl<E> Default for SortSet<E> {
    fn default() -> Self {
        Self {
            keys: IndexMap::new(),
        }
    }
}

impl<E: 'static> SortSet<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: SortKey<E>) {
        self.keys.insert(key.name, key);
    }

    pub fn iter(&self) -> impl Iterator<Item = &SortKey<E>> {
        self.keys.values()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Resolve a requested key name (ASCII case-insensitive). Unknown names yield `None`.
    pub fn select(&self, name: Option<&str>) -> Option<&SortKey<E>> {
        let name = name?.trim();
        self.keys.get(name).or_else(|| {
            self.keys
                .values()
                .find(|key| key.name.eq_ignore_ascii_case(name))
        })
    }
}
