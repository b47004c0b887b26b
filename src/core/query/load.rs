//! Declared eager-load paths

/// The related-entity paths an entity kind can load
///
/// Paths are dot-separated navigations (`test_result.product`). Resolution
/// always includes a path's ancestors, so requesting `test_result.product`
/// also loads `test_result`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSpec {
    paths: Vec<&'static str>,
}

impl LoadSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a loadable path
    pub fn path(mut self, path: &'static str) -> Self {
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
        self
    }

    pub fn declared(&self) -> &[&'static str] {
        &self.paths
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| *p == path)
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Every declared path (the conservative plan)
    pub fn all(&self) -> Vec<&'static str> {
        self.paths.clone()
    }

    /// The declared paths needed for `required`, in declaration order
    ///
    /// A declared path is selected when it is required or is an ancestor of
    /// a required path. Required paths that are not declared are ignored here;
    /// [`QuerySpec::validate`](super::QuerySpec::validate) rejects them at startup.
    pub fn resolve<'a, I>(&self, required: I) -> Vec<&'static str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let required: Vec<&str> = required.into_iter().collect();
        self.paths
            .iter()
            .copied()
            .filter(|declared| required.iter().any(|req| covers(req, declared)))
            .collect()
    }
}

/// `declared` is `required` itself or one of its ancestors
fn covers(required: &str, declared: &str) -> bool {
    required == declared
        || required
            .strip_prefix(declared)
            .is_some_and(|rest| rest.starts_with('.'))
}
