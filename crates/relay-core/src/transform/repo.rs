//! Repository name transformer.

/// Derives destination repository paths by inserting an alias segment.
#[derive(Debug, Clone, Default)]
pub struct RepoTransformer {
    alias: Option<String>,
}

impl RepoTransformer {
    pub fn new(alias: Option<String>) -> Self {
        Self { alias }
    }

    /// Insert the alias as the second path segment.
    ///
    /// `platform/build` becomes `platform/<alias>/build`; a single-segment
    /// name becomes `<alias>/<name>`.
    pub fn transform(&self, name: &str) -> String {
        let Some(alias) = self.alias.as_deref() else {
            return name.to_string();
        };
        if name.is_empty() {
            return String::new();
        }
        match name.split_once('/') {
            None => format!("{}/{}", alias, name),
            Some((first, rest)) => format!("{}/{}/{}", first, alias, rest),
        }
    }
}
