//! Branch name transformer.

use chrono::{Local, NaiveDate};

const DATE_SUFFIX_FORMAT: &str = "%y%m%d";

/// Derives destination branch names from manifest revisions.
#[derive(Debug, Clone, Default)]
pub struct BranchTransformer {
    add_date_suffix: bool,
    fixed_date: Option<NaiveDate>,
}

impl BranchTransformer {
    /// Create a transformer; with `add_date_suffix` the local date
    /// (`yymmdd`) is appended to every non-empty name.
    pub fn new(add_date_suffix: bool) -> Self {
        Self {
            add_date_suffix,
            fixed_date: None,
        }
    }

    /// Use a fixed date instead of the local clock.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.fixed_date = Some(date);
        self
    }

    pub fn transform(&self, name: &str) -> String {
        if name.is_empty() || !self.add_date_suffix {
            return name.to_string();
        }
        let date = self
            .fixed_date
            .unwrap_or_else(|| Local::now().date_naive());
        format!("{}{}", name, date.format(DATE_SUFFIX_FORMAT))
    }

    pub fn transform_revision(&self, revision: Option<&str>) -> Option<String> {
        revision.map(|r| self.transform(r))
    }
}
