//! Tag-based selection of resources for a download run.

use crate::resource::Resource;

/// Selects resources carrying every `include` tag and none of the `exclude` tags.
///
/// Tags compare as exact, case-sensitive strings. An empty filter selects
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl TagFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        self.include.iter().all(|t| resource.has_tag(t))
            && !self.exclude.iter().any(|t| resource.has_tag(t))
    }
}
