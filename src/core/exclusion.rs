use std::collections::HashMap;

/// Opt-out tag shared by every resource kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy<'a> {
    key: &'a str,
    value: &'a str,
}

impl<'a> ExclusionPolicy<'a> {
    pub fn new(key: &'a str, value: &'a str) -> Self {
        Self { key, value }
    }

    /// Exact, case-sensitive match on both key and value.
    pub fn is_excluded(&self, tags: &HashMap<String, String>) -> bool {
        tags.get(self.key).is_some_and(|v| v == self.value)
    }
}
