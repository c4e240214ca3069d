use std::collections::HashMap;

use crate::config::ListConfig;

/// Column ids togglable through flags. "page" is always on and cannot be
/// switched, so it is absent here.
pub const FLAG_COLUMNS: [&str; 8] = [
    "date",
    "user",
    "desc",
    "comments",
    "linkbacks",
    "tags",
    "image",
    "diff",
];

/// Built-in columns emitted between the page column and the provider
/// columns, in their fixed output order.
pub const ORDERED_COLUMNS: [&str; 5] = ["page", "date", "user", "desc", "diff"];

/// Column id -> detail level. 0 is disabled; boolean columns use 0/1;
/// date/user/desc carry graduated levels.
#[derive(Debug, Clone, Default)]
pub struct ColumnSet {
    levels: HashMap<String, u32>,
}

impl ColumnSet {
    pub fn from_config(config: &ListConfig) -> Self {
        let mut set = Self::default();
        set.set("page", 1);
        set.set("date", config.show_date);
        set.set("user", config.show_user);
        set.set("desc", config.show_desc);
        set.set("comments", config.show_comments as u32);
        set.set("linkbacks", config.show_linkbacks as u32);
        set.set("tags", config.show_tags as u32);
        set.set("image", config.show_image as u32);
        set.set("diff", config.show_diff as u32);
        set
    }

    pub fn level(&self, column: &str) -> u32 {
        self.levels.get(column).copied().unwrap_or(0)
    }

    pub fn is_enabled(&self, column: &str) -> bool {
        self.level(column) > 0
    }

    pub fn set(&mut self, column: &str, level: u32) {
        self.levels.insert(column.to_string(), level);
    }

    pub fn enable(&mut self, column: &str) {
        self.set(column, 1);
    }

    pub fn disable(&mut self, column: &str) {
        self.set(column, 0);
    }
}

/// One provider and the columns it serves, in registration order.
#[derive(Debug, Clone)]
pub struct ProviderEntry {
    pub name: String,
    pub columns: Vec<String>,
}

/// Ordered provider -> columns registry. Order matters: provider columns
/// are emitted in registration order after the built-ins.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    entries: Vec<ProviderEntry>,
}

impl ProviderRegistry {
    /// The default map between optional peer components and the built-in
    /// columns they serve.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.add("discussion", "comments");
        registry.add("linkback", "linkbacks");
        registry.add("tag", "tags");
        registry.add("pageimage", "image");
        registry
    }

    /// Registers `column` under `provider`, appending to an existing entry.
    /// Exact duplicates are ignored.
    pub fn add(&mut self, provider: &str, column: &str) {
        match self.entries.iter_mut().find(|entry| entry.name == provider) {
            Some(entry) => {
                if !entry.columns.iter().any(|c| c == column) {
                    entry.columns.push(column.to_string());
                }
            }
            None => self.entries.push(ProviderEntry {
                name: provider.to_string(),
                columns: vec![column.to_string()],
            }),
        }
    }

    pub fn entries(&self) -> &[ProviderEntry] {
        &self.entries
    }

    /// The provider serving a column, if any.
    pub fn provider_for(&self, column: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.columns.iter().any(|c| c == column))
            .map(|entry| entry.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_set_from_config() {
        let config = ListConfig {
            show_date: 2,
            show_desc: 160,
            show_tags: true,
            ..ListConfig::default()
        };
        let set = ColumnSet::from_config(&config);
        assert!(set.is_enabled("page"));
        assert_eq!(set.level("date"), 2);
        assert_eq!(set.level("desc"), 160);
        assert!(set.is_enabled("tags"));
        assert!(!set.is_enabled("comments"));
        assert_eq!(set.level("unknown"), 0);
    }

    #[test]
    fn test_registry_defaults() {
        let registry = ProviderRegistry::with_defaults();
        let names: Vec<_> = registry.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["discussion", "linkback", "tag", "pageimage"]);
        assert_eq!(registry.provider_for("image"), Some("pageimage"));
        assert_eq!(registry.provider_for("nope"), None);
    }

    #[test]
    fn test_registry_add_appends_and_dedupes() {
        let mut registry = ProviderRegistry::with_defaults();
        registry.add("tag", "tagcloud");
        registry.add("tag", "tagcloud");
        registry.add("tasks", "status");
        let tag = &registry.entries()[2];
        assert_eq!(tag.name, "tag");
        assert_eq!(tag.columns, ["tags", "tagcloud"]);
        let tasks = registry.entries().last().unwrap();
        assert_eq!(tasks.name, "tasks");
        assert_eq!(tasks.columns, ["status"]);
    }
}
