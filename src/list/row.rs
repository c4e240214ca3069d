use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

/// One caller-supplied page entry. Only `id` is required; everything else is
/// computed lazily by the cell formatters and memoized back into the row.
///
/// `user` and `desc` distinguish "absent" from "explicitly empty": an
/// explicit value, even an empty one, suppresses the metadata fallback.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PageRow {
    pub id: String,
    pub title: Option<String>,
    /// Media id rendered as an image in place of the text title.
    pub titleimage: Option<String>,
    /// Unix timestamp.
    pub date: Option<i64>,
    pub user: Option<String>,
    pub desc: Option<String>,
    /// Description supplied by the listing syntax, weaker than `desc`.
    pub description: Option<String>,
    pub exists: Option<bool>,
    /// Caller-side permission level; carried, never interpreted here.
    pub perm: Option<u32>,
    pub draft: Option<bool>,
    /// Task priority, becomes a "priority{value}" row class.
    pub priority: Option<String>,
    pub class: Option<String>,
    /// Backing storage path, filled in by the existence check.
    pub file: Option<String>,
    /// Section id, appended to page URLs as an anchor.
    pub section: Option<String>,
    /// Provider column values and memoized provider cells.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl PageRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn extra_str(&self, column: &str) -> Option<&str> {
        self.extra.get(column).and_then(Value::as_str)
    }
}

/// Readable fallback title for a page id: the last namespace component with
/// underscores replaced by spaces.
pub fn humanize_id(id: &str) -> String {
    let name = id.rsplit(':').next().unwrap_or(id);
    name.replace('_', " ")
}
