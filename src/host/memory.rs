use std::collections::HashMap;
use std::rc::Rc;

use serde::Deserialize;
use serde_json::Value;

use crate::host::{ColumnProvider, LinkBuilder, Localizer, MetadataSource, PageStore, ProviderSource};
use crate::render::escape_html;

/// One page known to the in-memory host.
#[derive(Debug, Clone, Deserialize)]
pub struct SitePage {
    #[serde(default = "default_exists")]
    pub exists: bool,
    /// Metadata tree as the host's cache would return it.
    #[serde(default)]
    pub meta: Value,
}

fn default_exists() -> bool {
    true
}

/// A stub column provider defined by data: header labels and per-page cell
/// fragments, keyed by column.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MemoryProvider {
    pub labels: HashMap<String, String>,
    /// page id -> column -> HTML fragment
    pub cells: HashMap<String, HashMap<String, String>>,
}

impl ColumnProvider for MemoryProvider {
    fn header_label(&self, column: &str) -> String {
        self.labels
            .get(column)
            .cloned()
            .unwrap_or_else(|| column.to_string())
    }

    fn cell_content(&self, id: &str, column: &str) -> String {
        self.cells
            .get(id)
            .and_then(|cols| cols.get(column))
            .cloned()
            .unwrap_or_default()
    }
}

/// In-memory host backing the demo binary and the integration tests: a page
/// table with metadata, wiki-style URLs and data-defined providers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryHost {
    /// Relative base path, e.g. "/".
    pub base_url: String,
    /// Absolute site prefix used for absolute URLs.
    pub site_url: String,
    pub pages: HashMap<String, SitePage>,
    pub providers: HashMap<String, MemoryProvider>,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self {
            base_url: "/".to_string(),
            site_url: "https://wiki.example.com".to_string(),
            pages: HashMap::new(),
            providers: HashMap::new(),
        }
    }
}

impl MemoryHost {
    fn relative_page_url(&self, id: &str, params: &[(&str, &str)]) -> String {
        let mut url = format!("{}doku.php?id={}", self.base_url, id);
        for (key, value) in params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(value);
        }
        url
    }
}

impl Localizer for MemoryHost {
    fn lang(&self, key: &str) -> String {
        match key {
            "page" => "Page",
            "date" => "Date",
            "user" => "User",
            "desc" => "Description",
            "diff" => "Diff",
            "diff_title" => "Show differences to current revisions",
            "diff_alt" => "Show differences",
            other => other,
        }
        .to_string()
    }
}

impl PageStore for MemoryHost {
    fn exists(&self, id: &str) -> bool {
        self.pages.get(id).map(|page| page.exists).unwrap_or(false)
    }

    fn backing_file(&self, id: &str) -> String {
        format!("data/pages/{}.txt", id.replace(':', "/"))
    }
}

impl MetadataSource for MemoryHost {
    fn metadata(&self, id: &str) -> Option<Value> {
        self.pages
            .get(id)
            .map(|page| page.meta.clone())
            .filter(|meta| !meta.is_null())
    }
}

impl LinkBuilder for MemoryHost {
    fn page_url(&self, id: &str, params: &[(&str, &str)], absolute: bool) -> String {
        let relative = self.relative_page_url(id, params);
        if absolute {
            format!("{}{}", self.site_url.trim_end_matches('/'), relative)
        } else {
            relative
        }
    }

    fn media_url(&self, id: &str) -> String {
        format!("{}lib/exe/fetch.php?media={}", self.base_url, id)
    }

    fn resource_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn user_link(&self, login: &str) -> String {
        format!(
            "<a href=\"{}doku.php?id=user:{}\" class=\"wikiuser\">{}</a>",
            self.base_url,
            login,
            escape_html(login)
        )
    }
}

impl ProviderSource for MemoryHost {
    fn acquire(&self, name: &str) -> Option<Rc<dyn ColumnProvider>> {
        self.providers
            .get(name)
            .map(|provider| Rc::new(provider.clone()) as Rc<dyn ColumnProvider>)
    }
}
