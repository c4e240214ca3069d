use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::config::{ListConfig, SortMode, Style};
use crate::host::{meta_lookup, ColumnProvider, Host};
use crate::list::columns::{ColumnSet, ProviderRegistry, FLAG_COLUMNS, ORDERED_COLUMNS};
use crate::list::row::{humanize_id, PageRow};
use crate::render::{OutputSink, Shell};

/// A page-listing render session: configure, then run one
/// `start_list` -> `add_page`* -> `finish_list` cycle. `finish_list`
/// resets the session so the instance can be reused.
///
/// Not safe for concurrent use; callers serialize one cycle at a time.
pub struct PageList {
    pub(crate) host: Host,
    defaults: ListConfig,

    pub(crate) style: Style,
    pub(crate) show_header: bool,
    pub(crate) show_firsthl: bool,
    sort: bool,
    rsort: bool,
    pub(crate) date_format: String,

    pub(crate) columns: ColumnSet,
    registry: ProviderRegistry,
    pub(crate) acquired: HashMap<String, Rc<dyn ColumnProvider>>,
    /// Header labels computed once per session.
    headers: HashMap<String, String>,

    /// Current row; doubles as the "any row added" marker for the
    /// zero-row guard in `finish_list`.
    row: Option<PageRow>,
    /// Per-row metadata cache.
    meta: Option<Value>,
}

enum LabelSource<'a> {
    Localized,
    Provider(&'a str),
}

impl PageList {
    pub fn new(config: ListConfig, host: Host) -> Self {
        let mut list = Self {
            host,
            defaults: config,
            style: Style::Default,
            show_header: false,
            show_firsthl: false,
            sort: false,
            rsort: false,
            date_format: String::new(),
            columns: ColumnSet::default(),
            registry: ProviderRegistry::default(),
            acquired: HashMap::new(),
            headers: HashMap::new(),
            row: None,
            meta: None,
        };
        list.reset();
        list
    }

    /// Restores the session to its constructed defaults. Idempotent;
    /// called by `finish_list` after every cycle.
    pub fn reset(&mut self) {
        self.style = self.defaults.style;
        self.show_header = self.defaults.show_header;
        self.show_firsthl = self.defaults.show_firsthl;
        self.sort = self.defaults.sort;
        self.rsort = self.defaults.rsort;
        self.date_format = self.defaults.date_format.clone();
        self.columns = ColumnSet::from_config(&self.defaults);
        self.registry = ProviderRegistry::with_defaults();
        self.acquired.clear();
        self.headers.clear();
        self.row = None;
        self.meta = None;
    }

    /// Registers an extra column served by a provider component and
    /// force-enables it.
    pub fn add_column(&mut self, provider: &str, column: &str) {
        self.registry.add(provider, column);
        self.columns.enable(column);
    }

    /// Applies flag tokens in order; later tokens override earlier ones.
    /// Recognized: style names, `(no)header`, `(no)firsthl`,
    /// `sort`/`rsort`/`nosort`, column names and their `no`-prefixed
    /// forms, and the `showdiff` alias. Unknown tokens are ignored.
    pub fn set_flags<I, S>(&mut self, flags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for flag in flags {
            let mut flag = flag.as_ref();
            match flag {
                "default" => self.style = Style::Default,
                "table" => self.style = Style::Table,
                "list" => self.style = Style::List,
                "simplelist" => self.style = Style::SimpleList,
                "header" => self.show_header = true,
                "noheader" => self.show_header = false,
                "firsthl" => self.show_firsthl = true,
                "nofirsthl" => self.show_firsthl = false,
                "sort" => {
                    self.sort = true;
                    self.rsort = false;
                }
                "rsort" => {
                    self.sort = false;
                    self.rsort = true;
                }
                "nosort" => {
                    self.sort = false;
                    self.rsort = false;
                }
                "showdiff" => flag = "diff",
                _ => {}
            }

            let (name, enable) = match flag.strip_prefix("no") {
                Some(rest) => (rest, false),
                None => (flag, true),
            };
            if FLAG_COLUMNS.contains(&name) {
                if enable {
                    self.columns.enable(name);
                } else {
                    self.columns.disable(name);
                }
            }
        }
        true
    }

    /// Sort direction recorded for the caller; this component never sorts.
    pub fn sort_mode(&self) -> SortMode {
        if self.sort {
            SortMode::Ascending
        } else if self.rsort {
            SortMode::Descending
        } else {
            SortMode::None
        }
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Opens the listing shell and emits the header row. Simplelist
    /// suppresses header and first-headline display for this session.
    pub fn start_list(&mut self, caller_class: Option<&str>, sink: &mut dyn OutputSink) -> bool {
        trace!(style = ?self.style, "opening page list");
        let shell = match self.style {
            Style::Table => Some("inline"),
            Style::List => Some("ul"),
            Style::Default => Some("pagelist"),
            Style::SimpleList => None,
        };
        let shell = match shell {
            Some(base) => {
                let class = match caller_class {
                    Some(extra) => format!("{} {}", base, extra),
                    None => base.to_string(),
                };
                Shell::Table { class }
            }
            None => {
                self.show_header = false;
                self.show_firsthl = false;
                Shell::List
            }
        };
        sink.open_container(&shell);

        self.row = None;
        self.acquire_providers();

        if self.show_header {
            self.render_header(sink);
        }
        true
    }

    /// Adds one page row. Fails without emitting anything when the row has
    /// no id.
    pub fn add_page(&mut self, row: PageRow, sink: &mut dyn OutputSink) -> bool {
        if row.id.is_empty() {
            return false;
        }
        let mut row = row;
        self.meta = None;

        if self.style != Style::SimpleList {
            if row.draft.is_none() {
                let is_draft = self
                    .get_meta(&row, "type", None)
                    .and_then(|v| v.as_str().map(|s| s == "draft"))
                    .unwrap_or(false);
                row.draft = Some(is_draft);
            }

            let mut class = String::new();
            if let Some(priority) = &row.priority {
                class.push_str(&format!("priority{} ", priority));
            }
            if row.draft == Some(true) {
                class.push_str("draft ");
            }
            if let Some(extra) = &row.class {
                class.push_str(extra);
            }
            let class = class.trim_end().to_string();

            sink.open_row(if class.is_empty() {
                None
            } else {
                Some(class.as_str())
            });

            if self.columns.is_enabled("image") {
                if let Some(provider) = self.image_provider() {
                    self.provider_cell(&provider, "image", &mut row, sink);
                }
            }
            self.page_cell(&mut row, sink);
            if self.columns.is_enabled("date") {
                self.date_cell(&mut row, sink);
            }
            if self.columns.is_enabled("user") {
                self.user_cell(&mut row, sink);
            }
            if self.columns.is_enabled("desc") {
                self.desc_cell(&mut row, sink);
            }
            if self.columns.is_enabled("diff") {
                self.diff_cell(&mut row, sink);
            }
            for entry in self.registry.entries().to_vec() {
                for column in &entry.columns {
                    if column.as_str() != "image" && self.columns.is_enabled(column) {
                        self.provider_cell(&entry.name, column, &mut row, sink);
                    }
                }
            }
            sink.close_row();
        } else {
            sink.open_item();
            let class = if self.host.pages.exists(&row.id) {
                "wikilink1"
            } else {
                "wikilink2"
            };
            if row.title.as_deref().map_or(true, str::is_empty) {
                row.title = Some(humanize_id(&row.id));
            }
            let text = row.title.clone().unwrap_or_default();
            let link = self.page_link(&row, class, text);
            sink.write_link(&link);
            sink.close_item();
        }

        self.row = Some(row);
        true
    }

    /// Closes the listing and returns the accumulated output, then resets
    /// the session. With zero rows added the partial shell is discarded
    /// and the result is empty.
    pub fn finish_list(&mut self, sink: &mut dyn OutputSink) -> String {
        trace!(rows = self.row.is_some(), "closing page list");
        if self.row.is_none() {
            sink.discard();
            self.reset();
            return String::new();
        }
        sink.close_container();
        self.reset();
        sink.take()
    }

    /// Acquires every provider that serves an enabled column. A provider
    /// that cannot be acquired takes all its columns down for the rest of
    /// the session.
    fn acquire_providers(&mut self) {
        for entry in self.registry.entries().to_vec() {
            if !entry.columns.iter().any(|c| self.columns.is_enabled(c)) {
                continue;
            }
            if self.acquired.contains_key(&entry.name) {
                continue;
            }
            match self.host.providers.acquire(&entry.name) {
                Some(provider) => {
                    self.acquired.insert(entry.name.clone(), provider);
                }
                None => {
                    debug!(provider = %entry.name, "provider unavailable, disabling its columns");
                    for column in &entry.columns {
                        self.columns.disable(column);
                    }
                }
            }
        }
    }

    fn render_header(&mut self, sink: &mut dyn OutputSink) {
        sink.open_header_row();
        // image column comes first
        if self.columns.is_enabled("image") {
            if let Some(provider) = self.image_provider() {
                let label = self.header_label("image", LabelSource::Provider(provider.as_str()));
                sink.header_cell("images", &label);
            }
        }
        for column in ORDERED_COLUMNS {
            if self.columns.is_enabled(column) {
                let label = self.header_label(column, LabelSource::Localized);
                sink.header_cell(column, &label);
            }
        }
        for entry in self.registry.entries().to_vec() {
            for column in &entry.columns {
                if column.as_str() != "image" && self.columns.is_enabled(column) {
                    let label = self.header_label(column, LabelSource::Provider(entry.name.as_str()));
                    sink.header_cell(column, &label);
                }
            }
        }
        sink.close_header_row();
    }

    fn image_provider(&self) -> Option<String> {
        self.registry.provider_for("image").map(str::to_string)
    }

    fn header_label(&mut self, column: &str, source: LabelSource<'_>) -> String {
        if let Some(label) = self.headers.get(column) {
            return label.clone();
        }
        let label = match source {
            LabelSource::Localized => self.host.lang.lang(column),
            LabelSource::Provider(name) => self
                .acquired
                .get(name)
                .map(|provider| provider.header_label(column))
                .unwrap_or_default(),
        };
        self.headers.insert(column.to_string(), label.clone());
        label
    }

    /// Metadata lookup for the current row, fetched at most once per row
    /// and only for existing pages.
    pub(crate) fn get_meta(&mut self, row: &PageRow, key: &str, subkey: Option<&str>) -> Option<Value> {
        if row.id.is_empty() || row.exists != Some(true) {
            return None;
        }
        if self.meta.is_none() {
            self.meta = Some(
                self.host
                    .meta
                    .metadata(&row.id)
                    .unwrap_or(Value::Null),
            );
        }
        meta_lookup(self.meta.as_ref()?, key, subkey).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryHost, MockMetadataSource, MockProviderSource};
    use crate::render::structured::recording::RecordingRenderer;
    use crate::render::{HtmlSink, StructuredSink};
    use serde_json::json;

    fn sample_site() -> MemoryHost {
        serde_json::from_value(json!({
            "pages": {
                "start": {"meta": {
                    "title": "Welcome",
                    "creator": "alice",
                    "user": "alice",
                    "contributor": {"alice": "Alice A", "bob": "Bob B"},
                    "date": {"created": 1700000000, "modified": 1700005000},
                    "description": {"abstract": "The landing page"}
                }},
                "blog:first_post": {"meta": {"title": "First Post", "type": "draft"}}
            },
            "providers": {
                "pageimage": {
                    "labels": {"image": "Image"},
                    "cells": {"start": {"image": "<img src=\"/i.png\" />"}}
                },
                "tag": {
                    "labels": {"tags": "Tags"},
                    "cells": {"start": {"tags": "<a href=\"/t\">demo</a>"}}
                }
            }
        }))
        .unwrap()
    }

    fn session_with_config(config: ListConfig) -> PageList {
        PageList::new(config, Host::from_single(Rc::new(sample_site())))
    }

    fn session() -> PageList {
        session_with_config(ListConfig::default())
    }

    fn render_one(mut list: PageList, row: PageRow) -> String {
        let mut sink = HtmlSink::new();
        list.start_list(None, &mut sink);
        list.add_page(row, &mut sink);
        list.finish_list(&mut sink)
    }

    #[test]
    fn test_flags_last_style_wins() {
        let mut list = session();
        assert!(list.set_flags(["table", "list", "simplelist", "default"]));
        assert_eq!(list.style(), Style::Default);
        assert!(list.set_flags(["default", "table"]));
        assert_eq!(list.style(), Style::Table);
    }

    #[test]
    fn test_flags_sort_group_is_exclusive() {
        let mut list = session();
        list.set_flags(["sort", "rsort"]);
        assert_eq!(list.sort_mode(), SortMode::Descending);
        list.set_flags(["rsort", "sort"]);
        assert_eq!(list.sort_mode(), SortMode::Ascending);
        list.set_flags(["sort", "nosort"]);
        assert_eq!(list.sort_mode(), SortMode::None);
    }

    #[test]
    fn test_flags_toggle_columns() {
        let mut list = session();
        list.set_flags(["desc", "nodate", "showdiff", "wibble"]);
        assert!(list.columns().is_enabled("desc"));
        assert!(!list.columns().is_enabled("date"));
        assert!(list.columns().is_enabled("diff"));
        // header toggles are not column names
        list.set_flags(["noheader", "nofirsthl"]);
        assert!(list.columns().is_enabled("desc"));
    }

    #[test]
    fn test_flag_enable_resets_detail_level() {
        let mut list = session_with_config(ListConfig {
            show_date: 2,
            ..ListConfig::default()
        });
        list.set_flags(["date"]);
        assert_eq!(list.columns().level("date"), 1);
    }

    #[test]
    fn test_add_column_round_trip() {
        let mut list = session();
        list.add_column("pageimage", "image");
        assert!(list.columns().is_enabled("image"));
        assert_eq!(list.providers().provider_for("image"), Some("pageimage"));

        list.add_column("pageimage", "image");
        let entry = list
            .providers()
            .entries()
            .iter()
            .find(|e| e.name == "pageimage")
            .unwrap();
        assert_eq!(entry.columns, ["image"]);
    }

    #[test]
    fn test_add_page_requires_id() {
        let mut list = session();
        let mut sink = HtmlSink::new();
        list.start_list(None, &mut sink);
        assert!(!list.add_page(PageRow::new(""), &mut sink));
        // the failed row does not count, so the shell is suppressed
        assert_eq!(list.finish_list(&mut sink), "");
    }

    #[test]
    fn test_zero_rows_produce_empty_output() {
        for flags in [vec!["table"], vec!["simplelist"]] {
            let mut list = session();
            list.set_flags(flags);
            let mut sink = HtmlSink::new();
            list.start_list(None, &mut sink);
            assert_eq!(list.finish_list(&mut sink), "");
        }
    }

    #[test]
    fn test_provider_failure_disables_columns() {
        // the sample site has no "discussion" provider
        let mut list = session_with_config(ListConfig {
            show_comments: true,
            ..ListConfig::default()
        });
        let mut sink = HtmlSink::new();
        list.start_list(None, &mut sink);
        assert!(!list.columns().is_enabled("comments"));

        // re-running acquisition in the same session does not bring it back
        list.start_list(None, &mut sink);
        assert!(!list.columns().is_enabled("comments"));
    }

    #[test]
    fn test_table_scenario_with_header() {
        let mut list = session_with_config(ListConfig {
            style: Style::Table,
            show_header: true,
            show_user: 0,
            ..ListConfig::default()
        });
        list.set_flags(["date"]);
        let mut row = PageRow::new("start");
        row.exists = Some(true);
        row.date = Some(1700000000);
        let out = render_one(list, row);

        assert!(out.starts_with("<div class=\"table\"><table class=\"inline\">"));
        assert!(out.contains("<tr><th class=\"page\">Page</th><th class=\"date\">Date</th></tr>"));
        assert!(out.contains("<td class=\"page\"><a href=\"/doku.php?id=start\" class=\"wikilink1\">Welcome</a></td>"));
        assert!(out.contains("<td class=\"date\">2023-11-14 22:13</td>"));
        // desc level 0 suppresses the column entirely
        assert!(!out.contains("class=\"desc\""));
        assert!(out.ends_with("</table></div>"));
    }

    #[test]
    fn test_simplelist_scenario_humanized_title() {
        let mut list = session();
        list.set_flags(["simplelist"]);
        let out = render_one(list, PageRow::new("foo_bar"));
        assert_eq!(
            out,
            "<ul><li><a href=\"/doku.php?id=foo_bar\" class=\"wikilink2\">foo bar</a></li></ul>"
        );
    }

    #[test]
    fn test_list_style_nests_page_link() {
        let mut list = session_with_config(ListConfig {
            show_date: 0,
            show_user: 0,
            ..ListConfig::default()
        });
        list.set_flags(["list"]);
        let mut row = PageRow::new("start");
        row.exists = Some(true);
        let out = render_one(list, row);
        assert!(out.starts_with("<div class=\"table\"><table class=\"ul\">"));
        assert!(out.contains(
            "<td class=\"page\"><ul><li><a href=\"/doku.php?id=start\" class=\"wikilink1\">Welcome</a></li></ul></td>"
        ));
    }

    #[test]
    fn test_simplelist_renders_no_other_columns() {
        let mut list = session_with_config(ListConfig {
            show_date: 1,
            show_user: 2,
            show_diff: true,
            ..ListConfig::default()
        });
        list.set_flags(["simplelist"]);
        let mut row = PageRow::new("start");
        row.exists = Some(true);
        let out = render_one(list, row);
        assert!(!out.contains("<td"));
        assert!(!out.contains("diff"));
    }

    #[test]
    fn test_caller_class_is_appended() {
        let mut list = session();
        let mut sink = HtmlSink::new();
        list.start_list(Some("blogposts"), &mut sink);
        list.add_page(PageRow::new("start"), &mut sink);
        let out = list.finish_list(&mut sink);
        assert!(out.starts_with("<div class=\"table\"><table class=\"pagelist blogposts\">"));
    }

    #[test]
    fn test_row_class_from_priority_and_draft() {
        let mut list = session();
        let mut row = PageRow::new("blog:first_post");
        row.exists = Some(true);
        row.priority = Some("high".to_string());
        let out = render_one(list, row);
        assert!(out.contains("<tr class=\"priorityhigh draft\">"));
    }

    #[test]
    fn test_user_levels() {
        // level 2: contributor names, escaped text
        let mut list = session_with_config(ListConfig {
            show_user: 2,
            ..ListConfig::default()
        });
        let mut row = PageRow::new("start");
        row.exists = Some(true);
        let out = render_one(list, row);
        assert!(out.contains("<td class=\"user\">Alice A, Bob B</td>"));

        // level 3: one rich link for the page's user
        list = session_with_config(ListConfig {
            show_user: 3,
            ..ListConfig::default()
        });
        let mut row = PageRow::new("start");
        row.exists = Some(true);
        let out = render_one(list, row);
        assert!(out.contains(
            "<td class=\"user\"><a href=\"/doku.php?id=user:alice\" class=\"wikiuser\">alice</a></td>"
        ));

        // level 4: rich links per contributor login
        list = session_with_config(ListConfig {
            show_user: 4,
            ..ListConfig::default()
        });
        let mut row = PageRow::new("start");
        row.exists = Some(true);
        let out = render_one(list, row);
        assert!(out.contains("class=\"wikiuser\">alice</a>, "));
        assert!(out.contains("class=\"wikiuser\">bob</a>"));
    }

    #[test]
    fn test_explicit_user_wins() {
        let mut list = session();
        let mut row = PageRow::new("start");
        row.exists = Some(true);
        row.user = Some("zed".to_string());
        let out = render_one(list, row);
        assert!(out.contains("<td class=\"user\">zed</td>"));

        // explicitly empty suppresses the metadata fallback
        list = session();
        let mut row = PageRow::new("start");
        row.exists = Some(true);
        row.user = Some(String::new());
        let out = render_one(list, row);
        assert!(out.contains("<td class=\"user\">&nbsp;</td>"));
    }

    #[test]
    fn test_desc_truncation_from_abstract() {
        let mut list = session_with_config(ListConfig {
            show_desc: 10,
            ..ListConfig::default()
        });
        let mut row = PageRow::new("start");
        row.exists = Some(true);
        let out = render_one(list, row);
        assert!(out.contains("<td class=\"desc\">The landin…</td>"));
    }

    #[test]
    fn test_date_level_two_uses_modification_date() {
        let mut list = session_with_config(ListConfig {
            show_date: 2,
            ..ListConfig::default()
        });
        let mut row = PageRow::new("start");
        row.exists = Some(true);
        row.date = Some(1600000000);
        let out = render_one(list, row);
        assert!(out.contains("<td class=\"date\">2023-11-14 23:36</td>"));
    }

    #[test]
    fn test_date_empty_for_missing_page() {
        let mut list = session();
        let mut row = PageRow::new("nowhere");
        row.date = Some(1700000000);
        let out = render_one(list, row);
        assert!(out.contains("<td class=\"date\">&nbsp;</td>"));
    }

    #[test]
    fn test_provider_columns_render_and_header() {
        let mut list = session_with_config(ListConfig {
            show_header: true,
            show_image: true,
            show_tags: true,
            show_user: 0,
            show_date: 0,
            ..ListConfig::default()
        });
        let mut row = PageRow::new("start");
        row.exists = Some(true);
        let out = render_one(list, row);
        assert!(out.contains("<th class=\"images\">Image</th>"));
        assert!(out.contains("<th class=\"tags\">Tags</th>"));
        assert!(out.contains("<td class=\"image\"><img src=\"/i.png\" /></td>"));
        assert!(out.contains("<td class=\"tags\"><a href=\"/t\">demo</a></td>"));
    }

    #[test]
    fn test_reset_after_finish() {
        let mut list = session();
        list.set_flags(["simplelist", "rsort", "desc"]);
        let mut sink = HtmlSink::new();
        list.start_list(None, &mut sink);
        list.add_page(PageRow::new("start"), &mut sink);
        list.finish_list(&mut sink);

        assert_eq!(list.style(), Style::Default);
        assert_eq!(list.sort_mode(), SortMode::None);
        assert!(!list.columns().is_enabled("desc"));
    }

    #[test]
    fn test_metadata_fetched_once_per_row() {
        let site = Rc::new(sample_site());
        let mut meta = MockMetadataSource::new();
        // title, creator and abstract all come from one fetch
        meta.expect_metadata().times(1).returning(|_| {
            Some(json!({
                "title": "Welcome",
                "creator": "alice",
                "description": {"abstract": "The landing page"}
            }))
        });
        let providers = MockProviderSource::new();
        let host = Host {
            lang: site.clone(),
            pages: site.clone(),
            meta: Rc::new(meta),
            links: site.clone(),
            providers: Rc::new(providers),
        };

        let mut list = PageList::new(
            ListConfig {
                show_user: 1,
                show_desc: 1,
                ..ListConfig::default()
            },
            host,
        );
        let mut row = PageRow::new("start");
        row.exists = Some(true);
        let mut sink = HtmlSink::new();
        list.start_list(None, &mut sink);
        list.add_page(row, &mut sink);
        let out = list.finish_list(&mut sink);
        assert!(out.contains("alice"));
        assert!(out.contains("The landing page"));
    }

    #[test]
    fn test_structured_output_sequence() {
        let mut renderer = RecordingRenderer::default();
        {
            let mut list = session_with_config(ListConfig {
                style: Style::Table,
                show_header: true,
                show_user: 0,
                show_date: 0,
                ..ListConfig::default()
            });
            let mut sink = StructuredSink::new(&mut renderer);
            list.start_list(None, &mut sink);
            let mut row = PageRow::new("start");
            row.exists = Some(true);
            list.add_page(row, &mut sink);
            assert_eq!(list.finish_list(&mut sink), "");
        }

        let calls = &renderer.calls;
        assert_eq!(calls[0], "p_close");
        assert_eq!(calls[1], "table_open(1,1)");
        assert!(calls.contains(&"table_header_open".to_string()));
        assert!(calls.contains(&"cdata(Page)".to_string()));
        assert!(calls
            .iter()
            .any(|c| c.starts_with("external_link(https://wiki.example.com/doku.php?id=start")));
        assert_eq!(calls.last().unwrap(), "table_close");
    }
}
