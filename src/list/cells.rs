use serde_json::Value;

use crate::config::Style;
use crate::list::row::{humanize_id, PageRow};
use crate::list::session::PageList;
use crate::render::{OutputSink, PageImage, PageLink};

/// Content of one data cell. Text is escaped by the sink; Html passes
/// through as a prebuilt fragment.
pub(crate) enum CellContent<'a> {
    Text(&'a str),
    Html(&'a str),
    Link(&'a PageLink),
}

/// Common cell funnel: opens the cell, writes the content or a
/// non-breaking-space placeholder, closes the cell. Returns whether the
/// cell had content.
pub(crate) fn emit_cell(sink: &mut dyn OutputSink, class: &str, content: CellContent<'_>) -> bool {
    sink.open_cell(class);
    let non_empty = match content {
        CellContent::Text(text) if !text.is_empty() => {
            sink.write_text(text);
            true
        }
        CellContent::Html(fragment) if !fragment.is_empty() => {
            sink.write_html(fragment);
            true
        }
        CellContent::Link(link) => {
            sink.write_link(link);
            true
        }
        _ => {
            sink.write_nbsp();
            false
        }
    };
    sink.close_cell();
    non_empty
}

impl PageList {
    /// Resolves page existence once per row: fills in the backing file,
    /// then asks the store. Later cells reuse the answer.
    pub(crate) fn ensure_exists(&self, row: &mut PageRow) {
        if row.exists.is_none() {
            if row.file.is_none() {
                row.file = Some(self.host.pages.backing_file(&row.id));
            }
            row.exists = Some(self.host.pages.exists(&row.id));
        }
    }

    /// Builds the link for a page row, honoring the section anchor.
    pub(crate) fn page_link(&self, row: &PageRow, class: &str, text: String) -> PageLink {
        let anchor = row
            .section
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| format!("#{}", s))
            .unwrap_or_default();
        let url = format!("{}{}", self.host.links.page_url(&row.id, &[], false), anchor);
        let url_abs = format!("{}{}", self.host.links.page_url(&row.id, &[], true), anchor);
        PageLink::new(url, url_abs, text, class)
    }

    /// Page title / link to the page.
    pub(crate) fn page_cell(&mut self, row: &mut PageRow, sink: &mut dyn OutputSink) -> bool {
        self.ensure_exists(row);
        let class = if row.exists == Some(true) {
            "wikilink1"
        } else {
            "wikilink2"
        };

        let mut image = None;
        match row.titleimage.as_deref().filter(|m| !m.is_empty()) {
            Some(media) => {
                let title = row.title.clone().filter(|t| !t.is_empty());
                image = Some(PageImage {
                    src: self.host.links.media_url(media),
                    class: Some("media".to_string()),
                    size: None,
                    alt: title.clone(),
                    title,
                });
            }
            None => {
                row.title = if self.show_firsthl {
                    self.get_meta(row, "title", None)
                        .and_then(|v| v.as_str().map(str::to_string))
                } else {
                    Some(row.id.clone())
                };
                if row.title.as_deref().map_or(true, str::is_empty) {
                    row.title = Some(humanize_id(&row.id));
                }
            }
        }

        let text = row
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| row.id.clone());
        let mut link = self.page_link(row, class, text);
        link.image = image;
        link.nested = self.style == Style::List;
        emit_cell(sink, "page", CellContent::Link(&link))
    }

    /// Date cell: creation or modification date unless given explicitly.
    pub(crate) fn date_cell(&mut self, row: &mut PageRow, sink: &mut dyn OutputSink) -> bool {
        if self.columns.level("date") == 2 {
            row.date = self
                .get_meta(row, "date", Some("modified"))
                .and_then(|v| v.as_i64());
        } else if row.date.is_none() && row.exists == Some(true) {
            row.date = self
                .get_meta(row, "date", Some("created"))
                .and_then(|v| v.as_i64());
        }

        // A zero timestamp counts as unset
        let formatted = match (row.date.filter(|&ts| ts != 0), row.exists) {
            (Some(ts), Some(true)) => format_timestamp(ts, &self.date_format),
            _ => None,
        };
        emit_cell(
            sink,
            "date",
            CellContent::Text(formatted.as_deref().unwrap_or_default()),
        )
    }

    /// User cell: creator or contributors per the configured detail level,
    /// unless given explicitly. Levels 3 and 4 render rich user links.
    pub(crate) fn user_cell(&mut self, row: &mut PageRow, sink: &mut dyn OutputSink) -> bool {
        if row.user.is_none() {
            let content = match self.columns.level("user") {
                1 => self
                    .get_meta(row, "creator", None)
                    .and_then(|v| v.as_str().map(|s| crate::render::escape_html(s))),
                2 => self.get_meta(row, "contributor", None).and_then(|users| {
                    users.as_object().map(|map| {
                        let names: Vec<&str> =
                            map.values().filter_map(Value::as_str).collect();
                        crate::render::escape_html(&names.join(", "))
                    })
                }),
                3 => self
                    .get_meta(row, "user", None)
                    .and_then(|v| v.as_str().map(|login| self.host.links.user_link(login))),
                4 => self.get_meta(row, "contributor", None).and_then(|users| {
                    users.as_object().map(|map| {
                        map.keys()
                            .map(|login| self.host.links.user_link(login))
                            .collect::<Vec<_>>()
                            .join(", ")
                    })
                }),
                _ => None,
            };
            row.user = Some(content.unwrap_or_default());
        }
        emit_cell(
            sink,
            "user",
            CellContent::Html(row.user.as_deref().unwrap_or_default()),
        )
    }

    /// Description cell: explicit value, listing-syntax description, the
    /// description plugin's metadata, or the auto abstract — truncated to
    /// the configured maximum.
    pub(crate) fn desc_cell(&mut self, row: &mut PageRow, sink: &mut dyn OutputSink) -> bool {
        let desc = match (&row.desc, &row.description) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(given)) if !given.is_empty() => given.clone(),
            _ => self
                .get_meta(row, "plugin_description", Some("keywords"))
                .and_then(|v| v.as_str().map(str::to_string))
                .filter(|s| !s.is_empty())
                .or_else(|| {
                    self.get_meta(row, "description", Some("abstract"))
                        .and_then(|v| v.as_str().map(str::to_string))
                })
                .unwrap_or_default(),
        };

        let desc = truncate_desc(&desc, self.columns.level("desc"));
        emit_cell(sink, "desc", CellContent::Text(&desc))
    }

    /// Diff cell: icon link to the page's diff view, whether or not the
    /// page exists.
    pub(crate) fn diff_cell(&mut self, row: &mut PageRow, sink: &mut dyn OutputSink) -> bool {
        self.ensure_exists(row);

        let anchor = row
            .section
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| format!("#{}", s))
            .unwrap_or_default();
        let params = [("do", "diff")];
        let url = format!(
            "{}{}",
            self.host.links.page_url(&row.id, &params, false),
            anchor
        );
        let url_abs = format!(
            "{}{}",
            self.host.links.page_url(&row.id, &params, true),
            anchor
        );
        let title = self.host.lang.lang("diff_title");
        let alt = self.host.lang.lang("diff_alt");
        let mut link = PageLink::new(url, url_abs, title.clone(), "diff_link");
        link.image = Some(PageImage {
            src: self.host.links.resource_url("lib/images/diff.png"),
            class: None,
            size: Some((15, 11)),
            title: Some(title),
            alt: Some(alt),
        });
        emit_cell(sink, "diff", CellContent::Link(&link))
    }

    /// Provider-served cell, memoized into the row under the column key.
    pub(crate) fn provider_cell(
        &mut self,
        provider: &str,
        column: &str,
        row: &mut PageRow,
        sink: &mut dyn OutputSink,
    ) -> bool {
        if row.extra_str(column).is_none() {
            let content = self
                .acquired
                .get(provider)
                .map(|p| p.cell_content(&row.id, column))
                .unwrap_or_default();
            row.extra.insert(column.to_string(), Value::String(content));
        }
        let content = row.extra_str(column).unwrap_or_default().to_string();
        emit_cell(sink, column, CellContent::Html(&content))
    }
}

/// Character-aware truncation with an ellipsis marker. A maximum of 0 or 1
/// means no truncation.
fn truncate_desc(desc: &str, max: u32) -> String {
    let max = max as usize;
    if max > 1 && desc.chars().count() > max {
        let truncated: String = desc.chars().take(max).collect();
        format!("{}…", truncated)
    } else {
        desc.to_string()
    }
}

fn format_timestamp(ts: i64, format: &str) -> Option<String> {
    use chrono::TimeZone;
    chrono::Utc
        .timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.format(format).to_string())
}
