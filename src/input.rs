use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::config::ListConfig;
use crate::host::{Host, MemoryHost};
use crate::list::{PageList, PageRow};
use crate::render::HtmlSink;

/// A complete listing description as consumed by the demo binary: the
/// session configuration, flag overrides, the rows to list, and the site
/// the in-memory host answers from.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListingInput {
    pub config: ListConfig,
    pub flags: Vec<String>,
    pub caller_class: Option<String>,
    pub pages: Vec<PageRow>,
    pub site: MemoryHost,
}

/// Reads and parses a listing description from disk.
pub fn load_input(path: &Path) -> Result<ListingInput> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let input = serde_json::from_str(&text)
        .with_context(|| format!("invalid listing description in {}", path.display()))?;
    Ok(input)
}

/// Runs the full render cycle over a listing description and returns the
/// HTML output.
pub fn render_listing(input: ListingInput) -> String {
    let host = Host::from_single(Rc::new(input.site));
    let mut list = PageList::new(input.config, host);
    list.set_flags(&input.flags);

    let mut sink = HtmlSink::new();
    list.start_list(input.caller_class.as_deref(), &mut sink);
    for row in input.pages {
        list.add_page(row, &mut sink);
    }
    list.finish_list(&mut sink)
}
