/// Structural wrapper around a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shell {
    /// Table with a CSS class ("pagelist", "inline" or "ul", plus any
    /// caller-supplied class).
    Table { class: String },
    /// Bare item list (simplelist style).
    List,
}

/// An image rendered inside a link: a page's title image or the diff icon.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub src: String,
    pub class: Option<String>,
    pub size: Option<(u32, u32)>,
    pub title: Option<String>,
    pub alt: Option<String>,
}

/// A link to a page view. Carries both the internal and the absolute URL so
/// each sink can pick the form its output format needs.
#[derive(Debug, Clone)]
pub struct PageLink {
    pub url: String,
    pub url_abs: String,
    /// Visible link text, unescaped.
    pub text: String,
    /// Link class: "wikilink1"/"wikilink2" by existence, "diff_link" for
    /// diff cells.
    pub class: String,
    /// Renders instead of the text when present.
    pub image: Option<PageImage>,
    /// List style wraps the page link in a one-item nested list.
    pub nested: bool,
}

impl PageLink {
    pub fn new(url: String, url_abs: String, text: String, class: &str) -> Self {
        Self {
            url,
            url_abs,
            text,
            class: class.to_string(),
            image: None,
            nested: false,
        }
    }
}

/// Output target for one render session. The state machine and the cell
/// formatters only ever talk to this interface; whether markup is buffered
/// or a structured renderer is driven is decided by the implementation.
///
/// Calls come in strict open/close pairs mirroring the document structure:
/// container > header row / rows / items > cells > content.
pub trait OutputSink {
    fn open_container(&mut self, shell: &Shell);
    fn close_container(&mut self);

    fn open_header_row(&mut self);
    fn close_header_row(&mut self);
    /// One header cell, opened, labeled and closed in a single call. The
    /// label arrives unescaped.
    fn header_cell(&mut self, class: &str, label: &str);

    fn open_row(&mut self, class: Option<&str>);
    fn close_row(&mut self);

    /// Simplelist entries.
    fn open_item(&mut self);
    fn close_item(&mut self);

    fn open_cell(&mut self, class: &str);
    fn close_cell(&mut self);

    /// Writes text content, escaped as the output format requires.
    fn write_text(&mut self, text: &str);
    /// Writes a prebuilt HTML fragment. Formats without raw markup degrade
    /// this to character data.
    fn write_html(&mut self, fragment: &str);
    fn write_link(&mut self, link: &PageLink);
    /// Placeholder content for an empty cell.
    fn write_nbsp(&mut self);

    /// Returns the accumulated output. Sinks writing through a side channel
    /// have nothing to return.
    fn take(&mut self) -> String {
        String::new()
    }

    /// Drops buffered output; used to suppress an empty shell when no rows
    /// were added.
    fn discard(&mut self) {}
}
