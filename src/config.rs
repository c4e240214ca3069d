use serde::{Deserialize, Deserializer};

/// Presentation style for a page listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// Table with the "pagelist" class.
    #[default]
    Default,
    /// Bordered table with the "inline" class.
    Table,
    /// Table with the "ul" class, page links wrapped in a nested list.
    List,
    /// Bare item list with page links only, no header.
    SimpleList,
}

impl Style {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "default" => Some(Self::Default),
            "table" => Some(Self::Table),
            "list" => Some(Self::List),
            "simplelist" => Some(Self::SimpleList),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for Style {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Unknown style strings fall back to the default table layout
        let s = String::deserialize(deserializer)?;
        Ok(Style::parse(&s).unwrap_or_default())
    }
}

/// Sort direction recorded for the caller. The renderer itself never sorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    None,
    Ascending,
    Descending,
}

/// Per-session configuration. Passed in explicitly at construction; the
/// session keeps a pristine copy so `reset` can restore it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    pub style: Style,
    /// Whether the header row is shown.
    pub show_header: bool,
    /// Whether the page column uses the page's first headline as title.
    pub show_firsthl: bool,
    pub sort: bool,
    pub rsort: bool,
    /// 0 = off, 1 = creation date, 2 = modification date.
    pub show_date: u32,
    /// 0 = off, 1 = creator, 2 = contributor names,
    /// 3 = creator as rich link, 4 = contributors as rich links.
    pub show_user: u32,
    /// 0 = off, 1 = unlimited, N > 1 = truncate at N characters.
    pub show_desc: u32,
    pub show_comments: bool,
    pub show_linkbacks: bool,
    pub show_tags: bool,
    pub show_image: bool,
    pub show_diff: bool,
    /// strftime-style format for the date cell.
    pub date_format: String,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            style: Style::Default,
            show_header: false,
            show_firsthl: true,
            sort: false,
            rsort: false,
            show_date: 1,
            show_user: 1,
            show_desc: 0,
            show_comments: false,
            show_linkbacks: false,
            show_tags: false,
            show_image: false,
            show_diff: false,
            date_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

impl ListConfig {
    pub fn sort_mode(&self) -> SortMode {
        if self.sort {
            SortMode::Ascending
        } else if self.rsort {
            SortMode::Descending
        } else {
            SortMode::None
        }
    }
}
