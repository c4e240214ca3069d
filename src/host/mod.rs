pub mod memory;

pub use memory::*;

use std::rc::Rc;

use serde_json::Value;

#[cfg(test)]
use mockall::automock;

/// Localized label lookup. Implementations return the key itself when no
/// translation exists; lookups never fail.
#[cfg_attr(test, automock)]
pub trait Localizer {
    fn lang(&self, key: &str) -> String;
}

/// Page existence and backing storage. Host-side errors are swallowed and
/// read as "does not exist".
#[cfg_attr(test, automock)]
pub trait PageStore {
    fn exists(&self, id: &str) -> bool;
    fn backing_file(&self, id: &str) -> String;
}

/// Access to the host's metadata cache. Returns the full metadata tree for
/// a page, or `None` when nothing is cached.
#[cfg_attr(test, automock)]
pub trait MetadataSource {
    fn metadata(&self, id: &str) -> Option<Value>;
}

/// URL construction for pages, media, static resources and user pages.
pub trait LinkBuilder {
    /// URL of a wiki page, with optional query parameters. `absolute`
    /// requests a fully qualified URL.
    fn page_url(&self, id: &str, params: &[(&str, &str)], absolute: bool) -> String;
    /// URL of a media item (images referenced by id).
    fn media_url(&self, id: &str) -> String;
    /// URL of a static resource below the host's base path.
    fn resource_url(&self, path: &str) -> String;
    /// Rich HTML rendering of a user name (profile link or plain markup).
    fn user_link(&self, login: &str) -> String;
}

/// A component contributing extra columns: a header label and per-page cell
/// content for each column it serves.
#[cfg_attr(test, automock)]
pub trait ColumnProvider {
    fn header_label(&self, column: &str) -> String;
    /// HTML fragment for one cell. Empty string renders as an empty cell.
    fn cell_content(&self, id: &str, column: &str) -> String;
}

/// Acquires provider components by name. `None` means the provider is not
/// installed or disabled — a recoverable condition, not an error.
#[cfg_attr(test, automock)]
pub trait ProviderSource {
    fn acquire(&self, name: &str) -> Option<Rc<dyn ColumnProvider>>;
}

/// The bundle of collaborators a render session works against.
pub struct Host {
    pub lang: Rc<dyn Localizer>,
    pub pages: Rc<dyn PageStore>,
    pub meta: Rc<dyn MetadataSource>,
    pub links: Rc<dyn LinkBuilder>,
    pub providers: Rc<dyn ProviderSource>,
}

impl Host {
    /// Builds a `Host` from one object implementing every collaborator
    /// trait, sharing it behind `Rc`.
    pub fn from_single<T>(host: Rc<T>) -> Self
    where
        T: Localizer + PageStore + MetadataSource + LinkBuilder + ProviderSource + 'static,
    {
        Self {
            lang: host.clone(),
            pages: host.clone(),
            meta: host.clone(),
            links: host.clone(),
            providers: host,
        }
    }
}

/// Looks up `meta[key]` or `meta[key][subkey]` in a metadata tree.
pub fn meta_lookup<'a>(meta: &'a Value, key: &str, subkey: Option<&str>) -> Option<&'a Value> {
    let value = meta.get(key)?;
    match subkey {
        Some(sub) => value.get(sub),
        None => Some(value),
    }
}
