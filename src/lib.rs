//! # pagelist
//!
//! Renders a configurable listing of wiki pages as an HTML table, an HTML
//! list, a simplified link list, or through an external structured document
//! renderer (e.g. an ODT exporter).
//!
//! The core is a short-lived render session driven through a three-phase
//! protocol:
//!
//! ```text
//! start_list -> add_page (repeated) -> finish_list
//! ```
//!
//! Columns are selected by configuration and flag tokens; optional columns
//! can be contributed by peer components implementing [`host::ColumnProvider`].
//! All output goes through the [`render::OutputSink`] abstraction, with a
//! buffered HTML writer and a structured-renderer adapter as the two
//! implementations.
//!
//! ```no_run
//! use std::rc::Rc;
//! use pagelist::{Host, HtmlSink, ListConfig, MemoryHost, PageList, PageRow};
//!
//! let host = Host::from_single(Rc::new(MemoryHost::default()));
//! let mut list = PageList::new(ListConfig::default(), host);
//! list.set_flags(["table", "header", "date"]);
//!
//! let mut sink = HtmlSink::new();
//! list.start_list(None, &mut sink);
//! list.add_page(PageRow::new("wiki:start"), &mut sink);
//! let html = list.finish_list(&mut sink);
//! ```

pub mod config;
pub mod host;
pub mod input;
pub mod list;
pub mod render;

pub use config::*;
pub use host::*;
pub use input::*;
pub use list::*;
pub use render::*;
