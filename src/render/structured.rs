use crate::render::sink::{OutputSink, PageLink, Shell};

/// Contract of an external structured document renderer (e.g. an ODT
/// exporter). Calls are issued in strict open/close pairs; content arrives
/// as character data or explicit links.
pub trait DocRenderer {
    fn p_open(&mut self);
    fn p_close(&mut self);
    fn table_open(&mut self, cols: usize, rows: usize);
    fn table_close(&mut self);
    fn table_header_open(&mut self);
    fn table_header_close(&mut self);
    fn table_row_open(&mut self);
    fn table_row_close(&mut self);
    fn table_cell_open(&mut self);
    fn table_cell_close(&mut self);
    fn list_open(&mut self);
    fn list_close(&mut self);
    fn list_item_open(&mut self, level: usize);
    fn list_item_close(&mut self);
    fn cdata(&mut self, text: &str);
    fn external_link(&mut self, url: &str, title: &str);
}

/// Adapter driving a `DocRenderer` through the sink interface. Produces no
/// output of its own; `take` returns the empty string.
pub struct StructuredSink<'a> {
    renderer: &'a mut dyn DocRenderer,
    in_table: bool,
}

impl<'a> StructuredSink<'a> {
    pub fn new(renderer: &'a mut dyn DocRenderer) -> Self {
        Self {
            renderer,
            in_table: false,
        }
    }
}

impl OutputSink for StructuredSink<'_> {
    fn open_container(&mut self, shell: &Shell) {
        match shell {
            Shell::Table { .. } => {
                // The renderer contract requires closing any open paragraph
                // before a table starts.
                self.renderer.p_close();
                self.renderer.table_open(1, 1);
                self.in_table = true;
            }
            Shell::List => {
                self.renderer.list_open();
                self.in_table = false;
            }
        }
    }

    fn close_container(&mut self) {
        if self.in_table {
            self.renderer.table_close();
        } else {
            self.renderer.list_close();
        }
    }

    fn open_header_row(&mut self) {
        if self.in_table {
            self.renderer.table_header_open();
        } else {
            self.renderer.list_item_open(0);
        }
    }

    fn close_header_row(&mut self) {
        if self.in_table {
            self.renderer.table_header_close();
        } else {
            self.renderer.list_item_close();
        }
    }

    fn header_cell(&mut self, _class: &str, label: &str) {
        self.renderer.cdata(label);
    }

    fn open_row(&mut self, _class: Option<&str>) {
        if self.in_table {
            self.renderer.table_row_open();
        } else {
            self.renderer.list_item_open(0);
        }
    }

    fn close_row(&mut self) {
        if self.in_table {
            self.renderer.table_row_close();
        } else {
            self.renderer.list_item_close();
        }
    }

    fn open_item(&mut self) {
        self.renderer.list_item_open(0);
    }

    fn close_item(&mut self) {
        self.renderer.list_item_close();
    }

    fn open_cell(&mut self, _class: &str) {
        if self.in_table {
            self.renderer.table_cell_open();
        } else {
            self.renderer.list_item_open(0);
        }
        self.renderer.p_open();
    }

    fn close_cell(&mut self) {
        self.renderer.p_close();
        if self.in_table {
            self.renderer.table_cell_close();
        } else {
            self.renderer.list_item_close();
        }
    }

    fn write_text(&mut self, text: &str) {
        self.renderer.cdata(text);
    }

    fn write_html(&mut self, fragment: &str) {
        // No raw markup channel in this format
        self.renderer.cdata(fragment);
    }

    fn write_link(&mut self, link: &PageLink) {
        self.renderer.external_link(&link.url_abs, &link.text);
    }

    fn write_nbsp(&mut self) {
        self.renderer.cdata("\u{a0}");
    }
}


#[cfg(test)]
mod tests {
    use super::recording::RecordingRenderer;
    use super::*;

    #[test]
    fn test_table_shell_closes_paragraph_first() {
        let mut renderer = RecordingRenderer::default();
        let mut sink = StructuredSink::new(&mut renderer);
        sink.open_container(&Shell::Table {
            class: "pagelist".to_string(),
        });
        sink.close_container();
        assert_eq!(
            renderer.calls,
            vec!["p_close", "table_open(1,1)", "table_close"]
        );
    }

    #[test]
    fn test_cell_wraps_content_in_paragraph() {
        let mut renderer = RecordingRenderer::default();
        let mut sink = StructuredSink::new(&mut renderer);
        sink.open_container(&Shell::Table {
            class: "x".to_string(),
        });
        sink.open_row(None);
        sink.open_cell("date");
        sink.write_text("2023-11-14");
        sink.close_cell();
        sink.close_row();
        assert_eq!(
            renderer.calls[2..],
            [
                "table_row_open",
                "table_cell_open",
                "p_open",
                "cdata(2023-11-14)",
                "p_close",
                "table_cell_close",
                "table_row_close"
            ]
            .map(String::from)
        );
    }

    #[test]
    fn test_list_shell_uses_list_items() {
        let mut renderer = RecordingRenderer::default();
        let mut sink = StructuredSink::new(&mut renderer);
        sink.open_container(&Shell::List);
        sink.open_item();
        sink.write_link(&PageLink::new(
            "/p".to_string(),
            "https://w/p".to_string(),
            "p".to_string(),
            "wikilink1",
        ));
        sink.close_item();
        sink.close_container();
        assert_eq!(
            renderer.calls,
            vec![
                "list_open",
                "list_item_open(0)",
                "external_link(https://w/p,p)",
                "list_item_close",
                "list_close"
            ]
        );
    }

    #[test]
    fn test_take_is_empty() {
        let mut renderer = RecordingRenderer::default();
        let mut sink = StructuredSink::new(&mut renderer);
        sink.write_text("content");
        assert_eq!(sink.take(), "");
    }
}
