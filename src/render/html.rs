use crate::render::sink::{OutputSink, PageLink, Shell};

/// Replaces the characters that break out of HTML context.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Buffered markup writer: accumulates the listing as an HTML string.
#[derive(Debug, Default)]
pub struct HtmlSink {
    doc: String,
    shell: Option<Shell>,
}

impl HtmlSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputSink for HtmlSink {
    fn open_container(&mut self, shell: &Shell) {
        match shell {
            Shell::Table { class } => {
                self.doc
                    .push_str(&format!("<div class=\"table\"><table class=\"{}\">", class));
            }
            Shell::List => self.doc.push_str("<ul>"),
        }
        self.shell = Some(shell.clone());
    }

    fn close_container(&mut self) {
        match self.shell.take() {
            Some(Shell::Table { .. }) => self.doc.push_str("</table></div>"),
            Some(Shell::List) => self.doc.push_str("</ul>"),
            None => {}
        }
    }

    fn open_header_row(&mut self) {
        self.doc.push_str("<tr>");
    }

    fn close_header_row(&mut self) {
        self.doc.push_str("</tr>");
    }

    fn header_cell(&mut self, class: &str, label: &str) {
        self.doc.push_str(&format!(
            "<th class=\"{}\">{}</th>",
            class,
            escape_html(label)
        ));
    }

    fn open_row(&mut self, class: Option<&str>) {
        match class {
            Some(class) => self.doc.push_str(&format!("<tr class=\"{}\">", class)),
            None => self.doc.push_str("<tr>"),
        }
    }

    fn close_row(&mut self) {
        self.doc.push_str("</tr>");
    }

    fn open_item(&mut self) {
        self.doc.push_str("<li>");
    }

    fn close_item(&mut self) {
        self.doc.push_str("</li>");
    }

    fn open_cell(&mut self, class: &str) {
        self.doc.push_str(&format!("<td class=\"{}\">", class));
    }

    fn close_cell(&mut self) {
        self.doc.push_str("</td>");
    }

    fn write_text(&mut self, text: &str) {
        self.doc.push_str(&escape_html(text));
    }

    fn write_html(&mut self, fragment: &str) {
        self.doc.push_str(fragment);
    }

    fn write_link(&mut self, link: &PageLink) {
        if link.nested {
            self.doc.push_str("<ul><li>");
        }
        self.doc
            .push_str(&format!("<a href=\"{}\" class=\"{}\">", link.url, link.class));
        match &link.image {
            Some(image) => {
                self.doc.push_str(&format!("<img src=\"{}\"", image.src));
                if let Some(class) = &image.class {
                    self.doc.push_str(&format!(" class=\"{}\"", class));
                }
                if let Some((width, height)) = image.size {
                    self.doc
                        .push_str(&format!(" width=\"{}\" height=\"{}\"", width, height));
                }
                if let Some(title) = &image.title {
                    self.doc
                        .push_str(&format!(" title=\"{}\"", escape_html(title)));
                }
                if let Some(alt) = &image.alt {
                    self.doc.push_str(&format!(" alt=\"{}\"", escape_html(alt)));
                }
                self.doc.push_str(" />");
            }
            None => self.doc.push_str(&escape_html(&link.text)),
        }
        self.doc.push_str("</a>");
        if link.nested {
            self.doc.push_str("</li></ul>");
        }
    }

    fn write_nbsp(&mut self) {
        self.doc.push_str("&nbsp;");
    }

    fn take(&mut self) -> String {
        self.shell = None;
        std::mem::take(&mut self.doc)
    }

    fn discard(&mut self) {
        self.doc.clear();
        self.shell = None;
    }
}
