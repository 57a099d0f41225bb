//! Analysis report documents.
//!
//! A [`Report`] is a title and a preformatted body. It is laid out on US
//! Letter pages by [`layout`] and serialized to PDF by
//! [`Report::render`].

#![deny(missing_docs)]

#[macro_use]
extern crate tracing;

mod layout;
mod pdf;

pub use layout::{Line, LineStyle, Page, layout};
pub use pdf::ExportError;

/// Title of every analysis report.
pub const REPORT_TITLE: &str = "Analysis Report";

/// File name the rendered report is offered under.
pub const REPORT_FILENAME: &str = "analysis_report.pdf";

/// MIME type of the rendered report.
pub const REPORT_MIME: &str = "application/pdf";

/// A report ready to be rendered.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Report {
    title: String,
    body: String,
}

impl Report {
    /// Creates a report with the given title and body.
    #[inline]
    pub fn new<T: Into<String>, B: Into<String>>(title: T, body: B) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    /// Creates an analysis report with `body` as its content.
    #[inline]
    pub fn analysis<B: Into<String>>(body: B) -> Self {
        Self::new(REPORT_TITLE, body)
    }

    /// Returns the title.
    #[inline]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the body text.
    #[inline]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Lays out and serializes the report.
    pub fn render(&self) -> Result<ReportDocument, ExportError> {
        let pages = layout(self);
        let bytes = pdf::render(&layout::fold_text(&self.title), &pages)?;
        debug!(
            "rendered report: {} pages, {} bytes",
            pages.len(),
            bytes.len()
        );
        Ok(ReportDocument {
            bytes,
            filename: REPORT_FILENAME.to_owned(),
            mime: REPORT_MIME,
        })
    }
}

/// A serialized report, ready to be downloaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportDocument {
    bytes: Vec<u8>,
    filename: String,
    mime: &'static str,
}

impl ReportDocument {
    /// Returns the PDF bytes.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the file name to save the document under.
    #[inline]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Returns the MIME type of the document.
    #[inline]
    pub fn mime(&self) -> &'static str {
        self.mime
    }
}

#[cfg(test)]
mod tests {
    use lopdf::{Document, Object};

    use super::*;

    #[test]
    fn test_render() {
        let report = Report::analysis(
            "Key themes:\n  - exam anxiety\n  - time management",
        );
        let document = report.render().unwrap();
        assert_eq!(document.filename(), "analysis_report.pdf");
        assert_eq!(document.mime(), "application/pdf");
        assert!(document.bytes().starts_with(b"%PDF-"));

        let pdf = Document::load_mem(document.bytes()).unwrap();
        assert_eq!(pdf.get_pages().len(), 1);

        let info_id = pdf.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = pdf.get_dictionary(info_id).unwrap();
        let Object::String(title, _) = info.get(b"Title").unwrap() else {
            panic!("title is not a string");
        };
        assert_eq!(title.as_slice(), b"Analysis Report".as_slice());
    }

    #[test]
    fn test_render_multiple_pages() {
        let body = (1..=120)
            .map(|i| format!("line {i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let report = Report::analysis(body);
        let expected_pages = layout(&report).len();
        assert!(expected_pages >= 3);

        let document = report.render().unwrap();
        let pdf = Document::load_mem(document.bytes()).unwrap();
        assert_eq!(pdf.get_pages().len(), expected_pages);
    }

    #[test]
    fn test_same_structure_for_same_body() {
        let report = Report::analysis("The user is motivated.\n\nKeep going.");
        let first = report.render().unwrap();
        let second = report.render().unwrap();
        assert_eq!(layout(&report), layout(&report.clone()));
        assert_eq!(first.filename(), second.filename());

        let first = Document::load_mem(first.bytes()).unwrap();
        let second = Document::load_mem(second.bytes()).unwrap();
        assert_eq!(first.get_pages().len(), second.get_pages().len());
    }
}
