use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

use crate::layout::{
    BODY_FONT_SIZE, Line, LineStyle, PAGE_HEIGHT, PAGE_WIDTH, Page,
    TITLE_FONT_SIZE,
};

const TITLE_FONT: &str = "F1";
const BODY_FONT: &str = "F2";

/// The error type for report serialization.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The PDF object tree could not be built.
    #[error("failed to build PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    /// The PDF could not be written out.
    #[error("failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
}

pub(crate) fn render(
    title: &str,
    pages: &[Page],
) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let title_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let body_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            TITLE_FONT => title_font_id,
            BODY_FONT => body_font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let operations: Vec<Operation> =
            page.lines.iter().flat_map(line_operations).collect();
        let content = Content { operations };
        let content_id =
            doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                0.into(),
                0.into(),
                PAGE_WIDTH.into(),
                PAGE_HEIGHT.into(),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_text(title)),
        "Producer" => Object::string_literal("neuro-chat"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

fn line_operations(line: &Line) -> Vec<Operation> {
    // Blank lines only take vertical space.
    if line.text.trim_end().is_empty() {
        return vec![];
    }
    let (font, size) = match line.style {
        LineStyle::Title => (TITLE_FONT, TITLE_FONT_SIZE),
        LineStyle::Body => (BODY_FONT, BODY_FONT_SIZE),
    };
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), size.into()]),
        Operation::new("Td", vec![line.x.into(), line.y.into()]),
        Operation::new(
            "Tj",
            vec![Object::String(
                encode_text(&line.text),
                StringFormat::Literal,
            )],
        ),
        Operation::new("ET", vec![]),
    ]
}

/// Encodes folded text as single-byte WinAnsi codes.
///
/// Layout already limits text to Latin-1, whose printable range maps to the
/// same WinAnsi codes.
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_line(y: f32, text: &str) -> Line {
        Line {
            style: LineStyle::Body,
            x: 72.0,
            y,
            text: text.to_owned(),
        }
    }

    #[test]
    fn test_page_content() {
        let pages = vec![
            Page {
                lines: vec![
                    Line {
                        style: LineStyle::Title,
                        x: 72.0,
                        y: 702.0,
                        text: "Analysis Report".to_owned(),
                    },
                    body_line(686.0, "Key themes:"),
                    body_line(674.0, ""),
                    body_line(662.0, "  - exam stress"),
                ],
            },
            Page {
                lines: vec![body_line(720.0, "Suggestions")],
            },
        ];
        let bytes = render("Analysis Report", &pages).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_ids: Vec<_> = doc.get_pages().into_values().collect();
        assert_eq!(page_ids.len(), 2);

        let shown_text = |page_id| -> Vec<Vec<u8>> {
            let bytes = doc.get_page_content(page_id).unwrap();
            let content: Content = Content::decode(&bytes).unwrap();
            content
                .operations
                .into_iter()
                .filter(|op| op.operator == "Tj")
                .map(|op| match &op.operands[0] {
                    Object::String(text, _) => text.clone(),
                    other => panic!("unexpected operand: {other:?}"),
                })
                .collect()
        };
        assert_eq!(
            shown_text(page_ids[0]),
            vec![
                b"Analysis Report".to_vec(),
                b"Key themes:".to_vec(),
                b"  - exam stress".to_vec(),
            ]
        );
        assert_eq!(shown_text(page_ids[1]), vec![b"Suggestions".to_vec()]);
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text("caf\u{e9}"), b"caf\xE9".to_vec());
        assert_eq!(encode_text("\u{1F600}"), b"?".to_vec());
    }

    #[test]
    fn test_blank_lines_emit_nothing() {
        let line = body_line(700.0, "   ");
        assert!(line_operations(&line).is_empty());

        let line = Line {
            text: "  indented".to_owned(),
            ..line
        };
        let ops = line_operations(&line);
        assert_eq!(ops.len(), 5);
        assert_eq!(ops[3].operator, "Tj");
    }
}
