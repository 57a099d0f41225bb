use crate::Report;

/// US Letter width in points.
pub(crate) const PAGE_WIDTH: f32 = 612.0;
/// US Letter height in points.
pub(crate) const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;

pub(crate) const TITLE_FONT_SIZE: f32 = 18.0;
const TITLE_LEADING: f32 = 22.0;
const TITLE_SPACE_AFTER: f32 = 12.0;

pub(crate) const BODY_FONT_SIZE: f32 = 10.0;
const BODY_LEADING: f32 = 12.0;
// Courier glyphs are 600 units wide.
const BODY_CHAR_WIDTH: f32 = BODY_FONT_SIZE * 0.6;
const TAB_WIDTH: usize = 4;

/// Number of body characters that fit between the margins.
pub(crate) const BODY_COLUMNS: usize =
    ((PAGE_WIDTH - 2.0 * MARGIN) / BODY_CHAR_WIDTH) as usize;

/// Which text style a line is set in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LineStyle {
    /// The document title.
    Title,
    /// Preformatted body text.
    Body,
}

/// A line of text placed on a page.
///
/// Coordinates are in points, from the bottom-left corner of the page,
/// and point at the baseline of the first glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    /// The style of the line.
    pub style: LineStyle,
    /// Horizontal position.
    pub x: f32,
    /// Vertical position of the baseline.
    pub y: f32,
    /// The text, limited to characters the standard fonts can show.
    pub text: String,
}

/// A page of laid out lines.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    /// Lines from top to bottom.
    pub lines: Vec<Line>,
}

/// Lays out a report on as many pages as its body needs.
///
/// The title is placed at the top of the first page. Body whitespace is
/// kept as is, and lines wider than the page are wrapped.
pub fn layout(report: &Report) -> Vec<Page> {
    let top = PAGE_HEIGHT - MARGIN;
    let mut pages = vec![];
    let mut page = Page::default();

    page.lines.push(Line {
        style: LineStyle::Title,
        x: MARGIN,
        y: top - TITLE_FONT_SIZE,
        text: fold_text(report.title()),
    });
    let mut cursor = top - TITLE_LEADING - TITLE_SPACE_AFTER;

    for text in wrap_preformatted(&fold_text(report.body()), BODY_COLUMNS) {
        if cursor - BODY_LEADING < MARGIN {
            pages.push(std::mem::take(&mut page));
            cursor = top;
        }
        cursor -= BODY_LEADING;
        page.lines.push(Line {
            style: LineStyle::Body,
            x: MARGIN,
            y: cursor,
            text,
        });
    }

    pages.push(page);
    pages
}

/// Replaces characters the standard PDF fonts cannot show.
///
/// Typographic punctuation is folded to ASCII, tabs are expanded, and
/// anything else outside Latin-1 becomes `?`.
pub(crate) fn fold_text(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    let mut column = 0;
    for ch in text.chars() {
        let start = folded.len();
        match ch {
            '\n' => {
                folded.push('\n');
                column = 0;
                continue;
            }
            '\t' => {
                let width = TAB_WIDTH - column % TAB_WIDTH;
                folded.extend(std::iter::repeat_n(' ', width));
            }
            '\r' => continue,
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => {
                folded.push('\'')
            }
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => {
                folded.push('"')
            }
            '\u{2010}'..='\u{2015}' | '\u{2212}' => folded.push('-'),
            '\u{2026}' => folded.push_str("..."),
            '\u{2022}' | '\u{25CF}' => folded.push('*'),
            '\u{00A0}' | '\u{2002}'..='\u{200A}' => folded.push(' '),
            '\u{200B}'..='\u{200D}' | '\u{FEFF}' => continue,
            ch if ch.is_control() => folded.push(' '),
            ch if (ch as u32) < 0x100 => folded.push(ch),
            _ => folded.push('?'),
        }
        column += folded[start..].chars().count();
    }
    folded
}

/// Splits `text` into lines of at most `columns` characters.
///
/// Existing line breaks and all other whitespace are kept. Long lines
/// break after the last space that fits, or mid-word when there is none,
/// so the pieces of a line concatenate back to the original.
fn wrap_preformatted(text: &str, columns: usize) -> Vec<String> {
    let mut lines = vec![];
    for line in text.split('\n') {
        let mut rest: Vec<char> = line.chars().collect();
        while rest.len() > columns {
            let split = rest[..columns]
                .iter()
                .rposition(|ch| *ch == ' ')
                .map_or(columns, |idx| idx + 1);
            lines.push(rest.drain(..split).collect());
        }
        lines.push(rest.into_iter().collect());
    }
    lines
}
