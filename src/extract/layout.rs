//! Layout-aware extraction over the lopdf content stream.
//!
//! Text-showing operators are walked with a tracked text matrix so that each
//! span knows its baseline and effective font size. Spans are grouped into
//! lines by baseline, and unusually large vertical jumps between lines are
//! emitted as paragraph gaps.

use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::model::{Page, TextRun};

use super::TextExtractor;

/// Font size assumed before the first `Tf`.
const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Average glyph advance as a share of the font size, for width estimates.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Baselines closer than this share of the font size belong to one line.
const SAME_LINE_TOLERANCE: f32 = 0.3;

/// Horizontal gaps wider than this share of the font size separate words.
const WORD_GAP: f32 = 0.15;

/// `TJ` adjustments beyond this many thousandths of an em count as spaces.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Line spacing above this multiple of the typical spacing starts a paragraph.
const PARAGRAPH_GAP_RATIO: f32 = 1.5;

/// Extractor that keeps line-level font sizes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutExtractor;

impl LayoutExtractor {
    /// Create a new layout extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract all pages of an already loaded document.
    ///
    /// A page whose content cannot be read comes back empty rather than
    /// failing the document.
    pub fn extract_document(&self, doc: &LopdfDocument) -> Vec<Page> {
        doc.get_pages()
            .values()
            .enumerate()
            .map(|(index, page_id)| match page_runs(doc, *page_id) {
                Ok(runs) => Page::from_runs(index, runs),
                Err(e) => {
                    log::debug!("page {}: {}", index, e);
                    Page::from_text(index, "")
                }
            })
            .collect()
    }
}

impl TextExtractor for LayoutExtractor {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn extract(&self, data: &[u8]) -> Result<Vec<Page>> {
        let doc = LopdfDocument::load_mem(data)?;
        Ok(self.extract_document(&doc))
    }
}

/// A piece of text shown by one operator.
#[derive(Debug, Clone, PartialEq)]
struct TextSpan {
    text: String,
    x: f32,
    y: f32,
    width: f32,
    font_size: f32,
}

impl TextSpan {
    fn new(text: String, x: f32, y: f32, font_size: f32) -> Self {
        let width = text.chars().count() as f32 * font_size * AVG_GLYPH_WIDTH;
        Self {
            text,
            x,
            y,
            width,
            font_size,
        }
    }
}

/// Spans sharing a baseline, in content-stream order.
#[derive(Debug, Clone)]
struct TextLine {
    spans: Vec<TextSpan>,
    y: f32,
    font_size: f32,
}

impl TextLine {
    fn from_spans(spans: Vec<TextSpan>) -> Self {
        let total_chars: usize = spans.iter().map(|s| s.text.chars().count()).sum();
        let weighted: f32 = spans
            .iter()
            .map(|s| s.font_size * s.text.chars().count() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted / total_chars as f32
        } else {
            spans.first().map_or(DEFAULT_FONT_SIZE, |s| s.font_size)
        };
        let y = spans.first().map_or(0.0, |s| s.y);

        Self {
            spans,
            y,
            font_size,
        }
    }

    /// Joined text, with a space wherever the horizontal gap looks like a word break.
    fn text(&self) -> String {
        let mut result = String::new();

        for (i, span) in self.spans.iter().enumerate() {
            if i > 0 {
                let prev = &self.spans[i - 1];
                let gap = span.x - (prev.x + prev.width);
                let spaceless = prev.text.chars().last().is_some_and(is_spaceless_script_char)
                    && span.text.chars().next().is_some_and(is_spaceless_script_char);
                let has_space = result.ends_with(char::is_whitespace)
                    || span.text.starts_with(char::is_whitespace);

                if gap > span.font_size * WORD_GAP && !spaceless && !has_space {
                    result.push(' ');
                }
            }
            result.push_str(&span.text);
        }

        result
    }
}

/// Text matrix and line matrix, tracked through `Tm`, `Td`, `TD`, `T*`.
#[derive(Debug, Clone, PartialEq)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_e: e,
            line_f: f,
        };
    }

    /// Move to the start of the next line, offset from the current line start.
    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    fn next_line(&mut self, leading: f32) {
        self.translate(0.0, -leading);
    }

    /// Advance along the baseline after showing text.
    fn advance(&mut self, tx: f32) {
        self.e += tx * self.a;
        self.f += tx * self.b;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    /// Vertical scale applied to the font size.
    fn scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

/// Graphics text state for one content stream.
struct TextState {
    font: Vec<u8>,
    font_size: f32,
    leading: f32,
    matrix: TextMatrix,
    in_text: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: Vec::new(),
            font_size: DEFAULT_FONT_SIZE,
            leading: DEFAULT_FONT_SIZE,
            matrix: TextMatrix::default(),
            in_text: false,
        }
    }
}

fn page_runs(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<TextRun>> {
    let fonts = doc
        .get_page_fonts(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;
    let content = page_content(doc, page_id)?;
    let spans = walk_content(doc, &content, &fonts)?;
    Ok(lines_to_runs(&group_lines(spans)))
}

/// Decompressed content of a page, concatenating content arrays.
fn page_content(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<u8>> {
    let page = doc
        .get_dictionary(page_id)
        .map_err(|e| Error::PdfParse(e.to_string()))?;

    let contents = match page.get(b"Contents") {
        Ok(contents) => contents,
        // A page without a content stream is blank
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Reference(r) => match doc.get_object(*r) {
            Ok(Object::Stream(s)) => stream_bytes(s),
            _ => Err(Error::PdfParse("invalid content stream".into())),
        },
        Object::Array(parts) => {
            let mut content = Vec::new();
            for part in parts {
                if let Object::Reference(r) = part {
                    if let Ok(Object::Stream(s)) = doc.get_object(*r) {
                        if let Ok(data) = stream_bytes(s) {
                            content.extend_from_slice(&data);
                            content.push(b' ');
                        }
                    }
                }
            }
            Ok(content)
        }
        _ => Err(Error::PdfParse("invalid content stream".into())),
    }
}

/// Stream data, decoded when the stream declares a filter.
fn stream_bytes(stream: &Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|e| Error::PdfParse(e.to_string()))
}

fn walk_content(
    doc: &LopdfDocument,
    content: &[u8],
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
) -> Result<Vec<TextSpan>> {
    if content.is_empty() {
        return Ok(Vec::new());
    }
    let content = Content::decode(content).map_err(|e| Error::PdfParse(e.to_string()))?;

    let mut spans = Vec::new();
    let mut state = TextState::default();

    for op in &content.operations {
        let operands = &op.operands;
        match op.operator.as_str() {
            "BT" => {
                state.in_text = true;
                state.matrix = TextMatrix::default();
            }
            "ET" => state.in_text = false,
            "Tf" => {
                if let [Object::Name(name), size, ..] = operands.as_slice() {
                    state.font = name.clone();
                    state.font_size = get_number(size).unwrap_or(DEFAULT_FONT_SIZE);
                }
            }
            "TL" => {
                if let Some(leading) = operands.first().and_then(get_number) {
                    state.leading = leading;
                }
            }
            "Td" | "TD" => {
                if let [tx, ty, ..] = operands.as_slice() {
                    let tx = get_number(tx).unwrap_or(0.0);
                    let ty = get_number(ty).unwrap_or(0.0);
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.matrix.translate(tx, ty);
                }
            }
            "Tm" => {
                if operands.len() >= 6 {
                    let n: Vec<f32> = operands[..6]
                        .iter()
                        .zip([1.0, 0.0, 0.0, 1.0, 0.0, 0.0])
                        .map(|(o, default)| get_number(o).unwrap_or(default))
                        .collect();
                    state.matrix.set(n[0], n[1], n[2], n[3], n[4], n[5]);
                }
            }
            "T*" => state.matrix.next_line(state.leading),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    let text = decode_text(doc, fonts, &state.font, bytes);
                    show_text(&mut state, text, &mut spans);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    let text = decode_tj_array(doc, fonts, &state.font, items);
                    show_text(&mut state, text, &mut spans);
                }
            }
            "'" | "\"" => {
                state.matrix.next_line(state.leading);
                let text_idx = if op.operator == "\"" { 2 } else { 0 };
                if let Some(Object::String(bytes, _)) = operands.get(text_idx) {
                    let text = decode_text(doc, fonts, &state.font, bytes);
                    show_text(&mut state, text, &mut spans);
                }
            }
            _ => {}
        }
    }

    Ok(spans)
}

/// Record a span at the current position and advance past it.
fn show_text(state: &mut TextState, text: String, spans: &mut Vec<TextSpan>) {
    if !state.in_text || text.is_empty() {
        return;
    }

    let advance = text.chars().count() as f32 * state.font_size * AVG_GLYPH_WIDTH;
    if !text.trim().is_empty() {
        let (x, y) = state.matrix.position();
        let size = state.font_size * state.matrix.scale();
        spans.push(TextSpan::new(text, x, y, size));
    }
    state.matrix.advance(advance);
}

fn decode_tj_array(
    doc: &LopdfDocument,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    font: &[u8],
    items: &[Object],
) -> String {
    let mut combined = String::new();
    for item in items {
        match item {
            Object::String(bytes, _) => combined.push_str(&decode_text(doc, fonts, font, bytes)),
            other => {
                let adjustment = get_number(other).map_or(0.0, |n| -n);
                let needs_space = adjustment > TJ_SPACE_THRESHOLD
                    && combined
                        .chars()
                        .last()
                        .is_some_and(|c| !c.is_whitespace() && !is_spaceless_script_char(c));
                if needs_space {
                    combined.push(' ');
                }
            }
        }
    }
    combined
}

/// Decode with the font's encoding, falling back to a byte-level guess.
fn decode_text(
    doc: &LopdfDocument,
    fonts: &BTreeMap<Vec<u8>, &Dictionary>,
    font: &[u8],
    bytes: &[u8],
) -> String {
    fonts
        .get(font)
        .and_then(|dict| dict.get_font_encoding(doc).ok())
        .and_then(|encoding| LopdfDocument::decode_text(&encoding, bytes).ok())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| decode_text_simple(bytes))
}

/// Group spans into lines by baseline, keeping stream order.
fn group_lines(spans: Vec<TextSpan>) -> Vec<TextLine> {
    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();

    for span in spans {
        let same_line = current.first().is_some_and(|first| {
            let tolerance = first.font_size.max(span.font_size) * SAME_LINE_TOLERANCE;
            (first.y - span.y).abs() <= tolerance
        });
        if !same_line && !current.is_empty() {
            lines.push(TextLine::from_spans(std::mem::take(&mut current)));
        }
        current.push(span);
    }

    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }
    lines
}

/// Lower median of the downward distances between consecutive baselines.
fn typical_line_spacing(lines: &[TextLine]) -> Option<f32> {
    let mut spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| w[0].y - w[1].y)
        .filter(|s| *s > 0.1)
        .collect();
    if spacings.is_empty() {
        return None;
    }
    spacings.sort_by(f32::total_cmp);
    Some(spacings[(spacings.len() - 1) / 2])
}

/// Convert lines into runs, inserting gap runs at paragraph breaks.
fn lines_to_runs(lines: &[TextLine]) -> Vec<TextRun> {
    let spacing = typical_line_spacing(lines);
    let mut runs = Vec::with_capacity(lines.len());

    for (i, line) in lines.iter().enumerate() {
        let text = line.text();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        if i > 0 && !runs.is_empty() {
            let dy = lines[i - 1].y - line.y;
            let paragraph_break = dy < 0.0
                || spacing.is_some_and(|s| dy > s * PARAGRAPH_GAP_RATIO);
            if paragraph_break {
                runs.push(TextRun::gap());
            }
        }
        runs.push(TextRun::new(text, line.font_size));
    }

    runs
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Scripts written without spaces between words (Han, kana).
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}

/// Byte-level decoding when no font encoding applies: UTF-16BE with BOM,
/// then UTF-8, then Latin-1.
fn decode_text_simple(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32, size: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, size)
    }

    #[test]
    fn test_text_matrix_moves() {
        let mut m = TextMatrix::default();
        m.translate(72.0, 700.0);
        assert_eq!(m.position(), (72.0, 700.0));
        m.advance(30.0);
        assert_eq!(m.position(), (102.0, 700.0));
        m.next_line(14.0);
        assert_eq!(m.position(), (72.0, 686.0));

        m.set(2.0, 0.0, 0.0, 2.0, 10.0, 20.0);
        assert_eq!(m.scale(), 2.0);
        m.translate(5.0, 0.0);
        assert_eq!(m.position(), (20.0, 20.0));
    }

    #[test]
    fn test_group_lines_by_baseline() {
        let lines = group_lines(vec![
            span("Hello", 72.0, 700.0, 12.0),
            span("world", 120.0, 700.5, 12.0),
            span("Next", 72.0, 686.0, 12.0),
        ]);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text(), "Hello world");
        assert_eq!(lines[1].text(), "Next");
    }

    #[test]
    fn test_adjacent_spans_join_without_space() {
        // "Hel" is 3 chars at 10pt: estimated width 15
        let line = TextLine::from_spans(vec![span("Hel", 0.0, 0.0, 10.0), span("lo", 15.0, 0.0, 10.0)]);
        assert_eq!(line.text(), "Hello");
    }

    #[test]
    fn test_line_font_size_weighted() {
        let line = TextLine::from_spans(vec![span("aaa", 0.0, 0.0, 10.0), span("b", 50.0, 0.0, 14.0)]);
        assert!((line.font_size - 11.0).abs() < 1e-6);
    }

    #[test]
    fn test_paragraph_gaps() {
        let lines = group_lines(vec![
            span("Title", 72.0, 760.0, 18.0),
            span("first line", 72.0, 700.0, 11.0),
            span("second line", 72.0, 686.0, 11.0),
            span("third line", 72.0, 672.0, 11.0),
            span("new paragraph", 72.0, 640.0, 11.0),
        ]);
        let runs = lines_to_runs(&lines);
        let texts: Vec<&str> = runs.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["Title", "", "first line", "second line", "third line", "", "new paragraph"]
        );
        assert_eq!(runs[0].font_size, 18.0);
    }

    #[test]
    fn test_upward_jump_breaks_paragraph() {
        let lines = group_lines(vec![
            span("left column", 72.0, 300.0, 11.0),
            span("right column", 320.0, 700.0, 11.0),
        ]);
        let runs = lines_to_runs(&lines);
        assert_eq!(runs.len(), 3);
        assert!(runs[1].is_gap());
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0x65, 0x6C, 0x6C, 0xE9]), "Hellé");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }

    #[test]
    fn test_spaceless_scripts() {
        assert!(is_spaceless_script_char('中'));
        assert!(is_spaceless_script_char('か'));
        assert!(!is_spaceless_script_char('한'));
        assert!(!is_spaceless_script_char('a'));
    }

    #[test]
    fn test_invalid_pdf_is_an_error() {
        assert!(LayoutExtractor::new().extract(b"%PDF-1.4\ngarbage").is_err());
    }
}
