//! Page source backed by lopdf.
//!
//! Decodes each page's content stream into positioned text runs, groups
//! runs that share a baseline into lines, and converts PDF's bottom-up
//! coordinates into top-down boxes.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Document as LopdfDocument, Object, ObjectId};

use super::{fingerprint, DocumentId, PageSource};
use crate::error::{Error, Result};
use crate::model::{BoundingBox, RawLine, RawRun};

/// Concrete [`PageSource`] backed by `lopdf::Document`.
pub struct LopdfSource {
    doc: LopdfDocument,
    id: DocumentId,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfSource {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_bytes(name, &data)
    }

    /// Load a PDF from an in-memory byte slice.
    pub fn from_bytes(name: impl Into<String>, data: &[u8]) -> Result<Self> {
        let name = name.into();
        let doc = LopdfDocument::load_mem(data)
            .map_err(|e| Error::Validation(format!("Cannot open {}: {}", name, e)))?;
        let pages = doc.get_pages();
        let id = DocumentId::new(name).with_fingerprint(fingerprint(data));
        Ok(Self { doc, id, pages })
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.pages.len() as u32))
    }

    /// Page height from the MediaBox, inherited from ancestors if needed,
    /// defaulting to Letter.
    fn page_height(&self, page_id: ObjectId) -> f32 {
        self.inherited(page_id, b"MediaBox")
            .and_then(|obj| match obj {
                Object::Reference(r) => self.doc.get_object(*r).ok(),
                other => Some(other),
            })
            .and_then(|obj| obj.as_array().ok())
            .filter(|array| array.len() >= 4)
            .and_then(|array| get_number(&array[3]))
            .unwrap_or(792.0)
    }

    /// Look up a page attribute, walking up the page tree.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut node = self.doc.get_dictionary(page_id).ok();
        let mut depth = 0;
        while let Some(dict) = node {
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            depth += 1;
            if depth > 32 {
                break;
            }
            node = dict
                .get(b"Parent")
                .ok()
                .and_then(|p| p.as_reference().ok())
                .and_then(|r| self.doc.get_dictionary(r).ok());
        }
        None
    }

    /// Decompressed content stream of a page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;
        let contents = page_dict.get(b"Contents")?;

        match contents {
            Object::Reference(r) => {
                if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                    return stream_bytes(s);
                }
                Err(Error::PdfParse("Invalid content stream".to_string()))
            }
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Reference(r) = obj {
                        if let Ok(Object::Stream(s)) = self.doc.get_object(*r) {
                            content.extend_from_slice(&stream_bytes(s)?);
                            content.push(b' ');
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    /// Font dictionaries of a page's resources, including inherited ones.
    fn page_fonts(&self, page_id: ObjectId) -> BTreeMap<Vec<u8>, &lopdf::Dictionary> {
        let font_dict = self
            .inherited(page_id, b"Resources")
            .and_then(|r| self.resolve_dict(r))
            .and_then(|res| res.get(b"Font").ok())
            .and_then(|f| self.resolve_dict(f));

        font_dict
            .map(|fonts| {
                fonts
                    .iter()
                    .filter_map(|(name, obj)| self.resolve_dict(obj).map(|d| (name.clone(), d)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a lopdf::Dictionary> {
        match obj {
            Object::Reference(r) => self.doc.get_dictionary(*r).ok(),
            Object::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    /// Decode a string operand with the font's encoding, falling back to
    /// simple decoding when the font or encoding is unavailable.
    fn decode_text(
        &self,
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
        font: &[u8],
        bytes: &[u8],
    ) -> String {
        if let Some(font_dict) = fonts.get(font) {
            if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }

    /// Extract positioned spans from a page's content stream.
    fn page_spans(&self, page_id: ObjectId) -> Result<Vec<Span>> {
        let fonts = self.page_fonts(page_id);
        let base_fonts: BTreeMap<Vec<u8>, String> = fonts
            .iter()
            .map(|(name, dict)| {
                let base = dict
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).to_string())
                    .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                (name.clone(), base)
            })
            .collect();

        let content = self.page_content(page_id)?;
        let content = lopdf::content::Content::decode(&content)?;

        let mut spans = Vec::new();
        let mut font_key: Vec<u8> = Vec::new();
        let mut font_name = String::new();
        let mut font_size: f32 = 12.0;
        let mut matrix = TextMatrix::default();
        let mut in_text = false;

        for op in content.operations {
            match op.operator.as_str() {
                "BT" => {
                    in_text = true;
                    matrix = TextMatrix::default();
                }
                "ET" => in_text = false,
                "Tf" => {
                    if op.operands.len() >= 2 {
                        if let Object::Name(name) = &op.operands[0] {
                            font_key = name.clone();
                            font_name = base_fonts
                                .get(name)
                                .cloned()
                                .unwrap_or_else(|| String::from_utf8_lossy(name).to_string());
                        }
                        font_size = get_number(&op.operands[1]).unwrap_or(12.0);
                    }
                }
                "Td" | "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_number(&op.operands[0]).unwrap_or(0.0);
                        let ty = get_number(&op.operands[1]).unwrap_or(0.0);
                        matrix.translate(tx, ty);
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        let n: Vec<f32> = op.operands[..6]
                            .iter()
                            .map(|o| get_number(o).unwrap_or(0.0))
                            .collect();
                        matrix.set(n[0], n[1], n[2], n[3], n[4], n[5]);
                    }
                }
                "T*" => matrix.next_line(),
                "Tj" | "TJ" | "'" | "\"" => {
                    if op.operator == "'" || op.operator == "\"" {
                        matrix.next_line();
                    }
                    if !in_text {
                        continue;
                    }
                    let text = match op.operator.as_str() {
                        "TJ" => match op.operands.first() {
                            Some(Object::Array(items)) => {
                                self.decode_tj_array(&fonts, &font_key, items)
                            }
                            _ => String::new(),
                        },
                        _ => {
                            let idx = if op.operator == "\"" { 2 } else { 0 };
                            match op.operands.get(idx) {
                                Some(Object::String(bytes, _)) => {
                                    self.decode_text(&fonts, &font_key, bytes)
                                }
                                _ => String::new(),
                            }
                        }
                    };

                    if !text.trim().is_empty() {
                        let (x, y) = matrix.position();
                        spans.push(Span::new(
                            text,
                            x,
                            y,
                            font_size * matrix.scale(),
                            font_name.clone(),
                        ));
                    }
                }
                _ => {}
            }
        }

        Ok(spans)
    }

    /// Decode a TJ array, treating large negative adjustments as word breaks.
    fn decode_tj_array(
        &self,
        fonts: &BTreeMap<Vec<u8>, &lopdf::Dictionary>,
        font: &[u8],
        items: &[Object],
    ) -> String {
        // 1/1000 text space units; ~0.2 em reads as a space in most fonts
        const SPACE_THRESHOLD: f32 = 200.0;

        let mut combined = String::new();
        for item in items {
            match item {
                Object::String(bytes, _) => {
                    combined.push_str(&self.decode_text(fonts, font, bytes));
                }
                other => {
                    if let Some(n) = get_number(other) {
                        if -n > SPACE_THRESHOLD && !combined.is_empty() && !combined.ends_with(' ')
                        {
                            combined.push(' ');
                        }
                    }
                }
            }
        }
        combined
    }
}

impl PageSource for LopdfSource {
    fn id(&self) -> DocumentId {
        self.id.clone()
    }

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_lines(&self, page: u32) -> Result<Vec<RawLine>> {
        let page_id = self.page_id(page)?;
        let height = self.page_height(page_id);
        let spans = self.page_spans(page_id)?;
        Ok(group_spans_into_lines(spans, height))
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.page_id(page)?;
        self.doc
            .extract_text(&[page])
            .map_err(|e| Error::PdfParse(format!("Page {}: {}", page, e)))
    }
}

/// A decoded text fragment in PDF user space.
#[derive(Debug, Clone)]
struct Span {
    text: String,
    x: f32,
    /// Baseline, bottom-up
    y: f32,
    width: f32,
    font_size: f32,
    font_name: String,
}

impl Span {
    fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        // No glyph widths available; assume half an em per character
        let width = text.chars().count() as f32 * font_size * 0.5;
        Self {
            text,
            x,
            y,
            width,
            font_size,
            font_name,
        }
    }

    /// Convert to a run with a top-down box on a page of the given height.
    fn into_run(self, page_height: f32) -> RawRun {
        let top = page_height - (self.y + self.font_size * 0.8);
        let bottom = page_height - (self.y - self.font_size * 0.2);
        let bbox = BoundingBox::new(self.x, top, self.x + self.width, bottom);
        RawRun::new(self.text, self.font_size, self.font_name, bbox)
    }
}

/// Y-based line grouping: spans within 30% of a font size of the current
/// baseline join the current line; runs inside a line are ordered by X.
fn group_spans_into_lines(mut spans: Vec<Span>, page_height: f32) -> Vec<RawLine> {
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then_with(|| a.x.total_cmp(&b.x)));

    let mut lines: Vec<Vec<Span>> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match (current_y, lines.last_mut()) {
            (Some(y), Some(line)) if (span.y - y).abs() <= tolerance => line.push(span),
            _ => {
                current_y = Some(span.y);
                lines.push(vec![span]);
            }
        }
    }

    lines
        .into_iter()
        .map(|mut line| {
            line.sort_by(|a, b| a.x.total_cmp(&b.x));
            RawLine::new(line.into_iter().map(|s| s.into_run(page_height)).collect())
        })
        .collect()
}

/// Text matrix for tracking position in content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
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
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self { a, b, c, d, e, f };
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        // TL is not tracked; assume 12pt leading
        self.f -= 12.0 * self.d;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Stream data with its filters applied; unfiltered streams are returned as is.
fn stream_bytes(stream: &lopdf::Stream) -> Result<Vec<u8>> {
    if stream.dict.has(b"Filter") {
        Ok(stream.decompressed_content()?)
    } else {
        Ok(stream.content.clone())
    }
}

fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Simple text decoding fallback when no encoding is available.
fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}
