//! Page-content reader over lopdf.
//!
//! Replays each page's content stream far enough to recover the two inputs of
//! the grid pipeline: `m`/`l` path operators mapped through the current
//! transformation matrix, and text runs positioned by the text matrix.
//! Coordinates are flipped to a top-left origin using the page MediaBox.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{TableError, TableResult};
use crate::grid::TextRun;
use crate::operators::{object_to_f64, PathOp};
use crate::pipeline::PageContent;

/// US Letter, used when a page has no resolvable MediaBox
const DEFAULT_MEDIA_BOX: [f64; 4] = [0.0, 0.0, 612.0, 792.0];

/// TJ adjustments more negative than this (in thousandths of an em) split the run
const TJ_SPACE_THRESHOLD: f64 = -200.0;

/// Text state before the first `Tf`
const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Glyph width in em used for advancing past shown strings
const AVERAGE_GLYPH_WIDTH: f64 = 0.5;

pub struct PdfPageSource {
    document: Document,
}

impl PdfPageSource {
    pub fn open<P: AsRef<Path>>(path: P) -> TableResult<Self> {
        let path = path.as_ref();
        let document = Document::load(path)
            .map_err(|e| TableError::pdf_load(format!("{}", path.display()), e))?;
        info!("📄 Loaded PDF {:?} ({} pages)", path, document.get_pages().len());
        Ok(Self { document })
    }

    pub fn from_bytes(bytes: &[u8]) -> TableResult<Self> {
        let document = Document::load_mem(bytes)
            .map_err(|e| TableError::pdf_load("in-memory document", e))?;
        Ok(Self { document })
    }

    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// 1-based page numbers in document order
    pub fn page_numbers(&self) -> Vec<u32> {
        self.document.get_pages().keys().copied().collect()
    }

    /// Read every page; failures are kept per page so the caller can skip them.
    pub fn all_pages(&self) -> Vec<TableResult<PageContent>> {
        self.page_numbers()
            .into_iter()
            .map(|page_number| self.page_content(page_number))
            .collect()
    }

    pub fn page_content(&self, page_number: u32) -> TableResult<PageContent> {
        let pages = self.document.get_pages();
        let page_id = *pages.get(&page_number).ok_or(TableError::PageNotFound {
            page_number,
            page_count: pages.len(),
        })?;

        let raw = self
            .document
            .get_page_content(page_id)
            .map_err(|e| TableError::page_content(page_number, "content stream unreadable", Some(e)))?;
        let content = Content::decode(&raw)
            .map_err(|e| TableError::page_content(page_number, "content stream malformed", Some(e)))?;

        let media_box = self.media_box(page_id);
        let mut replay = ContentReplay::new(media_box);
        for operation in &content.operations {
            replay.apply(operation);
        }

        debug!(
            page = page_number,
            operations = content.operations.len(),
            path_ops = replay.operators.len(),
            text_runs = replay.text_runs.len(),
            "page content decoded"
        );

        Ok(PageContent {
            page_number,
            operators: replay.operators,
            text_runs: replay.text_runs,
        })
    }

    /// MediaBox of the page, following the inheritance chain through `Parent`.
    fn media_box(&self, page_id: ObjectId) -> [f64; 4] {
        let mut current = Some(page_id);
        let mut depth = 0;

        while let Some(id) = current {
            let Ok(dict) = self.document.get_object(id).and_then(Object::as_dict) else {
                break;
            };
            if let Some(rect) = dict.get(b"MediaBox").ok().and_then(|obj| self.resolve_rect(obj)) {
                return rect;
            }

            depth += 1;
            if depth > 32 {
                break;
            }
            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
        }

        DEFAULT_MEDIA_BOX
    }

    fn resolve_rect(&self, object: &Object) -> Option<[f64; 4]> {
        let object = match object {
            Object::Reference(id) => self.document.get_object(*id).ok()?,
            other => other,
        };
        let values: Vec<f64> = object
            .as_array()
            .ok()?
            .iter()
            .map(object_to_f64)
            .collect::<Option<Vec<f64>>>()?;

        match values.as_slice() {
            [x1, y1, x2, y2] => Some([x1.min(*x2), y1.min(*y2), x1.max(*x2), y1.max(*y2)]),
            _ => None,
        }
    }
}

/// Affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    fn translation(tx: f64, ty: f64) -> Self {
        Matrix { e: tx, f: ty, ..Self::IDENTITY }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        match numbers(operands)?.as_slice() {
            [a, b, c, d, e, f, ..] => Some(Matrix { a: *a, b: *b, c: *c, d: *d, e: *e, f: *f }),
            _ => None,
        }
    }

    /// `self` applied first, then `other`
    fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.a + y * self.c + self.e, x * self.b + y * self.d + self.f)
    }
}

/// Graphics/text state needed to position paths and text.
struct ContentReplay {
    media_box: [f64; 4],
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    leading: f64,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    operators: Vec<PathOp>,
    text_runs: Vec<TextRun>,
}

impl ContentReplay {
    fn new(media_box: [f64; 4]) -> Self {
        Self {
            media_box,
            ctm: Matrix::IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            leading: 0.0,
            font_size: DEFAULT_FONT_SIZE,
            char_spacing: 0.0,
            word_spacing: 0.0,
            operators: Vec::new(),
            text_runs: Vec::new(),
        }
    }

    /// Device space to top-left page space
    fn to_page(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.media_box[0], self.media_box[3] - y)
    }

    fn apply(&mut self, operation: &Operation) {
        let operands = &operation.operands;

        match operation.operator.as_str() {
            "q" => self.ctm_stack.push(self.ctm),
            "Q" => {
                if let Some(ctm) = self.ctm_stack.pop() {
                    self.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.ctm = m.then(&self.ctm);
                }
            }
            "m" | "l" => match PathOp::from_operation(operation) {
                PathOp::MoveTo { x, y } => {
                    let (x, y) = self.map_point(x, y);
                    self.operators.push(PathOp::MoveTo { x, y });
                }
                PathOp::LineTo { x, y } => {
                    let (x, y) = self.map_point(x, y);
                    self.operators.push(PathOp::LineTo { x, y });
                }
                PathOp::Other => {}
            },
            "BT" => {
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "TL" => {
                if let Some([leading, ..]) = numbers(operands).as_deref() {
                    self.leading = *leading;
                }
            }
            "Td" | "TD" => {
                if let Some([tx, ty, ..]) = numbers(operands).as_deref() {
                    if operation.operator == "TD" {
                        self.leading = -ty;
                    }
                    self.next_line(*tx, *ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_operands(operands) {
                    self.text_matrix = m;
                    self.line_matrix = m;
                }
            }
            "T*" => self.next_line(0.0, -self.leading),
            "Tf" => {
                if let Some(size) = operands.get(1).and_then(object_to_f64) {
                    self.font_size = size;
                }
            }
            "Tc" => {
                if let Some([spacing, ..]) = numbers(operands).as_deref() {
                    self.char_spacing = *spacing;
                }
            }
            "Tw" => {
                if let Some([spacing, ..]) = numbers(operands).as_deref() {
                    self.word_spacing = *spacing;
                }
            }
            "Tj" | "TJ" => {
                if let Some(pieces) = operands.first().and_then(text_pieces) {
                    self.show(pieces);
                }
            }
            "'" => {
                self.next_line(0.0, -self.leading);
                if let Some(pieces) = operands.first().and_then(text_pieces) {
                    self.show(pieces);
                }
            }
            "\"" => {
                if let Some([word, chars, ..]) = numbers(&operands[..operands.len().min(2)]).as_deref() {
                    self.word_spacing = *word;
                    self.char_spacing = *chars;
                }
                self.next_line(0.0, -self.leading);
                if let Some(pieces) = operands.get(2).and_then(text_pieces) {
                    self.show(pieces);
                }
            }
            _ => {}
        }
    }

    fn map_point(&self, x: f64, y: f64) -> (f64, f64) {
        let (dx, dy) = self.ctm.apply(x, y);
        self.to_page(dx, dy)
    }

    fn next_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// Origin of the next glyph in top-left page space
    fn text_origin(&self) -> (f64, f64) {
        let (dx, dy) = self.text_matrix.then(&self.ctm).apply(0.0, 0.0);
        self.to_page(dx, dy)
    }

    /// Move the text matrix along the baseline by `tx` text-space units
    fn advance(&mut self, tx: f64) {
        self.text_matrix = Matrix::translation(tx, 0.0).then(&self.text_matrix);
    }

    /// Approximate advance of `text`; glyph widths are not read from the font.
    fn glyph_advance(&self, text: &str) -> f64 {
        text.chars()
            .map(|c| {
                let spacing = if c == ' ' { self.word_spacing } else { 0.0 };
                AVERAGE_GLYPH_WIDTH * self.font_size + self.char_spacing + spacing
            })
            .sum()
    }

    /// Show strings and TJ adjustments. An adjustment past
    /// `TJ_SPACE_THRESHOLD` ends the current run, so one TJ row can fill
    /// several columns.
    fn show(&mut self, pieces: Vec<TextPiece>) {
        let mut pending: Option<(String, (f64, f64))> = None;

        for piece in pieces {
            match piece {
                TextPiece::Glyphs(text) => {
                    let origin = self.text_origin();
                    pending.get_or_insert_with(|| (String::new(), origin)).0.push_str(&text);
                    let advance = self.glyph_advance(&text);
                    self.advance(advance);
                }
                TextPiece::Adjust(adjust) => {
                    if adjust < TJ_SPACE_THRESHOLD {
                        if let Some((text, origin)) = pending.take() {
                            self.emit_text(text, origin);
                        }
                    }
                    self.advance(-adjust / 1000.0 * self.font_size);
                }
            }
        }

        if let Some((text, origin)) = pending {
            self.emit_text(text, origin);
        }
    }

    fn emit_text(&mut self, text: String, (x, y): (f64, f64)) {
        if text.trim().is_empty() {
            return;
        }
        self.text_runs.push(TextRun::new(text, x, y));
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TextPiece {
    Glyphs(String),
    /// TJ adjustment in thousandths of an em; negative moves right
    Adjust(f64),
}

fn numbers(operands: &[Object]) -> Option<Vec<f64>> {
    operands.iter().map(object_to_f64).collect()
}

/// Strings and adjustments of a `Tj` string or `TJ` array. Bytes are read as Latin-1.
fn text_pieces(operand: &Object) -> Option<Vec<TextPiece>> {
    match operand {
        Object::String(bytes, _) => Some(vec![TextPiece::Glyphs(latin1(bytes))]),
        Object::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Object::String(bytes, _) => Some(TextPiece::Glyphs(latin1(bytes))),
                    other => object_to_f64(other).map(TextPiece::Adjust),
                })
                .collect(),
        ),
        _ => None,
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
