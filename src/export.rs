//! PDF export of a conversation transcript
//!
//! Produces an A4 portrait document with 15 mm margins: a bold 20 pt title,
//! the generation time, a bold "Conversation:" heading and the transcript,
//! word-wrapped and paginated on a 7 mm line pitch. The document is built
//! directly with `lopdf` using the standard Helvetica fonts.

use chrono::{DateTime, Local};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use crate::error::{Result, StudyError};

pub const EXPORT_TITLE: &str = "Study Q&A Export";

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 15.0;
const LINE_PITCH_MM: f32 = 7.0;
const TITLE_SIZE: f32 = 20.0;
const HEADING_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;
const PT_PER_MM: f32 = 72.0 / 25.4;

/// Average Helvetica advance width, in em
const AVG_GLYPH_EM: f32 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static [u8] {
        match self {
            Font::Regular => b"F1",
            Font::Bold => b"F2",
        }
    }
}

/// One line of text placed on a page, `y_mm` measured from the top edge
#[derive(Debug, Clone, PartialEq)]
struct TextRun {
    font: Font,
    size: f32,
    y_mm: f32,
    text: String,
}

#[derive(Debug)]
struct Layout {
    pages: Vec<Vec<TextRun>>,
    y_mm: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y_mm: MARGIN_MM,
        }
    }

    fn place(&mut self, font: Font, size: f32, text: &str) {
        let run = TextRun {
            font,
            size,
            y_mm: self.y_mm,
            text: text.to_string(),
        };
        if let Some(page) = self.pages.last_mut() {
            page.push(run);
        }
    }

    fn advance(&mut self, mm: f32) {
        self.y_mm += mm;
    }

    /// Body text, breaking to a new page once the cursor passes the bottom margin
    fn wrapped(&mut self, text: &str, size: f32) {
        for line in wrap_text(text, line_capacity(size)) {
            if self.y_mm > PAGE_HEIGHT_MM - MARGIN_MM {
                self.pages.push(Vec::new());
                self.y_mm = MARGIN_MM;
            }
            self.place(Font::Regular, size, &line);
            self.advance(LINE_PITCH_MM);
        }
    }
}

fn lay_out(conversation_text: &str, generated: DateTime<Local>) -> Layout {
    let mut layout = Layout::new();

    layout.place(Font::Bold, TITLE_SIZE, EXPORT_TITLE);
    layout.advance(15.0);

    let stamp = generated.format("%-m/%-d/%Y, %-I:%M:%S %p");
    layout.wrapped(&format!("Generated: {}", stamp), BODY_SIZE);
    layout.advance(5.0);

    layout.place(Font::Bold, HEADING_SIZE, "Conversation:");
    layout.advance(8.0);
    layout.wrapped(conversation_text, BODY_SIZE);

    layout
}

/// Characters that fit between the margins at `size` points
fn line_capacity(size: f32) -> usize {
    let glyph_mm = size * AVG_GLYPH_EM / PT_PER_MM;
    let usable_mm = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    ((usable_mm / glyph_mm).floor() as usize).max(1)
}

/// Greedy word wrap
///
/// Each newline starts a new line and blank input lines are kept. Words
/// longer than `width` are split across lines.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(width) {
                let needed = if current_len == 0 {
                    chunk.len()
                } else {
                    current_len + 1 + chunk.len()
                };
                if needed > width && current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.extend(chunk);
                current_len += chunk.len();
            }
        }

        lines.push(current);
    }

    lines
}

/// WinAnsi bytes for the standard fonts; anything outside Latin-1 becomes `?`
fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x09 => b' ',
            code @ (0x20..=0x7e | 0xa0..=0xff) => code as u8,
            _ => b'?',
        })
        .collect()
}

fn text_operations(run: &TextRun) -> Vec<Operation> {
    let x = MARGIN_MM * PT_PER_MM;
    let y = (PAGE_HEIGHT_MM - run.y_mm) * PT_PER_MM;
    vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(run.font.resource().to_vec()),
                Object::Real(run.size),
            ],
        ),
        Operation::new("Td", vec![Object::Real(x), Object::Real(y)]),
        Operation::new(
            "Tj",
            vec![Object::String(encode_text(&run.text), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

fn font(base: &str) -> Object {
    Object::Dictionary(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    })
}

fn export_error(err: impl std::fmt::Display) -> StudyError {
    StudyError::Export(err.to_string())
}

fn build_document(layout: &Layout) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(font("Helvetica"));
    let bold_id = doc.add_object(font("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids = Vec::with_capacity(layout.pages.len());
    for runs in &layout.pages {
        let content: Content<Vec<Operation>> = Content {
            operations: runs.iter().flat_map(text_operations).collect(),
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().map_err(export_error)?,
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
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
                Object::Integer(0),
                Object::Integer(0),
                Object::Real(PAGE_WIDTH_MM * PT_PER_MM),
                Object::Real(PAGE_HEIGHT_MM * PT_PER_MM),
            ],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).map_err(export_error)?;
    Ok(buffer)
}

/// Render a conversation transcript as PDF bytes
///
/// # Errors
///
/// `StudyError::Export` when the document cannot be serialized
pub fn render_pdf(conversation_text: &str, generated: DateTime<Local>) -> Result<Vec<u8>> {
    let layout = lay_out(conversation_text, generated);
    tracing::debug!(pages = layout.pages.len(), "Laid out PDF export");
    build_document(&layout)
}
