//! PDF export of merged documents.
//!
//! Documents are plain text with a small markup:
//! - an empty line is a vertical break;
//! - a line starting with `- ` is a bullet item;
//! - `***text***`, `**text**` and `*text*` mark bold italic, bold and italic runs.

use crate::engine::BackendError;
use genpdf::elements::{Break, LinearLayout, Paragraph};
use genpdf::style::{Style, StyledString};
use genpdf::Document;
use std::path::PathBuf;

/// Turns document text into PDF bytes.
pub trait PdfRenderer {
    fn render(&self, title: &str, text: &str) -> Result<Vec<u8>, BackendError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment {
    pub text: String,
    pub style: TextStyle,
}

/// Splits a line into styled runs. A marker without its closing twin is
/// kept as literal text.
pub fn parse_styles(line: &str) -> Vec<TextSegment> {
    const MARKERS: [(&str, TextStyle); 3] = [
        ("***", TextStyle::BoldItalic),
        ("**", TextStyle::Bold),
        ("*", TextStyle::Italic),
    ];

    let mut segments: Vec<TextSegment> = Vec::new();
    let mut plain = String::new();
    let mut rest = line;

    'outer: while !rest.is_empty() {
        for (marker, style) in MARKERS {
            if let Some(after) = rest.strip_prefix(marker) {
                if let Some(end) = after.find(marker).filter(|&end| end > 0) {
                    if !plain.is_empty() {
                        segments.push(TextSegment {
                            text: std::mem::take(&mut plain),
                            style: TextStyle::Regular,
                        });
                    }
                    segments.push(TextSegment {
                        text: after[..end].to_string(),
                        style,
                    });
                    rest = &after[end + marker.len()..];
                    continue 'outer;
                }
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            plain.push(c);
        }
        rest = chars.as_str();
    }

    if !plain.is_empty() {
        segments.push(TextSegment {
            text: plain,
            style: TextStyle::Regular,
        });
    }
    segments
}

fn push_segments_into_paragraph(p: &mut Paragraph, segments: &[TextSegment]) {
    for seg in segments {
        let style = match seg.style {
            TextStyle::Regular => Style::new(),
            TextStyle::Bold => Style::new().bold(),
            TextStyle::Italic => Style::new().italic(),
            TextStyle::BoldItalic => Style::new().bold().italic(),
        };
        p.push(StyledString::new(seg.text.clone(), style));
    }
}

/// Renders with genpdf using a font family found in `fonts_dir`.
pub struct GenPdfRenderer {
    fonts_dir: PathBuf,
}

impl GenPdfRenderer {
    pub fn new(fonts_dir: impl Into<PathBuf>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
        }
    }

    // Arial when present, LiberationSans otherwise.
    fn load_font(&self) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, BackendError> {
        if let Ok(family) = genpdf::fonts::from_files(&self.fonts_dir, "Arial", None) {
            return Ok(family);
        }
        genpdf::fonts::from_files(&self.fonts_dir, "LiberationSans", None)
            .map_err(|e| BackendError::Render(format!("{}: {}", self.fonts_dir.display(), e)))
    }

    fn configure_document(&self, title: &str) -> Result<Document, BackendError> {
        let mut doc = Document::new(self.load_font()?);
        doc.set_title(title);
        doc.set_font_size(11);
        doc.set_line_spacing(1.0f64);

        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);
        Ok(doc)
    }
}

impl PdfRenderer for GenPdfRenderer {
    fn render(&self, title: &str, text: &str) -> Result<Vec<u8>, BackendError> {
        let mut doc = self.configure_document(title)?;

        for line in text.lines() {
            if line.trim().is_empty() {
                doc.push(Break::new(1));
            } else if let Some(item) = line.strip_prefix("- ") {
                let mut p = Paragraph::new("");
                p.push(StyledString::new("• ", Style::new()));
                push_segments_into_paragraph(&mut p, &parse_styles(item));
                let mut layout = LinearLayout::vertical();
                layout.push(p);
                doc.push(layout);
            } else {
                let mut p = Paragraph::new("");
                push_segments_into_paragraph(&mut p, &parse_styles(line));
                doc.push(p);
            }
        }

        let mut bytes = Vec::new();
        doc.render(&mut bytes)
            .map_err(|e| BackendError::Render(e.to_string()))?;
        Ok(bytes)
    }
}
