//! PDF backend.
//!
//! Serializes a [`Layout`] with lopdf. The object graph is built in a fixed
//! order and content streams are deflated by hand at a fixed level, so the
//! only bytes that differ between two renders of the same tree are those of
//! the `CreationDate` entry in the info dictionary.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use super::font::{encode, sanitize, Font};
use super::layout::{layout, DrawOp, Layout, PageLayout};
use super::style::Color;
use super::{RenderOptions, RenderResult};
use crate::error::RenderError;
use crate::model::DocumentTree;

const PDF_VERSION: &str = "1.5";
const STREAM_COMPRESSION: u32 = 6;

/// Render a tree to PDF.
pub fn to_pdf(tree: &DocumentTree, options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
    PdfRenderer::new(options.clone()).render(tree)
}

/// Renders document trees to PDF bytes.
#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    options: RenderOptions,
}

impl PdfRenderer {
    /// Create a renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Get the options.
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render a tree to PDF bytes.
    pub fn render(&self, tree: &DocumentTree) -> Result<Vec<u8>, RenderError> {
        self.render_with_stats(tree).map(|result| result.bytes)
    }

    /// Render a tree and return layout statistics alongside the bytes.
    pub fn render_with_stats(&self, tree: &DocumentTree) -> Result<RenderResult, RenderError> {
        let laid_out = layout(tree, &self.options)?;
        let title = self
            .options
            .title
            .clone()
            .or_else(|| tree.title().map(str::to_string));
        let bytes = self.write(&laid_out, title.as_deref())?;
        Ok(RenderResult::new(bytes, laid_out.stats))
    }

    fn write(&self, laid_out: &Layout, title: Option<&str>) -> Result<Vec<u8>, RenderError> {
        let geometry = &self.options.geometry;
        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(font_dictionary(Font::Regular));
        let bold_id = doc.add_object(font_dictionary(Font::Bold));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                Font::Regular.resource_name() => regular_id,
                Font::Bold.resource_name() => bold_id,
            },
        });

        let mut kids = Vec::with_capacity(laid_out.pages.len());
        for page in &laid_out.pages {
            let content = Content {
                operations: page_operations(page),
            };
            let stream = Stream::new(
                dictionary! { "Filter" => "FlateDecode" },
                deflate(&content.encode()?)?,
            );
            let content_id = doc.add_object(stream);
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), real(geometry.width), real(geometry.height)],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });

        let mut info = dictionary! {
            "Producer" => literal(&self.options.producer),
            "CreationDate" => Object::String(
                self.options
                    .timestamp()
                    .format("D:%Y%m%d%H%M%SZ")
                    .to_string()
                    .into_bytes(),
                StringFormat::Literal,
            ),
        };
        if let Some(title) = title {
            info.set("Title", literal(title));
        }
        let info_id = doc.add_object(info);

        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        Ok(bytes)
    }
}

fn font_dictionary(font: Font) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => font.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Round to two decimals so coordinates serialize compactly.
fn real(value: f32) -> Object {
    Object::Real((value * 100.0).round() / 100.0)
}

fn literal(text: &str) -> Object {
    Object::String(encode(&sanitize(text)), StringFormat::Literal)
}

fn color_operands(color: Color) -> Vec<Object> {
    vec![real(color.r), real(color.g), real(color.b)]
}

fn page_operations(page: &PageLayout) -> Vec<Operation> {
    let mut ops = Vec::new();
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                font,
                size,
                color,
                text,
            } => {
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![Object::Name(font.resource_name().as_bytes().to_vec()), real(*size)],
                ));
                ops.push(Operation::new("rg", color_operands(*color)));
                ops.push(Operation::new("Td", vec![real(*x), real(*y)]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                let paint = match (fill, stroke) {
                    (None, None) => continue,
                    (Some(_), None) => "f",
                    (None, Some(_)) => "S",
                    (Some(_), Some(_)) => "B",
                };
                ops.push(Operation::new("q", vec![]));
                if let Some(fill) = fill {
                    ops.push(Operation::new("rg", color_operands(*fill)));
                }
                if let Some((color, line_width)) = stroke {
                    ops.push(Operation::new("RG", color_operands(*color)));
                    ops.push(Operation::new("w", vec![real(*line_width)]));
                }
                ops.push(Operation::new(
                    "re",
                    vec![real(*x), real(*y), real(*width), real(*height)],
                ));
                ops.push(Operation::new(paint, vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
        }
    }
    ops
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, RenderError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(STREAM_COMPRESSION));
    encoder
        .write_all(data)
        .map_err(|e| RenderError::Pdf(e.to_string()))?;
    encoder.finish().map_err(|e| RenderError::Pdf(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentNode;
    use crate::render::PageGeometry;
    use chrono::{TimeZone, Utc};

    fn pinned() -> RenderOptions {
        RenderOptions::new().with_generated_at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
    }

    fn tree() -> DocumentTree {
        DocumentTree::from(vec![
            DocumentNode::heading(1, "Report for Row 1"),
            DocumentNode::heading(2, "Data Summary"),
            DocumentNode::bullet("Name: John Doe"),
            DocumentNode::bullet("Formula: (a+b) \\ c — 100%"),
            DocumentNode::table(
                vec!["Field".into(), "Value".into()],
                vec![vec!["Age".into(), "30".into()]],
            ),
        ])
    }

    #[test]
    fn test_render_is_deterministic() {
        let renderer = PdfRenderer::new(pinned());
        let a = renderer.render(&tree()).unwrap();
        let b = renderer.render(&tree()).unwrap();
        assert!(a.starts_with(b"%PDF-1.5"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_only_timestamp_differs() {
        let a = PdfRenderer::new(pinned()).render(&tree()).unwrap();
        let later = RenderOptions::new()
            .with_generated_at(Utc.with_ymd_and_hms(2031, 9, 9, 9, 9, 9).unwrap());
        let b = PdfRenderer::new(later).render(&tree()).unwrap();
        assert_eq!(a.len(), b.len());
        let differing = a.iter().zip(&b).filter(|(x, y)| x != y).count();
        assert!(differing > 0 && differing <= 14);
    }

    #[test]
    fn test_output_loads() {
        let result = PdfRenderer::new(pinned()).render_with_stats(&tree()).unwrap();
        assert_eq!(result.stats.page_count, 1);
        let doc = Document::load_mem(&result.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_page_count_matches_layout() {
        let text = "lorem ipsum ".repeat(1500);
        let tree = DocumentTree::from(vec![DocumentNode::paragraph(text)]);
        let result = PdfRenderer::new(pinned()).render_with_stats(&tree).unwrap();
        assert!(result.stats.page_count > 1);
        let doc = Document::load_mem(&result.bytes).unwrap();
        assert_eq!(doc.get_pages().len() as u32, result.stats.page_count);
    }

    #[test]
    fn test_invalid_geometry_is_error() {
        let options = pinned().with_geometry(PageGeometry::letter().with_margins(400.0));
        let result = PdfRenderer::new(options).render(&tree());
        assert!(matches!(result, Err(RenderError::Layout(_))));
    }
}
