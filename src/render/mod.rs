//! Rendering module for converting document trees to output formats.
//!
//! [`PdfRenderer`] is the primary backend. Markdown and JSON read the same
//! [`DocumentTree`](crate::model::DocumentTree) and exist for previews and
//! debugging.

mod font;
mod json;
pub mod layout;
mod markdown;
mod options;
mod pdf;
mod result;
mod style;

pub use font::Font;
pub use json::{to_json, JsonFormat};
pub use layout::{DrawOp, Layout, PageLayout};
pub use markdown::{to_markdown, MarkdownOptions, MarkdownRenderer};
pub use options::RenderOptions;
pub use pdf::{to_pdf, PdfRenderer};
pub use result::{RenderResult, RenderStats};
pub use style::{BulletStyle, Color, PageGeometry, StyleTable, TableStyle, TextStyle};
