//! Page geometry and the fixed style table.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// An RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
}

impl Color {
    /// Black.
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    /// White.
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    /// Dark slate, used for table headers.
    pub const SLATE: Color = Color::rgb(0.184, 0.310, 0.310);
    /// Mid grey, used for the page footer.
    pub const GREY: Color = Color::rgb(0.4, 0.4, 0.4);

    /// Create a color from components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// Page size and margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    /// Page width
    pub width: f32,
    /// Page height
    pub height: f32,
    /// Top margin
    pub margin_top: f32,
    /// Bottom margin (the footer is drawn inside it)
    pub margin_bottom: f32,
    /// Left margin
    pub margin_left: f32,
    /// Right margin
    pub margin_right: f32,
}

impl PageGeometry {
    /// US Letter with one-inch margins.
    pub const fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin_top: 72.0,
            margin_bottom: 72.0,
            margin_left: 72.0,
            margin_right: 72.0,
        }
    }

    /// ISO A4 with one-inch margins.
    pub const fn a4() -> Self {
        Self {
            width: 595.0,
            height: 842.0,
            ..Self::letter()
        }
    }

    /// Set all four margins.
    pub fn with_margins(mut self, margin: f32) -> Self {
        self.margin_top = margin;
        self.margin_bottom = margin;
        self.margin_left = margin;
        self.margin_right = margin;
        self
    }

    /// Width available for content.
    pub fn content_width(&self) -> f32 {
        self.width - self.margin_left - self.margin_right
    }

    /// Height available for content.
    pub fn content_height(&self) -> f32 {
        self.height - self.margin_top - self.margin_bottom
    }

    /// Y coordinate of the top of the content area.
    pub fn top(&self) -> f32 {
        self.height - self.margin_top
    }

    /// Y coordinate of the bottom of the content area.
    pub fn bottom(&self) -> f32 {
        self.margin_bottom
    }

    /// Reject geometries that leave no content area.
    pub fn validate(&self) -> Result<(), RenderError> {
        let values = [
            self.width,
            self.height,
            self.margin_top,
            self.margin_bottom,
            self.margin_left,
            self.margin_right,
        ];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(RenderError::Layout(
                "page size and margins must be finite and non-negative".into(),
            ));
        }
        if self.content_width() <= 0.0 || self.content_height() <= 0.0 {
            return Err(RenderError::Layout(format!(
                "margins leave no content area on a {}x{} page",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}

/// Style of one kind of text block.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font size in points
    pub size: f32,
    /// Use the bold face
    pub bold: bool,
    /// Text color
    pub color: Color,
    /// Vertical space after the block
    pub space_after: f32,
    /// Line height as a multiple of the font size
    pub leading: f32,
    /// Left indent
    pub indent: f32,
}

impl TextStyle {
    const fn body(size: f32, space_after: f32) -> Self {
        Self {
            size,
            bold: false,
            color: Color::BLACK,
            space_after,
            leading: 1.25,
            indent: 0.0,
        }
    }

    const fn heading(size: f32, space_after: f32) -> Self {
        Self {
            bold: true,
            ..Self::body(size, space_after)
        }
    }

    /// Height of one line.
    pub fn line_height(&self) -> f32 {
        self.size * self.leading
    }
}

/// Bullet item style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulletStyle {
    /// Text style; `indent` positions the marker
    pub text: TextStyle,
    /// Marker glyph
    pub marker: char,
    /// Distance from the marker to the text (hanging indent)
    pub hang: f32,
}

/// Table style.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableStyle {
    /// Font size for every cell
    pub size: f32,
    /// Line height as a multiple of the font size
    pub leading: f32,
    /// Padding inside each cell
    pub padding: f32,
    /// Header background
    pub header_fill: Color,
    /// Header text color
    pub header_text: Color,
    /// Body background
    pub body_fill: Color,
    /// Body text color
    pub body_text: Color,
    /// Grid line color
    pub grid_color: Color,
    /// Grid line width
    pub grid_width: f32,
    /// Vertical space after the table
    pub space_after: f32,
}

impl TableStyle {
    /// Height of one text line inside a cell.
    pub fn line_height(&self) -> f32 {
        self.size * self.leading
    }
}

/// Fixed styles for every node kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleTable {
    /// Level-1 heading
    pub heading1: TextStyle,
    /// Level-2 heading
    pub heading2: TextStyle,
    /// Paragraph
    pub paragraph: TextStyle,
    /// Bullet item
    pub bullet: BulletStyle,
    /// Table
    pub table: TableStyle,
    /// Page footer
    pub footer: TextStyle,
}

impl StyleTable {
    /// Style for a heading level.
    pub fn heading(&self, level: u8) -> &TextStyle {
        if level <= 1 {
            &self.heading1
        } else {
            &self.heading2
        }
    }

    /// Load a style table from JSON; absent keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, RenderError> {
        let styles: StyleTable = serde_json::from_str(json)
            .map_err(|e| RenderError::Layout(format!("invalid style table: {}", e)))?;
        styles.validate()?;
        Ok(styles)
    }

    /// Reject sizes that cannot be laid out.
    pub fn validate(&self) -> Result<(), RenderError> {
        let text_styles = [
            ("heading1", &self.heading1),
            ("heading2", &self.heading2),
            ("paragraph", &self.paragraph),
            ("bullet", &self.bullet.text),
            ("footer", &self.footer),
        ];
        for (name, style) in text_styles {
            if !(style.size > 0.0 && style.leading > 0.0 && style.space_after >= 0.0) {
                return Err(RenderError::Layout(format!(
                    "style '{}' needs a positive size and leading",
                    name
                )));
            }
        }
        let t = &self.table;
        if !(t.size > 0.0 && t.leading > 0.0 && t.padding >= 0.0 && t.grid_width >= 0.0) {
            return Err(RenderError::Layout(
                "table style needs a positive size and leading".into(),
            ));
        }
        Ok(())
    }
}

impl Default for StyleTable {
    fn default() -> Self {
        Self {
            heading1: TextStyle::heading(16.0, 20.0),
            heading2: TextStyle::heading(14.0, 12.0),
            paragraph: TextStyle::body(12.0, 10.0),
            bullet: BulletStyle {
                text: TextStyle {
                    indent: 10.0,
                    ..TextStyle::body(12.0, 6.0)
                },
                marker: '•',
                hang: 14.0,
            },
            table: TableStyle {
                size: 10.0,
                leading: 1.2,
                padding: 4.0,
                header_fill: Color::SLATE,
                header_text: Color::WHITE,
                body_fill: Color::WHITE,
                body_text: Color::BLACK,
                grid_color: Color::BLACK,
                grid_width: 0.5,
                space_after: 12.0,
            },
            footer: TextStyle {
                color: Color::GREY,
                ..TextStyle::body(9.0, 0.0)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_geometry() {
        let g = PageGeometry::letter();
        assert_eq!(g.content_width(), 468.0);
        assert_eq!(g.content_height(), 648.0);
        assert_eq!(g.top(), 720.0);
        assert!(g.validate().is_ok());
    }

    #[test]
    fn test_margins_too_large() {
        let g = PageGeometry::letter().with_margins(400.0);
        assert!(matches!(g.validate(), Err(RenderError::Layout(_))));
    }

    #[test]
    fn test_style_defaults() {
        let s = StyleTable::default();
        assert_eq!(s.heading(1).size, 16.0);
        assert_eq!(s.heading(2).size, 14.0);
        assert!(s.heading(1).bold);
        assert_eq!(s.table.header_text, Color::WHITE);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn test_style_from_json_partial() {
        let s = StyleTable::from_json(
            r#"{"paragraph": {"size": 11, "bold": false, "color": {"r":0,"g":0,"b":0},
                "space_after": 8, "leading": 1.3, "indent": 0}}"#,
        )
        .unwrap();
        assert_eq!(s.paragraph.size, 11.0);
        assert_eq!(s.heading1.size, 16.0);

        assert!(StyleTable::from_json("{not json").is_err());
    }
}
