//! Line breaking and pagination.
//!
//! The layout pass turns a [`DocumentTree`] into pages of positioned draw
//! operations. It knows nothing about the output format; the PDF writer
//! only serializes what it receives.
//!
//! Coordinates are PDF user space: the origin is the bottom-left corner and
//! the cursor moves down from the top margin.

use std::mem;

use super::font::{sanitize, Font};
use super::style::{Color, PageGeometry, StyleTable, TextStyle};
use super::{RenderOptions, RenderStats};
use crate::error::RenderError;
use crate::model::{DocumentNode, DocumentTree};

const EPSILON: f32 = 0.001;

/// One positioned drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// A single line of text at a baseline position.
    Text {
        /// Left edge
        x: f32,
        /// Baseline
        y: f32,
        /// Face
        font: Font,
        /// Size in points
        size: f32,
        /// Fill color
        color: Color,
        /// Sanitized text without line breaks
        text: String,
    },

    /// A rectangle, optionally filled and/or stroked.
    Rect {
        /// Left edge
        x: f32,
        /// Bottom edge
        y: f32,
        /// Width
        width: f32,
        /// Height
        height: f32,
        /// Fill color
        fill: Option<Color>,
        /// Stroke color and line width
        stroke: Option<(Color, f32)>,
    },
}

/// Draw operations for one page, in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    /// Operations in paint order
    pub ops: Vec<DrawOp>,
}

impl PageLayout {
    /// Text of every text operation, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            DrawOp::Rect { .. } => None,
        })
    }
}

/// A fully paginated document.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    /// Pages in order; never empty
    pub pages: Vec<PageLayout>,
    /// Layout statistics
    pub stats: RenderStats,
}

/// Lay out a tree according to the options.
pub fn layout(tree: &DocumentTree, options: &RenderOptions) -> Result<Layout, RenderError> {
    options.validate()?;
    let mut paginator = Paginator::new(&options.geometry, &options.styles);

    for (i, node) in tree.nodes.iter().enumerate() {
        let next = tree.nodes.get(i + 1);
        match node {
            DocumentNode::Heading { level, text } => paginator.heading(*level, text, next)?,
            DocumentNode::Paragraph { text } => paginator.paragraph(text)?,
            DocumentNode::BulletItem { text } => paginator.bullet(text)?,
            DocumentNode::Table { header, rows } => paginator.table(header, rows)?,
        }
    }

    let (mut pages, mut stats) = paginator.finish();
    if options.page_numbers {
        add_footers(&mut pages, &options.geometry, &options.styles.footer);
    }
    stats.page_count = pages.len() as u32;
    Ok(Layout { pages, stats })
}

/// Greedy word wrap of one hard line.
///
/// Words wider than `width` are broken between characters. Fails only when
/// a single character is wider than `width`.
pub fn wrap(text: &str, font: Font, size: f32, width: f32) -> Result<Vec<String>, RenderError> {
    let space = font.char_width(' ', size);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut used = 0.0f32;

    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let word_width = font.text_width(word, size);
        let needed = if line.is_empty() {
            word_width
        } else {
            used + space + word_width
        };
        if needed <= width + EPSILON {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
            used = needed;
            continue;
        }

        if !line.is_empty() {
            lines.push(mem::take(&mut line));
            used = 0.0;
        }
        if word_width <= width + EPSILON {
            line.push_str(word);
            used = word_width;
            continue;
        }

        for ch in word.chars() {
            let w = font.char_width(ch, size);
            if w > width + EPSILON {
                return Err(RenderError::UnitTooWide {
                    ch,
                    width: w,
                    available: width,
                });
            }
            if used + w > width + EPSILON {
                lines.push(mem::take(&mut line));
                used = 0.0;
            }
            line.push(ch);
            used += w;
        }
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    Ok(lines)
}

/// Sanitize text and unify line endings to `\n`.
fn prepare(text: &str) -> String {
    sanitize(&text.replace("\r\n", "\n").replace('\r', "\n"))
}

/// Wrap text that may contain hard line breaks.
fn wrap_block(text: &str, font: Font, size: f32, width: f32) -> Result<Vec<String>, RenderError> {
    let mut lines = Vec::new();
    for hard_line in text.split('\n') {
        lines.extend(wrap(hard_line, font, size, width)?);
    }
    Ok(lines)
}

struct Paginator<'a> {
    geometry: &'a PageGeometry,
    styles: &'a StyleTable,
    done: Vec<PageLayout>,
    page: PageLayout,
    cursor: f32,
    stats: RenderStats,
}

impl<'a> Paginator<'a> {
    fn new(geometry: &'a PageGeometry, styles: &'a StyleTable) -> Self {
        Self {
            geometry,
            styles,
            done: Vec::new(),
            page: PageLayout::default(),
            cursor: geometry.top(),
            stats: RenderStats::new(),
        }
    }

    fn finish(mut self) -> (Vec<PageLayout>, RenderStats) {
        self.done.push(self.page);
        (self.done, self.stats)
    }

    fn remaining(&self) -> f32 {
        self.cursor - self.geometry.bottom()
    }

    fn at_page_top(&self) -> bool {
        (self.geometry.top() - self.cursor).abs() < EPSILON
    }

    fn new_page(&mut self) {
        self.done.push(mem::take(&mut self.page));
        self.cursor = self.geometry.top();
        log::debug!("page break before page {}", self.done.len() + 1);
    }

    /// Start a new page unless `height` fits in the remaining space.
    fn ensure(&mut self, height: f32) {
        if height > self.remaining() + EPSILON && !self.at_page_top() {
            self.new_page();
        }
    }

    fn space_after(&mut self, amount: f32) {
        self.cursor = (self.cursor - amount).max(self.geometry.bottom());
    }

    fn push_text(&mut self, x: f32, baseline: f32, font: Font, style: &TextStyle, text: &str) {
        if text.is_empty() {
            return;
        }
        self.page.ops.push(DrawOp::Text {
            x,
            y: baseline,
            font,
            size: style.size,
            color: style.color,
            text: text.to_string(),
        });
    }

    /// Place wrapped lines, breaking pages between lines as needed.
    fn flow_lines(&mut self, lines: &[String], x: f32, font: Font, style: &TextStyle) {
        let line_height = style.line_height();
        for line in lines {
            if line_height > self.remaining() + EPSILON && !self.at_page_top() {
                self.new_page();
            }
            let baseline = self.cursor - style.size;
            self.push_text(x, baseline, font, style, line);
            self.cursor -= line_height;
            self.stats.line_count += 1;
        }
    }

    /// Height of the first line of a node, for keep-with-next.
    fn first_line_height(&self, node: Option<&DocumentNode>) -> f32 {
        match node {
            None => 0.0,
            Some(DocumentNode::Heading { level, .. }) => self.styles.heading(*level).line_height(),
            Some(DocumentNode::Paragraph { .. }) => self.styles.paragraph.line_height(),
            Some(DocumentNode::BulletItem { .. }) => self.styles.bullet.text.line_height(),
            Some(DocumentNode::Table { .. }) => {
                let table = &self.styles.table;
                2.0 * (table.line_height() + 2.0 * table.padding)
            }
        }
    }

    fn heading(
        &mut self,
        level: u8,
        text: &str,
        next: Option<&DocumentNode>,
    ) -> Result<(), RenderError> {
        let style = *self.styles.heading(level);
        let font = Font::for_weight(style.bold);
        let width = self.geometry.content_width() - style.indent;
        let lines = wrap(&prepare(text).replace('\n', " "), font, style.size, width)?;

        let own = lines.len() as f32 * style.line_height();
        let with_next = own + style.space_after + self.first_line_height(next);
        if with_next <= self.geometry.content_height() {
            self.ensure(with_next);
        } else {
            self.ensure(own.min(self.geometry.content_height()));
        }

        let x = self.geometry.margin_left + style.indent;
        self.flow_lines(&lines, x, font, &style);
        self.space_after(style.space_after);
        self.stats.heading_count += 1;
        Ok(())
    }

    fn paragraph(&mut self, text: &str) -> Result<(), RenderError> {
        let style = self.styles.paragraph;
        let font = Font::for_weight(style.bold);
        let width = self.geometry.content_width() - style.indent;
        let lines = wrap_block(&prepare(text), font, style.size, width)?;

        let x = self.geometry.margin_left + style.indent;
        self.flow_lines(&lines, x, font, &style);
        self.space_after(style.space_after);
        self.stats.paragraph_count += 1;
        Ok(())
    }

    fn bullet(&mut self, text: &str) -> Result<(), RenderError> {
        let bullet = self.styles.bullet.clone();
        let style = bullet.text;
        let font = Font::for_weight(style.bold);
        let marker_x = self.geometry.margin_left + style.indent;
        let text_x = marker_x + bullet.hang;
        let width = self.geometry.content_width() - style.indent - bullet.hang;
        let lines = wrap(&prepare(text).replace('\n', " "), font, style.size, width)?;

        let height = lines.len() as f32 * style.line_height();
        if height <= self.geometry.content_height() {
            self.ensure(height);
        } else {
            log::debug!(
                "bullet of {} lines is taller than a page; splitting by line",
                lines.len()
            );
        }

        if let Some((first, rest)) = lines.split_first() {
            self.ensure(style.line_height());
            let baseline = self.cursor - style.size;
            self.push_text(marker_x, baseline, font, &style, &bullet.marker.to_string());
            self.flow_lines(std::slice::from_ref(first), text_x, font, &style);
            self.flow_lines(rest, text_x, font, &style);
        }
        self.space_after(style.space_after);
        self.stats.bullet_count += 1;
        Ok(())
    }

    fn table(&mut self, header: &[String], rows: &[Vec<String>]) -> Result<(), RenderError> {
        let columns = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);
        if columns == 0 {
            return Ok(());
        }

        let table = self.styles.table;
        let content_height = self.geometry.content_height();
        let widths = self.column_widths(columns, header, rows);

        let header_row = if header.is_empty() {
            None
        } else {
            Some(self.table_row(header, &widths, Font::Bold)?)
        };
        let header_height = header_row.as_ref().map(|r| r.height).unwrap_or(0.0);
        if header_height > content_height + EPSILON {
            return Err(RenderError::RowTooTall {
                height: header_height,
                available: content_height,
            });
        }

        let mut body = Vec::with_capacity(rows.len());
        for row in rows {
            let laid = self.table_row(row, &widths, Font::Regular)?;
            if header_height + laid.height > content_height + EPSILON {
                return Err(RenderError::RowTooTall {
                    height: laid.height,
                    available: content_height - header_height,
                });
            }
            body.push(laid);
        }

        // keep the header with the first body row
        let first = body.first().map(|r| r.height).unwrap_or(0.0);
        self.ensure(header_height + first);
        if let Some(ref h) = header_row {
            self.draw_row(h, &widths, Font::Bold, table.header_fill, table.header_text);
        }

        for row in &body {
            if row.height > self.remaining() + EPSILON {
                self.new_page();
                if let Some(ref h) = header_row {
                    self.draw_row(h, &widths, Font::Bold, table.header_fill, table.header_text);
                }
            }
            self.draw_row(row, &widths, Font::Regular, table.body_fill, table.body_text);
            self.stats.table_row_count += 1;
        }

        self.space_after(table.space_after);
        self.stats.table_count += 1;
        Ok(())
    }

    /// Fixed column widths filling the content width.
    ///
    /// Each column is weighted by its widest line, clamped between half an
    /// equal share and the full content width.
    fn column_widths(&self, columns: usize, header: &[String], rows: &[Vec<String>]) -> Vec<f32> {
        let table = &self.styles.table;
        let total = self.geometry.content_width();
        let floor = total / (2.0 * columns as f32);

        let measure = |cell: &str, font: Font| -> f32 {
            prepare(cell)
                .split('\n')
                .map(|line| font.text_width(line, table.size))
                .fold(0.0, f32::max)
                + 2.0 * table.padding
        };

        let mut natural = vec![0.0f32; columns];
        for (i, cell) in header.iter().enumerate() {
            natural[i] = natural[i].max(measure(cell, Font::Bold));
        }
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                natural[i] = natural[i].max(measure(cell, Font::Regular));
            }
        }

        let weights: Vec<f32> = natural.iter().map(|w| w.clamp(floor, total)).collect();
        let sum: f32 = weights.iter().sum();
        weights.iter().map(|w| w * total / sum).collect()
    }

    fn table_row(
        &self,
        cells: &[String],
        widths: &[f32],
        font: Font,
    ) -> Result<TableRowLayout, RenderError> {
        let table = &self.styles.table;
        let mut wrapped = Vec::with_capacity(widths.len());
        for (i, width) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let inner = width - 2.0 * table.padding;
            wrapped.push(wrap_block(&prepare(cell), font, table.size, inner)?);
        }
        let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
        Ok(TableRowLayout {
            height: lines as f32 * table.line_height() + 2.0 * table.padding,
            cells: wrapped,
        })
    }

    fn draw_row(
        &mut self,
        row: &TableRowLayout,
        widths: &[f32],
        font: Font,
        fill: Color,
        text_color: Color,
    ) {
        let table = self.styles.table;
        let stroke = (table.grid_width > 0.0).then_some((table.grid_color, table.grid_width));
        let top = self.cursor;
        let mut x = self.geometry.margin_left;

        for (lines, width) in row.cells.iter().zip(widths) {
            self.page.ops.push(DrawOp::Rect {
                x,
                y: top - row.height,
                width: *width,
                height: row.height,
                fill: Some(fill),
                stroke,
            });
            for (i, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let baseline =
                    top - table.padding - table.size - i as f32 * table.line_height();
                self.page.ops.push(DrawOp::Text {
                    x: x + table.padding,
                    y: baseline,
                    font,
                    size: table.size,
                    color: text_color,
                    text: line.clone(),
                });
                self.stats.line_count += 1;
            }
            x += width;
        }
        self.cursor -= row.height;
    }
}

struct TableRowLayout {
    height: f32,
    cells: Vec<Vec<String>>,
}

fn add_footers(pages: &mut [PageLayout], geometry: &PageGeometry, style: &TextStyle) {
    let total = pages.len();
    let font = Font::for_weight(style.bold);
    let baseline = (geometry.margin_bottom / 2.0 - style.size / 3.0).max(2.0);

    for (i, page) in pages.iter_mut().enumerate() {
        let text = format!("Page {} of {}", i + 1, total);
        let x = (geometry.width - font.text_width(&text, style.size)) / 2.0;
        page.ops.push(DrawOp::Text {
            x,
            y: baseline,
            font,
            size: style.size,
            color: style.color,
            text,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> RenderOptions {
        RenderOptions::new().with_page_numbers(false)
    }

    fn scenario_tree() -> DocumentTree {
        DocumentTree::from(vec![
            DocumentNode::heading(1, "Report for Row 1"),
            DocumentNode::heading(2, "Data Summary"),
            DocumentNode::bullet("Name: John Doe"),
            DocumentNode::bullet("Age: 30"),
            DocumentNode::bullet("Department: IT"),
        ])
    }

    fn is_bold_text(op: &DrawOp, size: f32) -> bool {
        matches!(op, DrawOp::Text { font: Font::Bold, size: s, .. } if *s == size)
    }

    #[test]
    fn test_wrap_words() {
        let lines = wrap("aaa bbb ccc", Font::Regular, 10.0, 40.0).unwrap();
        // "aaa" = 16.68pt, "aaa bbb" = 36.14pt, "aaa bbb ccc" > 40pt
        assert_eq!(lines, vec!["aaa bbb", "ccc"]);
        assert_eq!(wrap("", Font::Regular, 10.0, 40.0).unwrap(), vec![""]);
    }

    #[test]
    fn test_wrap_breaks_long_word() {
        let word = "x".repeat(40);
        let lines = wrap(&word, Font::Regular, 10.0, 50.0).unwrap();
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
        for line in &lines {
            assert!(Font::Regular.text_width(line, 10.0) <= 50.0 + EPSILON);
        }
    }

    #[test]
    fn test_wrap_unit_too_wide() {
        let err = wrap("W", Font::Regular, 12.0, 5.0).unwrap_err();
        assert!(matches!(err, RenderError::UnitTooWide { ch: 'W', .. }));
    }

    #[test]
    fn test_scenario_single_page() {
        let layout = layout(&scenario_tree(), &options()).unwrap();
        assert_eq!(layout.pages.len(), 1);
        let texts: Vec<_> = layout.pages[0].texts().collect();
        assert_eq!(
            texts,
            vec![
                "Report for Row 1",
                "Data Summary",
                "•",
                "Name: John Doe",
                "•",
                "Age: 30",
                "•",
                "Department: IT",
            ]
        );
        assert_eq!(layout.stats.bullet_count, 3);
        assert_eq!(layout.stats.heading_count, 2);
    }

    #[test]
    fn test_empty_tree_has_one_page() {
        let layout = layout(&DocumentTree::new(), &RenderOptions::new()).unwrap();
        assert_eq!(layout.pages.len(), 1);
        assert_eq!(layout.pages[0].texts().collect::<Vec<_>>(), vec!["Page 1 of 1"]);
    }

    #[test]
    fn test_long_paragraph_paginates_without_loss() {
        let text = (0..3000).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ");
        let tree = DocumentTree::from(vec![DocumentNode::paragraph(text.clone())]);
        let layout = layout(&tree, &options()).unwrap();
        assert!(layout.pages.len() > 1);

        let placed: Vec<&str> = layout
            .pages
            .iter()
            .flat_map(|p| p.texts())
            .flat_map(|t| t.split(' '))
            .collect();
        let expected: Vec<&str> = text.split(' ').collect();
        assert_eq!(placed, expected);
    }

    #[test]
    fn test_paragraph_keeps_hard_breaks() {
        let tree = DocumentTree::from(vec![DocumentNode::paragraph("first line\nsecond line")]);
        let layout = layout(&tree, &options()).unwrap();
        let texts: Vec<_> = layout.pages[0].texts().collect();
        assert_eq!(texts, vec!["first line", "second line"]);
    }

    #[test]
    fn test_heading_never_ends_a_page() {
        let mut nodes = Vec::new();
        for i in 0..120 {
            nodes.push(DocumentNode::heading(2, format!("Section {}", i)));
            nodes.push(DocumentNode::bullet(format!("item {}", i)));
        }
        let layout = layout(&DocumentTree::from(nodes), &options()).unwrap();
        assert!(layout.pages.len() > 1);
        for page in &layout.pages {
            let last = page.ops.iter().rev().find(|op| matches!(op, DrawOp::Text { .. }));
            assert!(!is_bold_text(last.unwrap(), 14.0));
        }
    }

    #[test]
    fn test_bullets_are_not_split() {
        let long = "lorem ipsum dolor sit amet ".repeat(12);
        let nodes: Vec<_> = (0..60).map(|_| DocumentNode::bullet(long.clone())).collect();
        let layout = layout(&DocumentTree::from(nodes), &options()).unwrap();
        assert!(layout.pages.len() > 1);
        for page in &layout.pages {
            assert_eq!(page.texts().next(), Some("•"));
        }
    }

    #[test]
    fn test_table_header_repeats() {
        let rows: Vec<Vec<String>> = (0..150)
            .map(|i| vec![format!("Field {}", i), format!("value {}", i)])
            .collect();
        let tree = DocumentTree::from(vec![DocumentNode::table(
            vec!["Field".into(), "Value".into()],
            rows,
        )]);
        let layout = layout(&tree, &options()).unwrap();
        assert!(layout.pages.len() > 1);
        assert_eq!(layout.stats.table_row_count, 150);

        for page in &layout.pages {
            let texts: Vec<_> = page.texts().take(2).collect();
            assert_eq!(texts, vec!["Field", "Value"]);
            assert!(page.ops.iter().any(|op| matches!(
                op,
                DrawOp::Rect { fill: Some(c), stroke: Some(_), .. } if *c == Color::SLATE
            )));
        }
    }

    #[test]
    fn test_table_row_too_tall() {
        let huge = "tall ".repeat(20_000);
        let tree = DocumentTree::from(vec![DocumentNode::table(
            vec!["Field".into(), "Value".into()],
            vec![vec!["Notes".into(), huge]],
        )]);
        assert!(matches!(
            layout(&tree, &options()),
            Err(RenderError::RowTooTall { .. })
        ));
    }

    #[test]
    fn test_narrow_page_unit_too_wide() {
        let geometry = PageGeometry {
            width: 100.0,
            margin_left: 47.5,
            margin_right: 47.5,
            ..PageGeometry::letter()
        };
        let tree = DocumentTree::from(vec![DocumentNode::paragraph("W")]);
        let result = layout(&tree, &options().with_geometry(geometry));
        assert!(matches!(result, Err(RenderError::UnitTooWide { .. })));
    }

    #[test]
    fn test_footer_numbers() {
        let text = "word ".repeat(2000);
        let tree = DocumentTree::from(vec![DocumentNode::paragraph(text)]);
        let layout = layout(&tree, &RenderOptions::new()).unwrap();
        let n = layout.pages.len();
        let last = layout.pages[n - 1].texts().last().unwrap();
        assert_eq!(last, format!("Page {} of {}", n, n));
    }
}
