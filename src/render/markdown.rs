//! Markdown rendering for document trees.
//!
//! A second backend over the same [`DocumentTree`] the PDF writer consumes;
//! used for previews.

use crate::model::{DocumentNode, DocumentTree};

use super::RenderStats;

/// Options for Markdown output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Character to use for unordered list markers
    pub list_marker: char,

    /// Escape special Markdown characters
    pub escape_special_chars: bool,

    /// Keep paragraph line breaks as hard breaks (`"  \n"`)
    pub preserve_line_breaks: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            list_marker: '-',
            escape_special_chars: true,
            preserve_line_breaks: true,
        }
    }
}

/// Convert a tree to Markdown with default options.
pub fn to_markdown(tree: &DocumentTree) -> String {
    MarkdownRenderer::new(MarkdownOptions::default()).render(tree)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: MarkdownOptions,
    stats: RenderStats,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: MarkdownOptions) -> Self {
        Self {
            options,
            stats: RenderStats::new(),
        }
    }

    /// Render a tree to Markdown.
    pub fn render(mut self, tree: &DocumentTree) -> String {
        self.render_internal(tree)
    }

    /// Render a tree and return node counts.
    pub fn render_with_stats(mut self, tree: &DocumentTree) -> (String, RenderStats) {
        let content = self.render_internal(tree);
        (content, self.stats)
    }

    fn render_internal(&mut self, tree: &DocumentTree) -> String {
        let mut output = String::new();
        let mut in_list = false;

        for node in tree {
            let is_bullet = matches!(node, DocumentNode::BulletItem { .. });
            if in_list && !is_bullet {
                output.push('\n');
            }
            in_list = is_bullet;
            self.render_node(&mut output, node);
        }

        output.trim_end().to_string()
    }

    fn render_node(&mut self, output: &mut String, node: &DocumentNode) {
        match node {
            DocumentNode::Heading { level, text } => {
                self.stats.heading_count += 1;
                output.push_str(&"#".repeat(*level as usize));
                output.push(' ');
                output.push_str(&self.escape(&text.replace('\n', " ")));
                output.push_str("\n\n");
            }
            DocumentNode::Paragraph { text } => {
                self.stats.paragraph_count += 1;
                let separator = if self.options.preserve_line_breaks {
                    "  \n"
                } else {
                    " "
                };
                let lines: Vec<String> = text.lines().map(|l| self.escape(l)).collect();
                output.push_str(&lines.join(separator));
                output.push_str("\n\n");
            }
            DocumentNode::BulletItem { text } => {
                self.stats.bullet_count += 1;
                output.push(self.options.list_marker);
                output.push(' ');
                output.push_str(&self.escape(&text.replace('\n', " ")));
                output.push('\n');
            }
            DocumentNode::Table { header, rows } => {
                self.stats.table_count += 1;
                self.render_table(output, header, rows);
            }
        }
    }

    fn render_table(&mut self, output: &mut String, header: &[String], rows: &[Vec<String>]) {
        let col_count = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);
        if col_count == 0 {
            return;
        }

        self.render_table_row(output, header, col_count);
        output.push('|');
        for _ in 0..col_count {
            output.push_str(" --- |");
        }
        output.push('\n');

        for row in rows {
            self.stats.table_row_count += 1;
            self.render_table_row(output, row, col_count);
        }
        output.push('\n');
    }

    fn render_table_row(&self, output: &mut String, cells: &[String], col_count: usize) {
        output.push('|');
        for i in 0..col_count {
            let content = cells
                .get(i)
                .map(|c| c.replace('\n', " "))
                .unwrap_or_default();
            output.push_str(&format!(" {} |", self.escape(content.trim())));
        }
        output.push('\n');
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_special_chars {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

/// Escape special Markdown characters.
/// Only characters that could be misread as inline syntax are escaped.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_markdown() {
        assert_eq!(escape_markdown("Hello *world*"), "Hello \\*world\\*");
        assert_eq!(escape_markdown("a|b"), "a\\|b");
    }

    #[test]
    fn test_render_summary_tree() {
        let tree = DocumentTree::from(vec![
            DocumentNode::heading(1, "Report for Row 1"),
            DocumentNode::heading(2, "Data Summary"),
            DocumentNode::bullet("Name: John Doe"),
            DocumentNode::bullet("Age: 30"),
            DocumentNode::heading(2, "Notes"),
            DocumentNode::paragraph("first\nsecond"),
        ]);
        assert_eq!(
            to_markdown(&tree),
            "# Report for Row 1\n\n## Data Summary\n\n- Name: John Doe\n- Age: 30\n\n## Notes\n\nfirst  \nsecond"
        );
    }

    #[test]
    fn test_render_table() {
        let tree = DocumentTree::from(vec![DocumentNode::table(
            vec!["Field".into(), "Value".into()],
            vec![vec!["Ratio".into(), "1|2".into()], vec!["Only".into()]],
        )]);
        let (md, stats) = MarkdownRenderer::new(MarkdownOptions::default()).render_with_stats(&tree);
        assert_eq!(
            md,
            "| Field | Value |\n| --- | --- |\n| Ratio | 1\\|2 |\n| Only |  |"
        );
        assert_eq!(stats.table_row_count, 2);
    }
}
