//! Abstract document tree shared by the composer and every renderer.

use serde::{Deserialize, Serialize};

/// One layout node.
///
/// Renderers match on this exhaustively, so a new node kind cannot be
/// silently ignored by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentNode {
    /// Section heading (level 1 or 2)
    Heading {
        /// Heading level, 1 = title
        level: u8,
        /// Heading text
        text: String,
    },

    /// Free text; embedded newlines are hard line breaks
    Paragraph {
        /// Paragraph text
        text: String,
    },

    /// Single-line bullet item
    BulletItem {
        /// Item text (never contains a newline)
        text: String,
    },

    /// Grid with one header row
    Table {
        /// Header cells
        header: Vec<String>,
        /// Body rows
        rows: Vec<Vec<String>>,
    },
}

impl DocumentNode {
    /// Create a heading, clamping the level to 1..=2.
    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        DocumentNode::Heading {
            level: level.clamp(1, 2),
            text: text.into(),
        }
    }

    /// Create a paragraph.
    pub fn paragraph(text: impl Into<String>) -> Self {
        DocumentNode::Paragraph { text: text.into() }
    }

    /// Create a bullet item.
    pub fn bullet(text: impl Into<String>) -> Self {
        DocumentNode::BulletItem { text: text.into() }
    }

    /// Create a table.
    pub fn table(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        DocumentNode::Table { header, rows }
    }

    /// Check if this node is a heading.
    pub fn is_heading(&self) -> bool {
        matches!(self, DocumentNode::Heading { .. })
    }

    /// Get plain text content of the node.
    pub fn plain_text(&self) -> String {
        match self {
            DocumentNode::Heading { text, .. }
            | DocumentNode::Paragraph { text }
            | DocumentNode::BulletItem { text } => text.clone(),
            DocumentNode::Table { header, rows } => std::iter::once(header)
                .chain(rows.iter())
                .map(|r| r.join("\t"))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

/// Ordered sequence of nodes; the composer's output and the renderer's input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTree {
    /// Nodes in reading order
    pub nodes: Vec<DocumentNode>,
}

impl DocumentTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Append a node.
    pub fn push(&mut self, node: DocumentNode) {
        self.nodes.push(node);
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate nodes in order.
    pub fn iter(&self) -> std::slice::Iter<'_, DocumentNode> {
        self.nodes.iter()
    }

    /// Text of the first level-1 heading, used as the document title.
    pub fn title(&self) -> Option<&str> {
        self.nodes.iter().find_map(|n| match n {
            DocumentNode::Heading { level: 1, text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Get plain text content of the whole tree.
    pub fn plain_text(&self) -> String {
        self.nodes
            .iter()
            .map(|n| n.plain_text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl From<Vec<DocumentNode>> for DocumentTree {
    fn from(nodes: Vec<DocumentNode>) -> Self {
        Self { nodes }
    }
}

impl<'a> IntoIterator for &'a DocumentTree {
    type Item = &'a DocumentNode;
    type IntoIter = std::slice::Iter<'a, DocumentNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_clamped() {
        assert_eq!(
            DocumentNode::heading(5, "x"),
            DocumentNode::Heading {
                level: 2,
                text: "x".to_string()
            }
        );
    }

    #[test]
    fn test_tree_title() {
        let tree = DocumentTree::from(vec![
            DocumentNode::heading(2, "Data Summary"),
            DocumentNode::heading(1, "Report for Row 4"),
        ]);
        assert_eq!(tree.title(), Some("Report for Row 4"));
        assert_eq!(DocumentTree::new().title(), None);
    }

    #[test]
    fn test_table_plain_text() {
        let node = DocumentNode::table(
            vec!["Field".into(), "Value".into()],
            vec![vec!["Name".into(), "Ann".into()]],
        );
        assert_eq!(node.plain_text(), "Field\tValue\nName\tAnn");
    }
}
