//! Layout policies.

use super::{canonical_column, single_line};
use crate::error::RowError;
use crate::model::{DocumentNode, DocumentTree, NormalizedField};

/// Columns rendered as their own section instead of a bullet.
pub const DEFAULT_LONG_TEXT_COLUMNS: &[&str] = &[
    "description",
    "notes",
    "additional_notes",
    "corrective_action",
    "comments",
    "details",
    "remarks",
    "summary",
];

/// A deterministic mapping from fields to document nodes.
///
/// Implementations must be total over arbitrary field sets: unknown columns
/// are rendered generically and absent columns are skipped. Returning an
/// error skips the row; it never aborts a batch.
pub trait LayoutPolicy: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Build the document tree for one row.
    fn compose(&self, fields: &[NormalizedField], row: usize) -> Result<DocumentTree, RowError>;
}

/// Case-insensitive set of long-text column names.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LongTextColumns(Vec<String>);

impl LongTextColumns {
    fn new<S: AsRef<str>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self(
            columns
                .into_iter()
                .map(|c| canonical_column(c.as_ref()))
                .collect(),
        )
    }

    fn contains(&self, column: &str) -> bool {
        let folded = canonical_column(column);
        self.0.iter().any(|c| *c == folded)
    }

    /// Heading + paragraph for each long-text field, in column order.
    fn emit_sections(&self, tree: &mut DocumentTree, fields: &[NormalizedField]) {
        for field in fields.iter().filter(|f| self.contains(&f.column)) {
            tree.push(DocumentNode::heading(2, field.label.clone()));
            tree.push(DocumentNode::paragraph(field.value.clone()));
        }
    }
}

impl Default for LongTextColumns {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_TEXT_COLUMNS.iter())
    }
}

fn bullet(field: &NormalizedField) -> DocumentNode {
    DocumentNode::bullet(single_line(&field.summary_line()))
}

/// The standard report layout.
///
/// ```text
/// # Report for Row {n}
/// ## Data Summary
/// - {label}: {value}        (every field except long-text columns)
/// ## {long-text label}
/// {long-text value}         (one section per long-text column)
/// ```
#[derive(Debug, Clone, Default)]
pub struct SummaryPolicy {
    long_text: LongTextColumns,
}

impl SummaryPolicy {
    /// Create the policy with the default long-text columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the long-text column list.
    pub fn with_long_text_columns<S: AsRef<str>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.long_text = LongTextColumns::new(columns);
        self
    }

    /// Check whether a column is treated as long text.
    pub fn is_long_text(&self, column: &str) -> bool {
        self.long_text.contains(column)
    }

    /// Build the tree; this policy never fails.
    pub fn build(&self, fields: &[NormalizedField], row: usize) -> DocumentTree {
        let mut tree = DocumentTree::new();
        tree.push(DocumentNode::heading(1, format!("Report for Row {}", row)));
        tree.push(DocumentNode::heading(2, "Data Summary"));

        for field in fields.iter().filter(|f| !self.long_text.contains(&f.column)) {
            tree.push(bullet(field));
        }
        self.long_text.emit_sections(&mut tree, fields);
        tree
    }
}

impl LayoutPolicy for SummaryPolicy {
    fn name(&self) -> &str {
        "summary"
    }

    fn compose(&self, fields: &[NormalizedField], row: usize) -> Result<DocumentTree, RowError> {
        Ok(self.build(fields, row))
    }
}

/// Layout with the summary rendered as a two-column grid.
#[derive(Debug, Clone, Default)]
pub struct FieldTablePolicy {
    long_text: LongTextColumns,
}

impl FieldTablePolicy {
    /// Create the policy with the default long-text columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the long-text column list.
    pub fn with_long_text_columns<S: AsRef<str>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.long_text = LongTextColumns::new(columns);
        self
    }
}

impl LayoutPolicy for FieldTablePolicy {
    fn name(&self) -> &str {
        "field-table"
    }

    fn compose(&self, fields: &[NormalizedField], row: usize) -> Result<DocumentTree, RowError> {
        let mut tree = DocumentTree::new();
        tree.push(DocumentNode::heading(1, format!("Report for Row {}", row)));
        tree.push(DocumentNode::heading(2, "Data Summary"));

        let rows: Vec<Vec<String>> = fields
            .iter()
            .filter(|f| !self.long_text.contains(&f.column))
            .map(|f| vec![f.label.clone(), single_line(&f.value)])
            .collect();
        if !rows.is_empty() {
            tree.push(DocumentNode::table(
                vec!["Field".to_string(), "Value".to_string()],
                rows,
            ));
        }
        self.long_text.emit_sections(&mut tree, fields);
        Ok(tree)
    }
}

/// A named group of columns rendered under one heading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldGroup {
    /// Section heading
    pub heading: String,
    /// Member columns, in display order
    pub columns: Vec<String>,
}

impl FieldGroup {
    /// Create a group.
    pub fn new<S: AsRef<str>>(heading: impl Into<String>, columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            heading: heading.into(),
            columns: columns.into_iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }

    fn contains(&self, column: &str) -> bool {
        let folded = canonical_column(column);
        self.columns.iter().any(|c| canonical_column(c) == folded)
    }
}

/// Layout with fields grouped under headings.
///
/// Groups without any present column are omitted. Columns that belong to no
/// group and are not long text go under the "other" heading.
#[derive(Debug, Clone)]
pub struct SectionedPolicy {
    title: String,
    groups: Vec<FieldGroup>,
    other_heading: String,
    long_text: LongTextColumns,
}

impl SectionedPolicy {
    /// Create a policy; `title` may contain `{row}`.
    pub fn new(title: impl Into<String>, groups: Vec<FieldGroup>) -> Self {
        Self {
            title: title.into(),
            groups,
            other_heading: "Other Details".to_string(),
            long_text: LongTextColumns::default(),
        }
    }

    /// Set the heading for ungrouped columns.
    pub fn with_other_heading(mut self, heading: impl Into<String>) -> Self {
        self.other_heading = heading.into();
        self
    }

    /// Replace the long-text column list.
    pub fn with_long_text_columns<S: AsRef<str>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.long_text = LongTextColumns::new(columns);
        self
    }

    /// Food-manufacturing incident report layout.
    pub fn incident_report() -> Self {
        Self::new(
            "Incident Report for Row {row}",
            vec![
                FieldGroup::new(
                    "Incident Details",
                    ["date", "time", "department", "issue_type", "severity", "status"],
                ),
                FieldGroup::new("Affected Product", ["affected_product", "batch_number"]),
                FieldGroup::new(
                    "Reporting Information",
                    ["reported_by", "assigned_to", "resolution_date"],
                ),
            ],
        )
        .with_long_text_columns(["description", "corrective_action", "notes"])
    }

    /// Columns of the incident spreadsheet this layout was built for.
    pub fn incident_columns() -> &'static [&'static str] {
        &[
            "date",
            "time",
            "reported_by",
            "department",
            "issue_type",
            "severity",
            "status",
            "description",
            "affected_product",
            "batch_number",
            "assigned_to",
            "resolution_date",
            "corrective_action",
            "notes",
            "processed",
        ]
    }
}

impl LayoutPolicy for SectionedPolicy {
    fn name(&self) -> &str {
        "sectioned"
    }

    fn compose(&self, fields: &[NormalizedField], row: usize) -> Result<DocumentTree, RowError> {
        let mut tree = DocumentTree::new();
        tree.push(DocumentNode::heading(
            1,
            self.title.replace("{row}", &row.to_string()),
        ));

        for group in &self.groups {
            let members: Vec<&NormalizedField> = group
                .columns
                .iter()
                .filter_map(|c| {
                    let folded = canonical_column(c);
                    fields.iter().find(|f| canonical_column(&f.column) == folded)
                })
                .filter(|f| !self.long_text.contains(&f.column))
                .collect();
            if members.is_empty() {
                continue;
            }
            tree.push(DocumentNode::heading(2, group.heading.clone()));
            tree.nodes.extend(members.into_iter().map(bullet));
        }

        let others: Vec<&NormalizedField> = fields
            .iter()
            .filter(|f| !self.long_text.contains(&f.column))
            .filter(|f| !self.groups.iter().any(|g| g.contains(&f.column)))
            .collect();
        if !others.is_empty() {
            tree.push(DocumentNode::heading(2, self.other_heading.clone()));
            tree.nodes.extend(others.into_iter().map(bullet));
        }

        self.long_text.emit_sections(&mut tree, fields);
        Ok(tree)
    }
}
