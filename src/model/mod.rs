//! Data model for the row-to-report pipeline.
//!
//! Every stage consumes one of these types and produces the next one:
//! [`Record`] → [`NormalizedField`] → [`DocumentTree`] → [`RenderedDocument`]
//! → [`ArchiveEntry`]. Nothing is mutated once handed to the next stage.

mod field;
mod node;
mod output;
mod record;

pub use field::NormalizedField;
pub use node::{DocumentNode, DocumentTree};
pub use output::{ArchiveEntry, RenderedDocument};
pub use record::{Record, SourceRow, Value};
