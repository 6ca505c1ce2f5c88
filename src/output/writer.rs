//! Crown table writer trait definition.

use crate::error::Result;
use crate::output::CrownRow;

/// Trait for writing crown tables.
pub trait CrownTableWriter {
    /// Write the table header (if applicable).
    fn write_header(&mut self) -> Result<()>;

    /// Write a single crown row.
    fn write_row(&mut self, row: &CrownRow<'_>) -> Result<()>;

    /// Finalize the output (flush, close, etc.).
    fn finalize(&mut self) -> Result<()>;
}
