//! Delimited-file loading into [`Table`].
//!
//! Every column is read as a string; nothing is parsed as a number, so NDC
//! codes and concept ids keep their leading zeros.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use cwmed_vocab::Table;
use serde::{Deserialize, Serialize};

/// Field layout of one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFormat {
    pub delimiter: char,
    /// Honor `"` quoting. Athena exports are tab-separated and contain bare
    /// quote characters inside concept names, so quoting is off for them.
    pub quoting: bool,
}

impl TableFormat {
    /// Athena `CONCEPT.csv` / `CONCEPT_RELATIONSHIP.csv`: tab-separated, no quoting.
    pub const fn athena() -> Self {
        Self {
            delimiter: '\t',
            quoting: false,
        }
    }

    /// Plain RFC 4180 comma-separated file.
    pub const fn csv() -> Self {
        Self {
            delimiter: ',',
            quoting: true,
        }
    }

    pub fn with_delimiter(self, delimiter: char) -> Self {
        Self { delimiter, ..self }
    }

    pub(crate) fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| anyhow!("delimiter {:?} is not a single ASCII character", self.delimiter))
    }
}

impl Default for TableFormat {
    fn default() -> Self {
        Self::csv()
    }
}

pub fn read_table(path: &Path, format: TableFormat) -> Result<Table> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let table = read_table_from(file, format)
        .with_context(|| format!("failed to read {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.len(),
        "loaded table"
    );
    Ok(table)
}

pub fn read_table_from<R: Read>(reader: R, format: TableFormat) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(format.delimiter_byte()?)
        .quoting(format.quoting)
        .flexible(true)
        .from_reader(reader);

    // The csv reader drops a leading UTF-8 BOM itself.
    let headers = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("malformed record {}", line + 1))?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Table::new(headers, rows))
}
