//! Crosswalk export and reload.
//!
//! Header: `{sv}, {sv}_label, {sv}_omop_id, {tv}, {tv}_label, {tv}_omop_id`.
//! Null fields are written as empty cells and read back as null, so an
//! exported crosswalk reloads field-for-field.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use cwmed_vocab::{CrosswalkHeader, CrosswalkResolver, CrosswalkRow};

use crate::table_io::{read_table_from, TableFormat};

pub fn write_crosswalk<'a>(
    path: &Path,
    header: &CrosswalkHeader,
    rows: impl IntoIterator<Item = &'a CrosswalkRow>,
    format: TableFormat,
) -> Result<usize> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let written = write_crosswalk_to(file, header, rows, format)
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), rows = written, "wrote crosswalk");
    Ok(written)
}

pub fn write_crosswalk_to<'a, W: Write>(
    writer: W,
    header: &CrosswalkHeader,
    rows: impl IntoIterator<Item = &'a CrosswalkRow>,
    format: TableFormat,
) -> Result<usize> {
    let quote_style = if format.quoting {
        csv::QuoteStyle::Necessary
    } else {
        csv::QuoteStyle::Never
    };
    let mut writer = csv::WriterBuilder::new()
        .delimiter(format.delimiter_byte()?)
        .quote_style(quote_style)
        .from_writer(writer);

    writer.write_record(header.columns())?;
    let mut written = 0usize;
    for row in rows {
        writer.write_record(row.fields().map(|f| f.unwrap_or("")))?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Save the whole crosswalk.
pub fn save_crosswalk(resolver: &CrosswalkResolver, path: &Path) -> Result<usize> {
    write_crosswalk(path, &resolver.header(), resolver.rows(), TableFormat::csv())
}

/// Save only the rows with a null target concept id.
pub fn save_failed_mappings(resolver: &CrosswalkResolver, path: &Path) -> Result<usize> {
    write_crosswalk(
        path,
        &resolver.header(),
        resolver.failed_rows(),
        TableFormat::csv(),
    )
}

pub fn read_crosswalk(path: &Path, format: TableFormat) -> Result<(CrosswalkHeader, Vec<CrosswalkRow>)> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    read_crosswalk_from(file, format).with_context(|| format!("failed to read {}", path.display()))
}

pub fn read_crosswalk_from<R: Read>(
    reader: R,
    format: TableFormat,
) -> Result<(CrosswalkHeader, Vec<CrosswalkRow>)> {
    let table = read_table_from(reader, format)?;
    if table.headers.len() != 6 {
        bail!(
            "expected 6 crosswalk columns, found {}: {:?}",
            table.headers.len(),
            table.headers
        );
    }

    let header = CrosswalkHeader::new(&table.headers[0], &table.headers[3]);
    if header.columns().as_slice() != table.headers.as_slice() {
        bail!("unexpected crosswalk header {:?}", table.headers);
    }

    let rows = table
        .rows
        .iter()
        .map(|row| {
            CrosswalkRow::from_fields(std::array::from_fn(|i| {
                row.get(i).filter(|v| !v.is_empty()).cloned()
            }))
        })
        .collect();

    Ok((header, rows))
}
