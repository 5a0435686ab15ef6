//! Long-format exports of the aggregated table.

use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Float64Array, StringArray, UInt16Array, UInt64Array},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use csv::WriterBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::{
    fs::{self, File},
    io::BufWriter,
    path::Path,
    sync::Arc,
};
use tracing::info;

use crate::process::aggregate::PercentRow;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }
    Ok(())
}

/// Write the rows as CSV with a header line.
pub fn write_long_csv(path: &Path, rows: &[PercentRow]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote csv export");
    Ok(())
}

pub fn long_schema() -> Schema {
    Schema::new(vec![
        Field::new("year", DataType::UInt16, false),
        Field::new("question", DataType::Utf8, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("selected", DataType::UInt64, false),
        Field::new("respondents", DataType::UInt64, false),
        Field::new("percentage", DataType::Float64, false),
    ])
}

/// Write the rows as a single snappy-compressed Parquet file.
pub fn write_long_parquet(path: &Path, rows: &[PercentRow]) -> Result<()> {
    ensure_parent(path)?;
    let schema = Arc::new(long_schema());

    let columns: Vec<ArrayRef> = vec![
        Arc::new(UInt16Array::from_iter_values(rows.iter().map(|r| r.year))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.question.as_str()))),
        Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.category.as_str()))),
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.selected))),
        Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.respondents))),
        Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.percentage))),
    ];
    let batch =
        RecordBatch::try_new(schema.clone(), columns).context("building long table batch")?;

    let tmp = path.with_extension("parquet.tmp");
    let file = File::create(&tmp).with_context(|| format!("creating {}", tmp.display()))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), schema, Some(props))
        .context("creating Arrow writer for long table")?;
    writer.write(&batch).context("writing long table batch")?;
    writer.close().context("closing long table writer")?;
    fs::rename(&tmp, path).with_context(|| format!("moving export to {}", path.display()))?;

    info!(path = %path.display(), rows = rows.len(), "wrote parquet export");
    Ok(())
}
