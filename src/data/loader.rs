use std::path::Path;

use anyhow::{Context, Result};

use super::model::{CrashRecord, CrashTable, REQUIRED_COLUMNS};
use crate::error::CrashDataError;

/// Rows echoed to the debug log after a load.
const HEAD_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the crash table from a CSV file.
///
/// Layout: a header row with the required column names, one crash bucket per
/// row. Columns other than the required ones are ignored; empty cells are
/// nulls.
pub fn load_file(path: &Path) -> Result<CrashTable> {
    let table = load_csv(path).with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} rows from {} with columns {:?}",
        table.len(),
        path.display(),
        table.column_names
    );
    for record in table.records.iter().take(HEAD_ROWS) {
        log::debug!("{record:?}");
    }
    Ok(table)
}

/// Fail with [`CrashDataError::MissingColumn`] for the first required column
/// absent from `headers`.
fn check_required_columns(headers: &[String]) -> Result<(), CrashDataError> {
    match REQUIRED_COLUMNS
        .iter()
        .find(|required| !headers.iter().any(|h| h == *required))
    {
        Some(missing) => Err(CrashDataError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<CrashTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    check_required_columns(&headers)?;

    let records = reader
        .deserialize::<CrashRecord>()
        .enumerate()
        .map(|(row_no, result)| result.with_context(|| format!("CSV row {row_no}")))
        .collect::<Result<Vec<_>>>()?;

    Ok(CrashTable::new(records, headers))
}
