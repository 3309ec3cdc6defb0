use std::borrow::Cow;

use crate::error::CoreError;
use crate::export::{Cell, ExportTable};

/// Guard text cells against spreadsheet formula injection.
///
/// Spreadsheet apps treat values starting with `=`, `+`, `-`, `@`, TAB or CR
/// as formulas; a leading `'` makes them literal. Numbers are never touched,
/// so negative growth stays numeric.
fn sanitize_field(val: &str) -> Cow<'_, str> {
    if val.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        Cow::Owned(format!("'{val}"))
    } else {
        Cow::Borrowed(val)
    }
}

/// Render `table` as CSV: one header row of column labels, then one row per
/// record. Missing cells are written as empty fields.
pub fn to_csv(table: &ExportTable) -> Result<Vec<u8>, CoreError> {
    let mut wtr =
        ::csv::Writer::from_writer(Vec::with_capacity(table.rows.len().saturating_mul(64)));

    wtr.write_record(table.headers.iter().map(|h| h.label))?;

    for row in &table.rows {
        let fields: Vec<String> = table
            .ordered_cells(row)
            .into_iter()
            .map(|cell| match cell {
                Some(Cell::Text(s)) => sanitize_field(s).into_owned(),
                Some(number) => number.raw(),
                None => String::new(),
            })
            .collect();
        wtr.write_record(&fields)?;
    }

    wtr.into_inner()
        .map_err(|e| CoreError::CsvFlush(e.to_string()))
}
