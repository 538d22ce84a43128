//! `;`-separated tables shared with the dispatch model tooling.

use crate::{ResultsError, ResultsResult};
use ce_envelope::ParameterSet;
use std::io::{Read, Write};

pub const DELIMITER: u8 = b';';

/// Key column of the sparse parameter table.
pub const BOUNDARY_COLUMN: &str = "boundary";

/// Write `(boundary, parameters)` rows under the dispatch field names.
pub fn write_envelopes_csv<P: ParameterSet>(rows: &[(i32, P)], writer: impl Write) -> ResultsResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);

    wtr.write_record(std::iter::once(BOUNDARY_COLUMN).chain(P::FIELDS.iter().copied()))?;
    for (boundary, params) in rows {
        wtr.write_record(std::iter::once(boundary.to_string()).chain(params.to_row().iter().map(f64::to_string)))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Read a sparse parameter table; column order is free.
pub fn read_envelopes_csv<P: ParameterSet>(reader: impl Read) -> ResultsResult<Vec<(i32, P)>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let key_col = column_index(&headers, BOUNDARY_COLUMN)?;
    let field_cols = P::FIELDS
        .iter()
        .map(|name| column_index(&headers, name))
        .collect::<ResultsResult<Vec<_>>>()?;

    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record?;
        let key = parse::<i32>(&record, key_col, line)?;
        let values = field_cols
            .iter()
            .map(|&col| parse::<f64>(&record, col, line))
            .collect::<ResultsResult<Vec<_>>>()?;
        let params = P::from_row(&values).ok_or_else(|| ResultsError::Format {
            message: format!("row {}: expected {} values", line + 1, P::FIELDS.len()),
        })?;
        rows.push((key, params));
    }
    Ok(rows)
}

/// Write one row per timestep: an index column, then the named columns.
///
/// Every column must have the same length.
pub fn write_timeseries_csv(index_name: &str, columns: &[(String, Vec<f64>)], writer: impl Write) -> ResultsResult<()> {
    let steps = columns.first().map_or(0, |(_, values)| values.len());
    if let Some((name, values)) = columns.iter().find(|(_, v)| v.len() != steps) {
        return Err(ResultsError::Format {
            message: format!("column {name} has {} rows, expected {steps}", values.len()),
        });
    }

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_writer(writer);
    wtr.write_record(std::iter::once(index_name).chain(columns.iter().map(|(name, _)| name.as_str())))?;
    for t in 0..steps {
        wtr.write_record(std::iter::once(t.to_string()).chain(columns.iter().map(|(_, v)| v[t].to_string())))?;
    }

    wtr.flush()?;
    Ok(())
}

/// Read one numeric column from a `;`-separated file with a header row.
pub fn read_series_column(reader: impl Read, column: &str) -> ResultsResult<Vec<f64>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .from_reader(reader);
    let col = column_index(rdr.headers()?, column)?;

    rdr.records()
        .enumerate()
        .map(|(line, record)| parse::<f64>(&record?, col, line))
        .collect()
}

fn column_index(headers: &csv::StringRecord, name: &str) -> ResultsResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| ResultsError::Format {
            message: format!("missing column {name}"),
        })
}

fn parse<T: std::str::FromStr>(record: &csv::StringRecord, col: usize, line: usize) -> ResultsResult<T> {
    let raw = record.get(col).unwrap_or_default().trim();
    raw.parse().map_err(|_| ResultsError::Format {
        message: format!("row {}: cannot parse {raw:?}", line + 1),
    })
}
