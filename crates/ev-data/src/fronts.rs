use std::path::Path;

use csv::{ReaderBuilder, Trim, WriterBuilder};
use ev_types::{DataError, EvResult, Front};

/// Read a front file: one point per row, comma separated objective values.
pub fn read_front<P: AsRef<Path>>(file_path: P) -> EvResult<Front> {
    let path = file_path.as_ref();
    tracing::info!("Loading front from: {}", path.display());

    if !path.exists() {
        return Err(DataError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let rows = read_matrix(path)?;
    let front = Front::new(rows)?;

    tracing::info!(
        "Loaded {} points with {} objectives from {}",
        front.len(),
        front.number_of_objectives(),
        path.display()
    );
    Ok(front)
}

/// Read a headerless numeric CSV matrix. Blank lines are skipped.
pub fn read_matrix<P: AsRef<Path>>(file_path: P) -> EvResult<Vec<Vec<f64>>> {
    let path = file_path.as_ref();
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_path(path)
        .map_err(|e| DataError::LoadingFailed {
            message: format!("Failed to open CSV file {}: {}", path.display(), e),
        })?;

    let mut rows = Vec::new();
    for (line_num, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| DataError::LoadingFailed {
            message: format!("Failed to read CSV record at line {}: {}", line_num + 1, e),
        })?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        let row = record
            .iter()
            .filter(|field| !field.is_empty())
            .map(|field| {
                field.parse::<f64>().map_err(|e| DataError::ParseError {
                    path: path.display().to_string(),
                    line: line_num + 1,
                    message: format!("'{}': {}", field, e),
                })
            })
            .collect::<Result<Vec<f64>, DataError>>()?;
        rows.push(row);
    }
    Ok(rows)
}

/// Write a numeric matrix as CSV, optionally preceded by a header row.
pub fn write_matrix<P: AsRef<Path>>(
    file_path: P,
    rows: &[Vec<f64>],
    header: Option<&[String]>,
) -> EvResult<()> {
    let path = file_path.as_ref();
    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DataError::WritingFailed {
            message: format!("Failed to create {}: {}", path.display(), e),
        })?;

    if let Some(names) = header {
        wtr.write_record(names).map_err(|e| DataError::WritingFailed {
            message: format!("Failed to write header to {}: {}", path.display(), e),
        })?;
    }
    for row in rows {
        wtr.write_record(row.iter().map(|v| v.to_string()))
            .map_err(|e| DataError::WritingFailed {
                message: format!("Failed to write row to {}: {}", path.display(), e),
            })?;
    }
    wtr.flush()?;

    tracing::debug!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_front<P: AsRef<Path>>(file_path: P, front: &Front) -> EvResult<()> {
    write_matrix(file_path, front.points(), None)
}
