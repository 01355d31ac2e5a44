use crate::domain::model::PostalCodeRecord;
use crate::utils::error::{EtlError, Result};

const NAME_HEADERS: &[&str] = &["name"];
const REGION_HEADERS: &[&str] = &["region", "state"];

fn find_column(headers: &csv::StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n.trim())))
}

/// 讀取含標題列的郵遞區號 CSV
pub fn read_postal_codes(data: &[u8], path: &str, code_column: &str) -> Result<Vec<PostalCodeRecord>> {
    let format_error = |message: String| EtlError::InputFormatError {
        path: path.to_string(),
        message,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| format_error(e.to_string()))?
        .clone();

    let code_index = find_column(&headers, &[code_column]).ok_or_else(|| {
        format_error(format!(
            "expected a header row with '{}', but found: {:?}",
            code_column,
            headers.iter().collect::<Vec<_>>()
        ))
    })?;
    let name_index = find_column(&headers, NAME_HEADERS);
    let region_index = find_column(&headers, REGION_HEADERS);

    tracing::debug!(
        "Columns in {}: code={}, name={:?}, region={:?}",
        path,
        code_index,
        name_index,
        region_index
    );

    let optional = |row: &csv::StringRecord, index: Option<usize>| {
        index
            .and_then(|i| row.get(i))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let line = index + 2;
        let row = row.map_err(|e| format_error(format!("line {}: {}", line, e)))?;

        let code = row.get(code_index).map(str::trim).unwrap_or_default();
        if code.is_empty() {
            return Err(format_error(format!(
                "line {}: empty '{}' value",
                line, code_column
            )));
        }

        records.push(PostalCodeRecord {
            code: code.to_string(),
            name: optional(&row, name_index),
            region: optional(&row, region_index),
        });
    }

    if records.is_empty() {
        return Err(format_error("no postal codes read".to_string()));
    }

    tracing::info!("📥 Read {} postal codes from {}", records.len(), path);
    Ok(records)
}
