use crate::domain::model::{Coordinate, ReferenceTable};
use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;

/// 正規化郵遞區號：去除空白；全數字且短於 `pad_width` 時左補 0
pub fn normalize_code(code: &str, pad_width: Option<usize>) -> String {
    let trimmed = code.trim();
    match pad_width {
        Some(width)
            if trimmed.len() < width
                && !trimmed.is_empty()
                && trimmed.bytes().all(|b| b.is_ascii_digit()) =>
        {
            format!("{:0>width$}", trimmed, width = width)
        }
        _ => trimmed.to_string(),
    }
}

/// Resolves postal codes against an injected reference table, memoizing
/// every lookup (misses included) by raw code.
pub struct CoordinateResolver<'t> {
    table: &'t ReferenceTable,
    pad_width: Option<usize>,
    cache: HashMap<String, Option<Coordinate>>,
}

impl<'t> CoordinateResolver<'t> {
    pub fn new(table: &'t ReferenceTable, pad_width: Option<usize>) -> Self {
        Self {
            table,
            pad_width,
            cache: HashMap::new(),
        }
    }

    pub fn resolve(&mut self, code: &str) -> Result<Coordinate> {
        let resolved = match self.cache.get(code) {
            Some(cached) => *cached,
            None => {
                let normalized = normalize_code(code, self.pad_width);
                let found = self.table.get(&normalized).copied();
                if found.is_none() {
                    tracing::warn!("⚠️ Postal code '{}' not found in reference data", code);
                }
                self.cache.insert(code.to_string(), found);
                found
            }
        };

        resolved.ok_or_else(|| EtlError::UnknownPostalCodeError {
            code: code.to_string(),
        })
    }

    /// 查無座標的相異郵遞區號數
    pub fn unknown_codes(&self) -> usize {
        self.cache.values().filter(|c| c.is_none()).count()
    }
}
