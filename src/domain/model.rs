use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 輸入 CSV 中的一筆郵遞區號
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalCodeRecord {
    pub code: String,
    pub name: Option<String>,
    pub region: Option<String>,
}

/// 經緯度 (度)，緯度 [-90, 90]，經度正規化到 [-180, 180)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(EtlError::ValidationError {
                message: format!("Non-finite coordinate ({}, {})", latitude, longitude),
            });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(EtlError::ValidationError {
                message: format!("Latitude {} is outside [-90, 90]", latitude),
            });
        }

        let longitude = if (-180.0..180.0).contains(&longitude) {
            longitude
        } else {
            (longitude + 180.0).rem_euclid(360.0) - 180.0
        };

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// 郵遞區號 -> 座標，載入後唯讀
pub type ReferenceTable = HashMap<String, Coordinate>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceResult {
    pub source_code: String,
    pub dest_code: String,
    /// `None` 只會出現在 placeholder 策略下
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum DistanceUnit {
    #[default]
    Kilometers,
    Miles,
    Meters,
    NauticalMiles,
}

impl DistanceUnit {
    pub fn from_meters(&self, meters: f64) -> f64 {
        match self {
            DistanceUnit::Kilometers => meters / 1000.0,
            DistanceUnit::Miles => meters / 1609.344,
            DistanceUnit::Meters => meters,
            DistanceUnit::NauticalMiles => meters / 1852.0,
        }
    }
}

/// 無法處理某一組配對時的做法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// 略過該配對並記錄警告
    Skip,
    /// 輸出空白距離
    Placeholder,
    /// 中止整個流程
    Abort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

/// extract 階段的產出
#[derive(Debug, Clone)]
pub struct ExtractedData {
    pub reference: ReferenceTable,
    pub sources: Vec<PostalCodeRecord>,
    pub destinations: Vec<PostalCodeRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pairs_enumerated: usize,
    pub rows_emitted: usize,
    pub skipped_unknown: usize,
    pub skipped_non_convergent: usize,
    pub unknown_codes: usize,
}

#[derive(Debug, Clone)]
pub struct TransformResult {
    pub results: Vec<DistanceResult>,
    pub summary: RunSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_rejects_out_of_range_latitude() {
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(-91.0, 0.0).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_coordinate_normalizes_longitude() {
        let c = Coordinate::new(10.0, 190.0).unwrap();
        assert!((c.longitude() - -170.0).abs() < 1e-12);

        let c = Coordinate::new(10.0, -73.5).unwrap();
        assert_eq!(c.longitude(), -73.5);

        let c = Coordinate::new(10.0, 180.0).unwrap();
        assert_eq!(c.longitude(), -180.0);
    }

    #[test]
    fn test_unit_conversion() {
        assert_eq!(DistanceUnit::Kilometers.from_meters(1500.0), 1.5);
        assert_eq!(DistanceUnit::Meters.from_meters(1500.0), 1500.0);
        assert!((DistanceUnit::Miles.from_meters(1609.344) - 1.0).abs() < 1e-12);
        assert!((DistanceUnit::NauticalMiles.from_meters(3704.0) - 2.0).abs() < 1e-12);
    }
}
