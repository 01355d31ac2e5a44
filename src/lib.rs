pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{cli::LocalStorage, CliConfig};

pub use config::toml_config::TomlConfig;
pub use crate::core::{
    etl::{EtlEngine, RunReport},
    geodesic::{Ellipsoid, GeodesicError, Vincenty},
    pipeline::DistancePipeline,
};
pub use domain::model::{
    Coordinate, DistanceResult, DistanceUnit, FailurePolicy, OutputFormat, PostalCodeRecord,
    ReferenceTable,
};
pub use utils::error::{EtlError, Result};
