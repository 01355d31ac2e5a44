#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::adapters::geonames::DEFAULT_REFERENCE_URL;
#[cfg(feature = "cli")]
use crate::core::geodesic::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::domain::model::{DistanceUnit, FailurePolicy, OutputFormat};
#[cfg(feature = "cli")]
use crate::utils::validation::{validate_settings, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "zip-distance")]
#[command(about = "Compute geodesic distances between two lists of postal codes")]
pub struct CliConfig {
    /// Source postal code CSV
    #[arg(long, default_value = "sample_address_file_a.csv")]
    pub src: String,

    /// Destination postal code CSV
    #[arg(long, default_value = "sample_address_file_b.csv")]
    pub dst: String,

    /// Output file path (prints to stdout when omitted)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Local GeoNames postal code file; downloaded from --reference-url when omitted
    #[arg(long)]
    pub reference: Option<String>,

    #[arg(long, default_value = DEFAULT_REFERENCE_URL)]
    pub reference_url: String,

    /// Header of the postal code column in the input files
    #[arg(long, default_value = "Zip Code")]
    pub code_column: String,

    /// Left-pad numeric codes with zeros to this width (e.g. 5 for US ZIP codes)
    #[arg(long)]
    pub pad_width: Option<usize>,

    #[arg(long, value_enum, default_value_t = DistanceUnit::Kilometers)]
    pub unit: DistanceUnit,

    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// What to do with pairs whose postal code has no coordinates
    #[arg(long, value_enum, default_value_t = FailurePolicy::Skip)]
    pub on_unknown: FailurePolicy,

    /// What to do with pairs whose geodesic iteration does not converge
    #[arg(long, value_enum, default_value_t = FailurePolicy::Abort)]
    pub on_non_convergence: FailurePolicy,

    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: f64,

    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn source_path(&self) -> &str {
        &self.src
    }

    fn destination_path(&self) -> &str {
        &self.dst
    }

    fn output_path(&self) -> Option<&str> {
        self.output.as_deref()
    }

    fn reference_path(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    fn reference_url(&self) -> &str {
        &self.reference_url
    }

    fn code_column(&self) -> &str {
        &self.code_column
    }

    fn pad_width(&self) -> Option<usize> {
        self.pad_width
    }

    fn unit(&self) -> DistanceUnit {
        self.unit
    }

    fn output_format(&self) -> OutputFormat {
        self.format
    }

    fn unknown_code_policy(&self) -> FailurePolicy {
        self.on_unknown
    }

    fn convergence_policy(&self) -> FailurePolicy {
        self.on_non_convergence
    }

    fn convergence_tolerance(&self) -> f64 {
        self.tolerance
    }

    fn max_iterations(&self) -> usize {
        self.max_iterations
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> crate::utils::error::Result<()> {
        validate_settings(self)
    }
}
