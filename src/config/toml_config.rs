use crate::adapters::geonames::DEFAULT_REFERENCE_URL;
use crate::core::geodesic::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::core::ConfigProvider;
use crate::domain::model::{DistanceUnit, FailurePolicy, OutputFormat};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{validate_settings, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub input: InputConfig,
    #[serde(default)]
    pub reference: ReferenceConfig,
    #[serde(default)]
    pub distance: DistanceConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub source: String,
    pub destination: String,
    pub code_column: Option<String>,
    pub pad_width: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceConfig {
    pub path: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistanceConfig {
    pub unit: Option<DistanceUnit>,
    pub tolerance: Option<f64>,
    pub max_iterations: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub on_unknown: Option<FailurePolicy>,
    pub on_non_convergence: Option<FailurePolicy>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: Option<String>,
    pub format: Option<OutputFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    /// "compact" (預設) 或 "json"
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn source_path(&self) -> &str {
        &self.input.source
    }

    fn destination_path(&self) -> &str {
        &self.input.destination
    }

    fn output_path(&self) -> Option<&str> {
        self.output.path.as_deref()
    }

    fn reference_path(&self) -> Option<&str> {
        self.reference.path.as_deref()
    }

    fn reference_url(&self) -> &str {
        self.reference.url.as_deref().unwrap_or(DEFAULT_REFERENCE_URL)
    }

    fn code_column(&self) -> &str {
        self.input.code_column.as_deref().unwrap_or("Zip Code")
    }

    fn pad_width(&self) -> Option<usize> {
        self.input.pad_width
    }

    fn unit(&self) -> DistanceUnit {
        self.distance.unit.unwrap_or_default()
    }

    fn output_format(&self) -> OutputFormat {
        self.output.format.unwrap_or_default()
    }

    fn unknown_code_policy(&self) -> FailurePolicy {
        self.policy.on_unknown.unwrap_or(FailurePolicy::Skip)
    }

    fn convergence_policy(&self) -> FailurePolicy {
        self.policy.on_non_convergence.unwrap_or(FailurePolicy::Abort)
    }

    fn convergence_tolerance(&self) -> f64 {
        self.distance.tolerance.unwrap_or(DEFAULT_TOLERANCE)
    }

    fn max_iterations(&self) -> usize {
        self.distance.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(self)?;

        if let Some(format) = self.monitoring.as_ref().and_then(|m| m.log_format.as_deref()) {
            let valid_formats = ["compact", "json"];
            if !valid_formats.iter().any(|f| f.eq_ignore_ascii_case(format)) {
                return Err(EtlError::InvalidConfigValueError {
                    field: "monitoring.log_format".to_string(),
                    value: format.to_string(),
                    reason: format!("Valid formats: {}", valid_formats.join(", ")),
                });
            }
        }

        Ok(())
    }
}
