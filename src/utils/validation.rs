use crate::domain::ports::ConfigProvider;
use crate::utils::error::{EtlError, Result};
use url::Url;

pub const MAX_PAD_WIDTH: usize = 10;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(EtlError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(EtlError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 任何 `ConfigProvider` 共用的檢查
pub fn validate_settings<C: ConfigProvider + ?Sized>(config: &C) -> Result<()> {
    validate_path("source", config.source_path())?;
    validate_path("destination", config.destination_path())?;
    if let Some(output) = config.output_path() {
        validate_path("output", output)?;
    }
    match config.reference_path() {
        Some(reference) => validate_path("reference", reference)?,
        None => validate_url("reference_url", config.reference_url())?,
    }
    validate_non_empty_string("code_column", config.code_column())?;
    if let Some(width) = config.pad_width() {
        validate_range("pad_width", width, 1, MAX_PAD_WIDTH)?;
    }

    let tolerance = config.convergence_tolerance();
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(EtlError::InvalidConfigValueError {
            field: "tolerance".to_string(),
            value: tolerance.to_string(),
            reason: "Tolerance must be a positive number".to_string(),
        });
    }
    validate_positive_number("max_iterations", config.max_iterations(), 1)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("reference_url", "https://example.com/US.zip").is_ok());
        assert!(validate_url("reference_url", "http://example.com/US.zip").is_ok());
        assert!(validate_url("reference_url", "").is_err());
        assert!(validate_url("reference_url", "invalid-url").is_err());
        assert!(validate_url("reference_url", "ftp://example.com/US.zip").is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(validate_path("source", "addresses.csv").is_ok());
        assert!(validate_path("source", "").is_err());
        assert!(validate_path("source", "a\0b").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("max_iterations", 200, 1).is_ok());
        assert!(validate_positive_number("max_iterations", 0, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("pad_width", 5, 1, MAX_PAD_WIDTH).is_ok());
        assert!(validate_range("pad_width", 0, 1, MAX_PAD_WIDTH).is_err());
        assert!(validate_range("pad_width", 11, 1, MAX_PAD_WIDTH).is_err());
    }
}
