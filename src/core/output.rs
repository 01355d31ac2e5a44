use crate::domain::model::{DistanceResult, OutputFormat};
use crate::utils::error::Result;

pub const OUTPUT_HEADER: [&str; 3] = ["Source Code", "Destination Code", "Geodesic Distance"];

pub fn render(results: &[DistanceResult], format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Csv => render_delimited(results, b','),
        OutputFormat::Tsv => render_delimited(results, b'\t'),
        OutputFormat::Json => Ok(serde_json::to_vec_pretty(results)?),
    }
}

fn render_delimited(results: &[DistanceResult], delimiter: u8) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    writer.write_record(OUTPUT_HEADER)?;
    for result in results {
        let distance = result.distance.map(|d| d.to_string()).unwrap_or_default();
        writer.write_record([
            result.source_code.as_str(),
            result.dest_code.as_str(),
            distance.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| crate::utils::error::EtlError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results() -> Vec<DistanceResult> {
        vec![
            DistanceResult {
                source_code: "10552".to_string(),
                dest_code: "10550".to_string(),
                distance: Some(1.131330300414714),
            },
            DistanceResult {
                source_code: "10552".to_string(),
                dest_code: "99999".to_string(),
                distance: None,
            },
        ]
    }

    #[test]
    fn test_csv_output() {
        let bytes = render(&results(), OutputFormat::Csv).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text,
            "Source Code,Destination Code,Geodesic Distance\n\
             10552,10550,1.131330300414714\n\
             10552,99999,\n"
        );
    }

    #[test]
    fn test_tsv_output() {
        let bytes = render(&results(), OutputFormat::Tsv).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("Source Code\tDestination Code\tGeodesic Distance\n"));
        assert!(text.contains("10552\t10550\t1.131330300414714\n"));
    }

    #[test]
    fn test_json_output() {
        let bytes = render(&results(), OutputFormat::Json).unwrap();
        let parsed: Vec<DistanceResult> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed, results());
    }

    #[test]
    fn test_header_only_when_empty() {
        let bytes = render(&[], OutputFormat::Csv).unwrap();
        assert_eq!(bytes, b"Source Code,Destination Code,Geodesic Distance\n");
    }
}
