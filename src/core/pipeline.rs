use crate::adapters::geonames;
use crate::core::geodesic::{GeodesicError, Vincenty};
use crate::core::input::read_postal_codes;
use crate::core::output;
use crate::core::pairs::CrossProduct;
use crate::core::reference::parse_reference_table;
use crate::core::resolver::CoordinateResolver;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    DistanceResult, ExtractedData, FailurePolicy, PostalCodeRecord, ReferenceTable, RunSummary,
    TransformResult,
};
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use tokio::io::AsyncWriteExt;

pub const STDOUT_LOCATION: &str = "<stdout>";

pub struct DistancePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
    vincenty: Vincenty,
}

impl<S: Storage, C: ConfigProvider> DistancePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let vincenty = Vincenty::default()
            .with_tolerance(config.convergence_tolerance())
            .with_max_iterations(config.max_iterations());
        Self {
            storage,
            config,
            client: Client::new(),
            vincenty,
        }
    }

    async fn load_reference(&self) -> Result<ReferenceTable> {
        let pad_width = self.config.pad_width();
        match self.config.reference_path() {
            Some(path) => {
                tracing::info!("📂 Loading reference coordinates from {}", path);
                let data = self.storage.read_file(path).await?;
                parse_reference_table(data.as_slice(), path, pad_width)
            }
            None => {
                let (entry_name, data) =
                    geonames::fetch_reference_text(&self.client, self.config.reference_url())
                        .await?;
                parse_reference_table(data.as_slice(), &entry_name, pad_width)
            }
        }
    }

    async fn read_codes(&self, path: &str) -> Result<Vec<PostalCodeRecord>> {
        let data = self.storage.read_file(path).await?;
        read_postal_codes(&data, path, self.config.code_column())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DistancePipeline<S, C> {
    async fn extract(&self) -> Result<ExtractedData> {
        let reference = self.load_reference().await?;
        let destinations = self.read_codes(self.config.destination_path()).await?;
        let sources = self.read_codes(self.config.source_path()).await?;

        Ok(ExtractedData {
            reference,
            sources,
            destinations,
        })
    }

    async fn transform(&self, data: ExtractedData) -> Result<TransformResult> {
        let unit = self.config.unit();
        let on_unknown = self.config.unknown_code_policy();
        let on_non_convergence = self.config.convergence_policy();

        let mut resolver = CoordinateResolver::new(&data.reference, self.config.pad_width());
        let mut summary = RunSummary::default();
        let mut results = Vec::with_capacity(data.sources.len() * data.destinations.len());

        for (source, destination) in CrossProduct::new(data.sources.iter(), &data.destinations) {
            summary.pairs_enumerated += 1;

            let placeholder = || DistanceResult {
                source_code: source.code.clone(),
                dest_code: destination.code.clone(),
                distance: None,
            };

            let endpoints = match (
                resolver.resolve(&source.code),
                resolver.resolve(&destination.code),
            ) {
                (Ok(from), Ok(to)) => (from, to),
                (Err(e), _) | (_, Err(e)) => {
                    match on_unknown {
                        FailurePolicy::Abort => return Err(e),
                        FailurePolicy::Skip => summary.skipped_unknown += 1,
                        FailurePolicy::Placeholder => results.push(placeholder()),
                    }
                    continue;
                }
            };

            match self.vincenty.distance(&endpoints.0, &endpoints.1) {
                Ok(meters) => results.push(DistanceResult {
                    source_code: source.code.clone(),
                    dest_code: destination.code.clone(),
                    distance: Some(unit.from_meters(meters)),
                }),
                Err(GeodesicError::NonConvergence { iterations }) => {
                    let err = EtlError::DistanceConvergenceError {
                        source_code: source.code.clone(),
                        dest_code: destination.code.clone(),
                        iterations,
                    };
                    match on_non_convergence {
                        FailurePolicy::Abort => return Err(err),
                        FailurePolicy::Skip => {
                            tracing::warn!("⚠️ Skipping pair: {}", err);
                            summary.skipped_non_convergent += 1;
                        }
                        FailurePolicy::Placeholder => {
                            tracing::warn!("⚠️ Writing empty distance: {}", err);
                            results.push(placeholder());
                        }
                    }
                }
            }
        }

        summary.rows_emitted = results.len();
        summary.unknown_codes = resolver.unknown_codes();

        tracing::info!(
            "📐 Computed {} distances ({} pairs, {} skipped for unknown codes, {} skipped for non-convergence)",
            summary.rows_emitted,
            summary.pairs_enumerated,
            summary.skipped_unknown,
            summary.skipped_non_convergent
        );
        if summary.unknown_codes > 0 {
            tracing::warn!(
                "⚠️ {} postal codes had no reference coordinates",
                summary.unknown_codes
            );
        }

        Ok(TransformResult { results, summary })
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let data = output::render(&result.results, self.config.output_format())?;
        tracing::debug!("Writing {} bytes of output", data.len());

        match self.config.output_path() {
            Some(path) => {
                self.storage.write_file(path, &data).await?;
                Ok(path.to_string())
            }
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(&data).await?;
                stdout.flush().await?;
                Ok(STDOUT_LOCATION.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{DistanceUnit, OutputFormat};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const REFERENCE: &str = "US\t10552\tMount Vernon\tNew York\tNY\t\t\t\t\t40.9246\t-73.8262\t4\n\
US\t10550\tMount Vernon\tNew York\tNY\t\t\t\t\t40.9079\t-73.8378\t4\n\
US\t53013\tCedar Grove\tWisconsin\tWI\t\t\t\t\t43.5669\t-87.8286\t4\n\
XX\t00001\tOrigin\t\t\t\t\t\t\t0.0\t0.0\t1\n\
XX\t00002\tAntipode\t\t\t\t\t\t\t0.5\t179.7\t1\n";

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_files(files: &[(&str, &str)]) -> Self {
            let files = files
                .iter()
                .map(|(path, content)| (path.to_string(), content.as_bytes().to_vec()))
                .collect();
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EtlError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        unit: DistanceUnit,
        format: OutputFormat,
        on_unknown: FailurePolicy,
        on_non_convergence: FailurePolicy,
    }

    impl Default for MockConfig {
        fn default() -> Self {
            Self {
                unit: DistanceUnit::Miles,
                format: OutputFormat::Csv,
                on_unknown: FailurePolicy::Skip,
                on_non_convergence: FailurePolicy::Abort,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn source_path(&self) -> &str {
            "src.csv"
        }

        fn destination_path(&self) -> &str {
            "dst.csv"
        }

        fn output_path(&self) -> Option<&str> {
            Some("out.csv")
        }

        fn reference_path(&self) -> Option<&str> {
            Some("US.txt")
        }

        fn reference_url(&self) -> &str {
            geonames::DEFAULT_REFERENCE_URL
        }

        fn code_column(&self) -> &str {
            "Zip Code"
        }

        fn pad_width(&self) -> Option<usize> {
            Some(5)
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
    }

    fn storage(sources: &str, destinations: &str) -> MockStorage {
        MockStorage::with_files(&[
            ("US.txt", REFERENCE),
            ("src.csv", sources),
            ("dst.csv", destinations),
        ])
    }

    async fn run(storage: MockStorage, config: MockConfig) -> Result<TransformResult> {
        let pipeline = DistancePipeline::new(storage, config);
        let data = pipeline.extract().await?;
        pipeline.transform(data).await
    }

    fn pairs(result: &TransformResult) -> Vec<(String, String)> {
        result
            .results
            .iter()
            .map(|r| (r.source_code.clone(), r.dest_code.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_extract_reads_all_inputs() {
        let storage = storage("Zip Code\n10552\n", "Name,Zip Code\nA,10550\nB,53013\n");
        let pipeline = DistancePipeline::new(storage, MockConfig::default());

        let data = pipeline.extract().await.unwrap();
        assert_eq!(data.reference.len(), 5);
        assert_eq!(data.sources.len(), 1);
        assert_eq!(data.destinations.len(), 2);
        assert_eq!(data.destinations[1].name.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn test_transform_cross_product_in_input_order() {
        let storage = storage("Zip Code\n53013\n10552\n", "Zip Code\n10550\n10552\n53013\n");
        let result = run(storage, MockConfig::default()).await.unwrap();

        assert_eq!(result.summary.pairs_enumerated, 6);
        assert_eq!(result.summary.rows_emitted, 6);
        let expected: Vec<(String, String)> = [
            ("53013", "10550"),
            ("53013", "10552"),
            ("53013", "53013"),
            ("10552", "10550"),
            ("10552", "10552"),
            ("10552", "53013"),
        ]
        .iter()
        .map(|(s, d)| (s.to_string(), d.to_string()))
        .collect();
        assert_eq!(pairs(&result), expected);

        assert_eq!(result.results[2].distance, Some(0.0));
        assert_eq!(result.results[4].distance, Some(0.0));

        let nearby = result.results[3].distance.unwrap();
        assert!((nearby - 1.3025645465).abs() < 1e-6, "got {}", nearby);
        let far = result.results[5].distance.unwrap();
        assert!((far - 739.8755412288).abs() < 1e-6, "got {}", far);
        let reverse = result.results[1].distance.unwrap();
        assert!((far - reverse).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_unit_is_applied() {
        let storage = storage("Zip Code\n10552\n", "Zip Code\n10550\n");
        let config = MockConfig {
            unit: DistanceUnit::Kilometers,
            ..MockConfig::default()
        };
        let result = run(storage, config).await.unwrap();
        let km = result.results[0].distance.unwrap();
        assert!((km - 2.0962744376).abs() < 1e-6, "got {}", km);
    }

    #[tokio::test]
    async fn test_unknown_codes_are_skipped_by_default() {
        let storage = storage("Zip Code\n10552\n99999\n", "Zip Code\n10550\n88888\n53013\n");
        let result = run(storage, MockConfig::default()).await.unwrap();

        assert_eq!(result.summary.pairs_enumerated, 6);
        assert_eq!(result.summary.skipped_unknown, 4);
        assert_eq!(result.summary.unknown_codes, 2);
        assert_eq!(result.results.len(), 6 - 4);
        assert_eq!(
            pairs(&result),
            vec![
                ("10552".to_string(), "10550".to_string()),
                ("10552".to_string(), "53013".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_codes_with_placeholder_policy() {
        let storage = storage("Zip Code\n10552\n", "Zip Code\n88888\n10550\n");
        let config = MockConfig {
            on_unknown: FailurePolicy::Placeholder,
            ..MockConfig::default()
        };
        let result = run(storage, config).await.unwrap();

        assert_eq!(result.results.len(), 2);
        assert_eq!(result.results[0].dest_code, "88888");
        assert_eq!(result.results[0].distance, None);
        assert!(result.results[1].distance.is_some());
    }

    #[tokio::test]
    async fn test_unknown_codes_with_abort_policy() {
        let storage = storage("Zip Code\n10552\n", "Zip Code\n10550\n88888\n");
        let config = MockConfig {
            on_unknown: FailurePolicy::Abort,
            ..MockConfig::default()
        };
        let err = run(storage, config).await.unwrap_err();
        match err {
            EtlError::UnknownPostalCodeError { code } => assert_eq!(code, "88888"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_short_codes_are_zero_padded() {
        let storage = storage("Zip Code\n1\n", "Zip Code\n00002\n");
        let config = MockConfig {
            on_non_convergence: FailurePolicy::Placeholder,
            ..MockConfig::default()
        };
        let result = run(storage, config).await.unwrap();
        assert_eq!(result.summary.skipped_unknown, 0);
        assert_eq!(result.results[0].source_code, "1");
    }

    #[tokio::test]
    async fn test_non_convergence_aborts_by_default() {
        let storage = storage("Zip Code\n00001\n", "Zip Code\n10552\n00002\n");
        let err = run(storage, MockConfig::default()).await.unwrap_err();
        match err {
            EtlError::DistanceConvergenceError {
                source_code,
                dest_code,
                ..
            } => {
                assert_eq!(source_code, "00001");
                assert_eq!(dest_code, "00002");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_convergence_can_be_skipped() {
        let storage = storage("Zip Code\n00001\n", "Zip Code\n10552\n00002\n");
        let config = MockConfig {
            on_non_convergence: FailurePolicy::Skip,
            ..MockConfig::default()
        };
        let result = run(storage, config).await.unwrap();
        assert_eq!(result.summary.skipped_non_convergent, 1);
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].dest_code, "10552");
    }

    #[tokio::test]
    async fn test_load_writes_csv_to_storage() {
        let storage = storage("Zip Code\n10552\n", "Zip Code\n10552\n");
        let pipeline = DistancePipeline::new(storage.clone(), MockConfig::default());

        let data = pipeline.extract().await.unwrap();
        let result = pipeline.transform(data).await.unwrap();
        let location = pipeline.load(result).await.unwrap();
        assert_eq!(location, "out.csv");

        let written = storage.get_file("out.csv").await.unwrap();
        assert_eq!(
            String::from_utf8(written).unwrap(),
            "Source Code,Destination Code,Geodesic Distance\n10552,10552,0\n"
        );
    }

    #[tokio::test]
    async fn test_missing_input_file_is_an_io_error() {
        let storage = MockStorage::with_files(&[("US.txt", REFERENCE)]);
        let pipeline = DistancePipeline::new(storage, MockConfig::default());
        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(err, EtlError::IoError(_)));
    }
}
