use crate::domain::model::{DistanceUnit, ExtractedData, FailurePolicy, OutputFormat, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn source_path(&self) -> &str;
    fn destination_path(&self) -> &str;
    /// `None` 代表輸出到 stdout
    fn output_path(&self) -> Option<&str>;
    /// `None` 代表從 `reference_url` 下載
    fn reference_path(&self) -> Option<&str>;
    fn reference_url(&self) -> &str;
    fn code_column(&self) -> &str;
    fn pad_width(&self) -> Option<usize>;
    fn unit(&self) -> DistanceUnit;
    fn output_format(&self) -> OutputFormat;
    fn unknown_code_policy(&self) -> FailurePolicy;
    fn convergence_policy(&self) -> FailurePolicy;
    fn convergence_tolerance(&self) -> f64 {
        crate::core::geodesic::DEFAULT_TOLERANCE
    }
    fn max_iterations(&self) -> usize {
        crate::core::geodesic::DEFAULT_MAX_ITERATIONS
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExtractedData>;
    async fn transform(&self, data: ExtractedData) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
