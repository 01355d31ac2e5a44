use crate::core::Pipeline;
use crate::domain::model::RunSummary;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_location: String,
    pub summary: RunSummary,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("Starting distance computation");
        self.monitor.log_stats("Start");

        tracing::info!("Extracting inputs and reference data...");
        let extracted = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} sources, {} destinations, {} reference codes",
            extracted.sources.len(),
            extracted.destinations.len(),
            extracted.reference.len()
        );
        self.monitor.log_stats("Extract");

        tracing::info!("Computing distances...");
        let transformed = self.pipeline.transform(extracted).await?;
        let summary = transformed.summary.clone();
        self.monitor.log_stats("Transform");

        tracing::info!("Writing {} rows...", summary.rows_emitted);
        let output_location = self.pipeline.load(transformed).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(RunReport {
            output_location,
            summary,
        })
    }
}
