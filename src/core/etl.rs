use crate::core::{Pipeline, ValidationReport};
use crate::utils::error::Result;

pub const SUCCESS_NOTICE: &str = "CSV file processed successfully";
pub const RESULTS_HEADING: &str = "Valid contracts:";

#[derive(Debug, Clone)]
pub struct EtlOutcome {
    pub report: ValidationReport,
    pub dump: String,
}

impl EtlOutcome {
    /// Everything a successful run prints to stdout.
    pub fn stdout_text(&self) -> String {
        format!("{}\n{}\n{}\n", SUCCESS_NOTICE, RESULTS_HEADING, self.dump)
    }
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<EtlOutcome> {
        tracing::info!("Starting contract validation...");

        // Extract
        let input = self.pipeline.extract().await?;

        // Transform
        let report = self.pipeline.transform(input).await?;
        tracing::info!(
            "Read {} rows: {} valid, {} invalid CPF/CNPJ, {} with bad values",
            report.rows_read,
            report.records.len(),
            report.invalid_identifiers(),
            report.coercion_failures()
        );

        // Load
        let dump = self.pipeline.load(&report).await?;

        Ok(EtlOutcome { report, dump })
    }
}
