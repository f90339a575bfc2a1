use crate::domain::model::{FieldNames, ValidationReport};
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
    fn input_path(&self) -> &str;
    fn delimiter(&self) -> u8;
    fn output_path(&self) -> Option<&str>;
    fn field_names(&self) -> &FieldNames;
    fn audit_rejected_identifiers(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    /// Reads the whole input; failures here end the run.
    async fn extract(&self) -> Result<Vec<u8>>;
    async fn transform(&self, input: Vec<u8>) -> Result<ValidationReport>;
    /// Renders the report and returns the dump.
    async fn load(&self, report: &ValidationReport) -> Result<String>;
}
