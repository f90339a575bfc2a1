pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
use crate::domain::model::FieldNames;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_INPUT_PATH: &str = "data.csv";
pub const INPUT_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "contract-etl")]
#[command(about = "Validates CPF/CNPJ and amounts of a contracts CSV file")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_INPUT_PATH)]
    pub input: String,

    #[arg(long, help = "Directory where valid_contracts.json is also written")]
    pub output_path: Option<String>,

    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    #[arg(long, help = "Log rows dropped for an invalid CPF/CNPJ as warnings")]
    pub audit_rejected: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(skip)]
    pub field_names: FieldNames,
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        &self.input
    }

    fn delimiter(&self) -> u8 {
        self.delimiter as u8
    }

    fn output_path(&self) -> Option<&str> {
        self.output_path.as_deref()
    }

    fn field_names(&self) -> &FieldNames {
        &self.field_names
    }

    fn audit_rejected_identifiers(&self) -> bool {
        self.audit_rejected
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_file_extension("input", &self.input, INPUT_EXTENSIONS)?;
        validation::validate_delimiter("delimiter", self.delimiter)?;
        if let Some(output_path) = &self.output_path {
            validation::validate_path("output_path", output_path)?;
        }
        self.field_names.validate()
    }
}

impl Validate for FieldNames {
    fn validate(&self) -> Result<()> {
        for (role, column) in self.all() {
            validation::validate_non_empty_string(&format!("fields.{}", role), column)?;
        }
        validation::validate_distinct("fields", self.all().into_iter().map(|(_, column)| column))
    }
}
