use crate::config::{DEFAULT_INPUT_PATH, INPUT_EXTENSIONS};
use crate::core::ConfigProvider;
use crate::domain::model::FieldNames;
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub fields: FieldNames,
    pub report: Option<ReportConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
    pub delimiter: Option<char>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_INPUT_PATH.to_string(),
            delimiter: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_path: Option<String>,
    pub audit_rejected_identifiers: Option<bool>,
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

    /// 替換環境變數 (例如 ${INPUT_DIR})；未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("Invalid placeholder pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn delimiter_char(&self) -> char {
        self.input.delimiter.unwrap_or(',')
    }

    fn report(&self) -> Option<&ReportConfig> {
        self.report.as_ref()
    }

    pub fn set_output_path(&mut self, output_path: String) {
        self.report.get_or_insert_with(ReportConfig::default).output_path = Some(output_path);
    }

    pub fn set_audit_rejected_identifiers(&mut self, enabled: bool) {
        self.report
            .get_or_insert_with(ReportConfig::default)
            .audit_rejected_identifiers = Some(enabled);
    }
}

impl ConfigProvider for TomlConfig {
    fn input_path(&self) -> &str {
        &self.input.path
    }

    fn delimiter(&self) -> u8 {
        self.delimiter_char() as u8
    }

    fn output_path(&self) -> Option<&str> {
        self.report().and_then(|r| r.output_path.as_deref())
    }

    fn field_names(&self) -> &FieldNames {
        &self.fields
    }

    fn audit_rejected_identifiers(&self) -> bool {
        self.report()
            .and_then(|r| r.audit_rejected_identifiers)
            .unwrap_or(false)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("pipeline.name", &self.pipeline.name)?;
        validation::validate_path("input.path", &self.input.path)?;
        validation::validate_file_extension("input.path", &self.input.path, INPUT_EXTENSIONS)?;
        validation::validate_delimiter("input.delimiter", self.delimiter_char())?;
        if let Some(output_path) = self.output_path() {
            validation::validate_path("report.output_path", output_path)?;
        }
        self.fields.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_toml_config() {
        let toml_content = r#"
[pipeline]
name = "contracts"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.pipeline.name, "contracts");
        assert_eq!(config.input_path(), "data.csv");
        assert_eq!(config.delimiter(), b',');
        assert_eq!(config.output_path(), None);
        assert!(!config.audit_rejected_identifiers());
        assert_eq!(config.field_names(), &FieldNames::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[pipeline]
name = "contracts"
description = "Monthly contract export"

[input]
path = "exports/contratos.csv"
delimiter = ";"

[fields]
identifier = "documento"
payment = "vlPago"

[report]
output_path = "./output"
audit_rejected_identifiers = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.input_path(), "exports/contratos.csv");
        assert_eq!(config.delimiter(), b';');
        assert_eq!(config.output_path(), Some("./output"));
        assert!(config.audit_rejected_identifiers());
        assert_eq!(config.field_names().identifier, "documento");
        assert_eq!(config.field_names().payment, "vlPago");
        assert_eq!(config.field_names().total, "vlTotal");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CONTRACT_ETL_TEST_INPUT", "from_env.csv");

        let toml_content = r#"
[pipeline]
name = "contracts"

[input]
path = "${CONTRACT_ETL_TEST_INPUT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input_path(), "from_env.csv");

        std::env::remove_var("CONTRACT_ETL_TEST_INPUT");
    }

    #[test]
    fn test_unknown_env_var_is_left_as_is() {
        let toml_content = r#"
[pipeline]
name = "contracts"

[input]
path = "${CONTRACT_ETL_SURELY_UNDEFINED}.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input_path(), "${CONTRACT_ETL_SURELY_UNDEFINED}.csv");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[pipeline]
name = "contracts"

[input]
path = "contratos.xlsx"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = TomlConfig::from_toml_str("[pipeline");
        assert!(matches!(
            result,
            Err(EtlError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_overrides_create_report_section() {
        let mut config = TomlConfig::from_toml_str("[pipeline]\nname = \"c\"\n").unwrap();
        config.set_output_path("./out".to_string());
        config.set_audit_rejected_identifiers(true);

        assert_eq!(config.output_path(), Some("./out"));
        assert!(config.audit_rejected_identifiers());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[pipeline]
name = "file-test"

[input]
path = "data.csv"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.pipeline.name, "file-test");
    }
}
