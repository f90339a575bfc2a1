pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{cli::LocalStorage, toml_config::TomlConfig};
pub use crate::core::{
    etl::{EtlEngine, EtlOutcome},
    pipeline::ContractPipeline,
};
pub use crate::domain::consistency::{payment_consistency, total_amount_valid, PaymentConsistency};
pub use crate::domain::currency::format_brl;
pub use crate::domain::identifier::{is_valid, TaxId, TaxIdKind};
pub use crate::utils::error::{EtlError, Result};
