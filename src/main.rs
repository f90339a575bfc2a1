use clap::Parser;
use contract_etl::utils::{logger, validation::Validate};
use contract_etl::{CliConfig, ContractPipeline, EtlEngine, LocalStorage};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::debug!("CLI config: {:?}", config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    let pipeline = ContractPipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(outcome) => {
            print!("{}", outcome.stdout_text());
        }
        Err(e) => {
            tracing::error!("❌ {} ({})", e.user_friendly_message(), e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
