use anyhow::Context;
use clap::Parser;
use contract_etl::config::toml_config::TomlConfig;
use contract_etl::core::pipeline::RowReader;
use contract_etl::core::ConfigProvider;
use contract_etl::utils::{logger, validation::Validate};
use contract_etl::{ContractPipeline, EtlEngine, LocalStorage};

#[derive(Parser)]
#[command(name = "toml-etl")]
#[command(about = "Contract validation with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "etl-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Override report.output_path from config
    #[arg(long)]
    output_path: Option<String>,

    /// Override report.audit_rejected_identifiers from config
    #[arg(long)]
    audit_rejected: Option<bool>,

    /// Check the configuration and the input header without validating rows
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // 初始化日誌
    if args.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load config file '{}': {}", args.config, e);
            std::process::exit(e.exit_code());
        }
    };

    // 應用命令列覆蓋設定
    if let Some(output_path) = args.output_path.clone() {
        config.set_output_path(output_path);
    }
    if let Some(audit) = args.audit_rejected {
        config.set_audit_rejected_identifiers(audit);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    log_config_summary(&config);

    if args.dry_run {
        if let Err(e) = perform_dry_run(&config) {
            tracing::error!("❌ Dry run failed: {:#}", e);
            std::process::exit(2);
        }
        return;
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

fn log_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Pipeline: {}", config.pipeline.name);
    if let Some(description) = &config.pipeline.description {
        tracing::info!("  {}", description);
    }
    tracing::info!(
        "  Input: {} (delimiter {:?})",
        config.input_path(),
        config.delimiter_char()
    );
    if let Some(output_path) = config.output_path() {
        tracing::info!("  Output: {}", output_path);
    }
    tracing::debug!("  Fields: {:?}", config.field_names());
}

fn perform_dry_run(config: &TomlConfig) -> anyhow::Result<()> {
    println!("🔍 Dry Run Analysis:");

    let file = std::fs::File::open(config.input_path())
        .with_context(|| format!("opening {}", config.input_path()))?;
    let rows = RowReader::new(std::io::BufReader::new(file), config.delimiter())
        .context("reading the header row")?;

    println!("  Columns: {}", rows.headers().iter().collect::<Vec<_>>().join(", "));

    let missing = rows.missing_columns(config.field_names());
    if missing.is_empty() {
        println!("  ✅ All required columns present");
    } else {
        println!("  ⚠️ Missing columns: {}", missing.join(", "));
    }

    let mut row_count = 0usize;
    for row in rows {
        row.context("scanning rows")?;
        row_count += 1;
    }
    println!("  Rows: {}", row_count);

    Ok(())
}
