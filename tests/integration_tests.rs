use contract_etl::domain::model::RejectionReason;
use contract_etl::{CliConfig, ContractPipeline, EtlEngine, EtlError, LocalStorage, TomlConfig};
use std::path::Path;
use tempfile::TempDir;

const HEADER: &str =
    "nrContrato,nrCpfCnpj,vlTotal,qtPrestacoes,vlPresta,vlMora,vlMulta,vlOutAcr,vlIof,vlDescon,vlAtual,vlMovimento,vlPag";

fn write_input(dir: &Path, rows: &[&str]) -> String {
    let mut content = HEADER.to_string();
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    content.push('\n');

    let path = dir.join("data.csv");
    std::fs::write(&path, content).unwrap();
    path.to_str().unwrap().to_string()
}

fn cli_config(input: String) -> CliConfig {
    CliConfig {
        input,
        output_path: None,
        delimiter: ',',
        audit_rejected: false,
        verbose: false,
        field_names: Default::default(),
    }
}

fn mixed_rows() -> [&'static str; 3] {
    [
        "C-1,123.456.789-00,300.00,3,100.00,0,0,0,0,0,300,0,0",
        "C-2,52998224725,abc,3,100.00,0,0,0,0,0,300,0,0",
        "C-3,11.444.777/0001-61,300.004,3,100.00,10,5,0,1.2,0,315.2,100,50",
    ]
}

#[tokio::test]
async fn test_end_to_end_keeps_only_valid_row() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), &mixed_rows());

    let pipeline = ContractPipeline::new(LocalStorage::default(), cli_config(input));
    let outcome = EtlEngine::new(pipeline).run().await.unwrap();

    let report = &outcome.report;
    assert_eq!(report.rows_read, 3);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.rejections.len(), 2);
    assert!(matches!(
        report.rejections[0].reason,
        RejectionReason::InvalidIdentifier { .. }
    ));
    assert!(matches!(
        &report.rejections[1].reason,
        RejectionReason::FieldCoercion { field, .. } if field == "vlTotal"
    ));

    let record = &report.records[0];
    assert_eq!(record.text("nrContrato"), Some("C-3"));
    assert_eq!(record.total_valid(), Some(true));
    assert_eq!(record.text("vlAtualBRL"), Some("R$ 315,20"));

    let dump: serde_json::Value = serde_json::from_str(&outcome.dump).unwrap();
    assert_eq!(dump[0]["consistenciaPagamento"], "Pagamento inconsistente");
    assert_eq!(dump[0]["valorTotalValido"], true);
    assert_eq!(dump[0]["vlTotal"], 300.004);
}

#[tokio::test]
async fn test_stdout_text_has_notice_then_dump() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), &mixed_rows());

    let pipeline = ContractPipeline::new(LocalStorage::default(), cli_config(input));
    let outcome = EtlEngine::new(pipeline).run().await.unwrap();

    let text = outcome.stdout_text();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("CSV file processed successfully"));
    assert_eq!(lines.next(), Some("Valid contracts:"));
    assert_eq!(lines.next(), Some("["));
    assert!(text.ends_with("]\n"));
}

#[tokio::test]
async fn test_runs_are_byte_for_byte_identical() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), &mixed_rows());

    let first = EtlEngine::new(ContractPipeline::new(
        LocalStorage::default(),
        cli_config(input.clone()),
    ))
    .run()
    .await
    .unwrap();
    let second = EtlEngine::new(ContractPipeline::new(
        LocalStorage::default(),
        cli_config(input),
    ))
    .run()
    .await
    .unwrap();

    assert_eq!(first.stdout_text(), second.stdout_text());
}

#[tokio::test]
async fn test_missing_input_is_stream_error() {
    let temp_dir = TempDir::new().unwrap();
    let input = temp_dir.path().join("missing.csv");

    let pipeline = ContractPipeline::new(
        LocalStorage::default(),
        cli_config(input.to_str().unwrap().to_string()),
    );
    let result = EtlEngine::new(pipeline).run().await;

    match result {
        Err(e @ EtlError::IoError(_)) => assert_eq!(e.exit_code(), 2),
        other => panic!("expected an IO error, got {:?}", other.map(|o| o.dump)),
    }
}

#[tokio::test]
async fn test_invalid_utf8_row_is_stream_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.csv");
    std::fs::write(&path, b"nrCpfCnpj,vlTotal\n52998224725,\xff\xfe\n").unwrap();

    let pipeline = ContractPipeline::new(
        LocalStorage::default(),
        cli_config(path.to_str().unwrap().to_string()),
    );
    let result = EtlEngine::new(pipeline).run().await;

    assert!(matches!(result, Err(EtlError::CsvError(_))));
}

#[tokio::test]
async fn test_toml_config_writes_output_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), &mixed_rows());
    let output_dir = temp_dir.path().join("report");

    let toml_content = format!(
        r#"
[pipeline]
name = "contracts"

[input]
path = "{}"

[report]
output_path = "{}"
"#,
        input.replace('\\', "/"),
        output_dir.to_str().unwrap().replace('\\', "/")
    );
    let config = TomlConfig::from_toml_str(&toml_content).unwrap();

    let pipeline = ContractPipeline::new(LocalStorage::default(), config);
    let outcome = EtlEngine::new(pipeline).run().await.unwrap();

    let written = std::fs::read_to_string(output_dir.join("valid_contracts.json")).unwrap();
    assert_eq!(written, outcome.dump);
}

#[tokio::test]
async fn test_header_only_input_yields_empty_dump() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), &[]);

    let pipeline = ContractPipeline::new(LocalStorage::default(), cli_config(input));
    let outcome = EtlEngine::new(pipeline).run().await.unwrap();

    assert!(outcome.report.records.is_empty());
    assert_eq!(outcome.dump, "[]");
}
