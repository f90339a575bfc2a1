use crate::core::{ConfigProvider, EnrichedRecord, Pipeline, RawRecord, Storage, ValidationReport};
use crate::domain::consistency::{payment_consistency, total_amount_valid};
use crate::domain::currency::format_brl;
use crate::domain::identifier::TaxId;
use crate::domain::model::{
    FieldNames, Rejection, RejectionReason, CURRENCY_SUFFIX, PAYMENT_CONSISTENCY_FIELD,
    TOTAL_VALID_FIELD,
};
use crate::utils::error::{EtlError, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

pub const OUTPUT_FILENAME: &str = "valid_contracts.json";

/// Lazily yields `(line, record)` pairs from CSV input with a header row.
pub struct RowReader<R: Read> {
    reader: csv::Reader<R>,
    headers: csv::StringRecord,
    record: csv::StringRecord,
}

impl<R: Read> RowReader<R> {
    pub fn new(input: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(input);
        let headers = reader.headers()?.clone();
        Ok(Self {
            reader,
            headers,
            record: csv::StringRecord::new(),
        })
    }

    pub fn headers(&self) -> &csv::StringRecord {
        &self.headers
    }

    /// Required columns absent from the header row.
    pub fn missing_columns(&self, fields: &FieldNames) -> Vec<String> {
        fields
            .required_columns()
            .into_iter()
            .filter(|column| !self.headers.iter().any(|h| h == *column))
            .map(str::to_string)
            .collect()
    }
}

impl<R: Read> Iterator for RowReader<R> {
    type Item = Result<(u64, RawRecord)>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record(&mut self.record) {
            Ok(true) => {
                let line = self.record.position().map(|p| p.line()).unwrap_or(0);
                let mut data = RawRecord::new();
                for (index, value) in self.record.iter().enumerate() {
                    // Values past the last header keep a positional name.
                    let key = match self.headers.get(index) {
                        Some(header) => header.to_string(),
                        None => format!("_{}", index),
                    };
                    data.insert(key, Value::String(value.to_string()));
                }
                Some(Ok((line, data)))
            }
            Ok(false) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Enriched(EnrichedRecord),
    Rejected(Rejection),
}

/// Validates and enriches single contract rows.
pub struct ContractValidator<'a> {
    fields: &'a FieldNames,
    audit_rejected_identifiers: bool,
}

impl<'a> ContractValidator<'a> {
    pub fn new(fields: &'a FieldNames, audit_rejected_identifiers: bool) -> Self {
        Self {
            fields,
            audit_rejected_identifiers,
        }
    }

    pub fn process(&self, line: u64, data: RawRecord) -> RowOutcome {
        let identifier = match data.get(&self.fields.identifier) {
            Some(value) => value.as_str().unwrap_or_default(),
            None => {
                tracing::warn!(
                    "Line {}: column '{}' is missing, row skipped",
                    line,
                    self.fields.identifier
                );
                ""
            }
        };

        let tax_id = match TaxId::parse(identifier) {
            Some(tax_id) => tax_id,
            None => {
                if self.audit_rejected_identifiers {
                    tracing::warn!("Line {}: invalid CPF/CNPJ '{}', row skipped", line, identifier);
                } else {
                    tracing::debug!("Line {}: invalid CPF/CNPJ '{}', row skipped", line, identifier);
                }
                return RowOutcome::Rejected(Rejection {
                    line,
                    reason: RejectionReason::InvalidIdentifier {
                        value: identifier.to_string(),
                    },
                });
            }
        };
        tracing::debug!("Line {}: {:?} {}", line, tax_id.kind(), tax_id);

        match self.enrich(line, data) {
            Ok(record) => RowOutcome::Enriched(record),
            Err(EtlError::FieldCoercionError {
                line,
                field,
                value,
                message,
            }) => {
                tracing::warn!(
                    "Failed to process line {}: field '{}' value '{}': {}",
                    line,
                    field,
                    value,
                    message
                );
                RowOutcome::Rejected(Rejection {
                    line,
                    reason: RejectionReason::FieldCoercion { field, message },
                })
            }
            Err(other) => {
                tracing::warn!("Failed to process line {}: {}", line, other);
                RowOutcome::Rejected(Rejection {
                    line,
                    reason: RejectionReason::FieldCoercion {
                        field: String::new(),
                        message: other.to_string(),
                    },
                })
            }
        }
    }

    fn enrich(&self, line: u64, mut data: RawRecord) -> Result<EnrichedRecord> {
        let fields = self.fields;
        let monetary = fields.required_monetary();

        let mut amounts = [0.0_f64; 8];
        for (amount, field) in amounts.iter_mut().zip(monetary) {
            *amount = coerce_amount(line, &data, field)?;
        }
        let movement = amount_or_zero(&data, &fields.movement);
        let payment = amount_or_zero(&data, &fields.payment);
        let installment_count = parse_count(&data, &fields.installment_count);

        for (field, amount) in monetary.iter().zip(amounts) {
            data.insert(field.to_string(), Value::from(amount));
        }
        data.insert(fields.movement.clone(), Value::from(movement));
        data.insert(fields.payment.clone(), Value::from(payment));

        for (field, amount) in monetary.iter().zip(amounts) {
            data.insert(
                format!("{}{}", field, CURRENCY_SUFFIX),
                Value::String(format_brl(amount)),
            );
        }

        let [total, installment, ..] = amounts;
        data.insert(
            TOTAL_VALID_FIELD.to_string(),
            Value::Bool(total_amount_valid(total, installment, installment_count)),
        );
        data.insert(
            PAYMENT_CONSISTENCY_FIELD.to_string(),
            serde_json::to_value(payment_consistency(movement, payment))?,
        );

        Ok(EnrichedRecord { data })
    }
}

fn coerce_amount(line: u64, data: &RawRecord, field: &str) -> Result<f64> {
    let coercion_error = |value: &str, message: String| EtlError::FieldCoercionError {
        line,
        field: field.to_string(),
        value: value.to_string(),
        message,
    };

    let raw = data
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| coercion_error("", "column is missing".to_string()))?;
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|e: std::num::ParseFloatError| coercion_error(raw, e.to_string()))?;
    if !amount.is_finite() {
        return Err(coercion_error(raw, "value is not a finite number".to_string()));
    }
    Ok(amount)
}

fn amount_or_zero(data: &RawRecord, field: &str) -> f64 {
    data.get(field)
        .and_then(Value::as_str)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|amount| amount.is_finite())
        .unwrap_or(0.0)
}

/// Leading integer of the count column: `"3.7"`, `"3x"` and `"3e2"` all
/// count as 3. No leading digits means no count.
fn parse_count(data: &RawRecord, field: &str) -> Option<i64> {
    let raw = data.get(field).and_then(Value::as_str)?.trim_start();
    let (negative, unsigned) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    let count: i64 = unsigned[..digits_end].parse().ok()?;
    Some(if negative { -count } else { count })
}

/// Runs every row of `input` through the validator, in input order.
pub fn validate_contracts<R: Read, C: ConfigProvider + ?Sized>(
    input: R,
    config: &C,
) -> Result<ValidationReport> {
    let fields = config.field_names();
    let rows = RowReader::new(input, config.delimiter())?;

    let missing = rows.missing_columns(fields);
    if !missing.is_empty() {
        tracing::warn!("Input header is missing columns: {}", missing.join(", "));
    }

    let validator = ContractValidator::new(fields, config.audit_rejected_identifiers());
    let mut report = ValidationReport::default();
    for row in rows {
        let (line, data) = row?;
        report.rows_read += 1;
        match validator.process(line, data) {
            RowOutcome::Enriched(record) => report.records.push(record),
            RowOutcome::Rejected(rejection) => report.rejections.push(rejection),
        }
    }

    Ok(report)
}

pub fn render_dump(report: &ValidationReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(&report.records)?)
}

pub struct ContractPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> ContractPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for ContractPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<u8>> {
        tracing::debug!("Reading contracts from: {}", self.config.input_path());
        let data = self.storage.read_file(self.config.input_path()).await?;
        tracing::debug!("Read {} bytes", data.len());
        Ok(data)
    }

    async fn transform(&self, input: Vec<u8>) -> Result<ValidationReport> {
        validate_contracts(input.as_slice(), &self.config)
    }

    async fn load(&self, report: &ValidationReport) -> Result<String> {
        let dump = render_dump(report)?;

        if let Some(output_path) = self.config.output_path() {
            let target = Path::new(output_path).join(OUTPUT_FILENAME);
            let target = target.to_string_lossy();
            tracing::debug!("Writing {} bytes to {}", dump.len(), target);
            self.storage.write_file(&target, dump.as_bytes()).await?;
        }

        Ok(dump)
    }
}
