use crate::domain::consistency::PaymentConsistency;
use serde::{Deserialize, Serialize};

/// One CSV row, keyed by header name in column order.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Suffix of the formatted-currency companion of a monetary column.
pub const CURRENCY_SUFFIX: &str = "BRL";
pub const TOTAL_VALID_FIELD: &str = "valorTotalValido";
pub const PAYMENT_CONSISTENCY_FIELD: &str = "consistenciaPagamento";

/// Column names of the contract layout. Every field can be remapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldNames {
    pub identifier: String,
    pub total: String,
    pub installment_count: String,
    pub installment: String,
    pub delay_interest: String,
    pub penalty: String,
    pub other_charges: String,
    pub tax: String,
    pub discount: String,
    pub current_value: String,
    pub movement: String,
    pub payment: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            identifier: "nrCpfCnpj".to_string(),
            total: "vlTotal".to_string(),
            installment_count: "qtPrestacoes".to_string(),
            installment: "vlPresta".to_string(),
            delay_interest: "vlMora".to_string(),
            penalty: "vlMulta".to_string(),
            other_charges: "vlOutAcr".to_string(),
            tax: "vlIof".to_string(),
            discount: "vlDescon".to_string(),
            current_value: "vlAtual".to_string(),
            movement: "vlMovimento".to_string(),
            payment: "vlPag".to_string(),
        }
    }
}

impl FieldNames {
    /// Monetary columns that must parse, in companion output order.
    pub fn required_monetary(&self) -> [&str; 8] {
        [
            self.total.as_str(),
            self.installment.as_str(),
            self.delay_interest.as_str(),
            self.penalty.as_str(),
            self.other_charges.as_str(),
            self.tax.as_str(),
            self.discount.as_str(),
            self.current_value.as_str(),
        ]
    }

    /// Columns that must be present in the header row.
    pub fn required_columns(&self) -> Vec<&str> {
        let mut columns = vec![self.identifier.as_str(), self.installment_count.as_str()];
        columns.extend(self.required_monetary());
        columns
    }

    pub fn all(&self) -> [(&'static str, &str); 12] {
        [
            ("identifier", self.identifier.as_str()),
            ("total", self.total.as_str()),
            ("installment_count", self.installment_count.as_str()),
            ("installment", self.installment.as_str()),
            ("delay_interest", self.delay_interest.as_str()),
            ("penalty", self.penalty.as_str()),
            ("other_charges", self.other_charges.as_str()),
            ("tax", self.tax.as_str()),
            ("discount", self.discount.as_str()),
            ("current_value", self.current_value.as_str()),
            ("movement", self.movement.as_str()),
            ("payment", self.payment.as_str()),
        ]
    }
}

/// A row whose identifier passed validation, serialized flat: the original
/// columns with monetary values as numbers, the `<column>BRL` companions and
/// the two verdicts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EnrichedRecord {
    pub data: RawRecord,
}

impl EnrichedRecord {
    pub fn number(&self, field: &str) -> Option<f64> {
        self.data.get(field).and_then(|v| v.as_f64())
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(|v| v.as_str())
    }

    pub fn total_valid(&self) -> Option<bool> {
        self.data.get(TOTAL_VALID_FIELD).and_then(|v| v.as_bool())
    }

    pub fn payment_consistency(&self) -> Option<PaymentConsistency> {
        self.data
            .get(PAYMENT_CONSISTENCY_FIELD)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RejectionReason {
    InvalidIdentifier { value: String },
    FieldCoercion { field: String, message: String },
}

/// A dropped row, identified by its line in the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub line: u64,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub records: Vec<EnrichedRecord>,
    pub rejections: Vec<Rejection>,
    pub rows_read: usize,
}

impl ValidationReport {
    pub fn invalid_identifiers(&self) -> usize {
        self.rejections
            .iter()
            .filter(|r| matches!(r.reason, RejectionReason::InvalidIdentifier { .. }))
            .count()
    }

    pub fn coercion_failures(&self) -> usize {
        self.rejections.len() - self.invalid_identifiers()
    }
}
