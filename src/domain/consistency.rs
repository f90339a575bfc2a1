use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentConsistency {
    #[serde(rename = "Pagamento consistente")]
    Consistent,
    #[serde(rename = "Pagamento inconsistente")]
    Inconsistent,
}

/// Compares the stated total with the installment schedule after rounding
/// both to whole units (half away from zero), which absorbs cent-level drift.
/// A missing installment count makes the schedule undefined, so the total
/// is reported as invalid.
pub fn total_amount_valid(
    total_amount: f64,
    installment_amount: f64,
    installment_count: Option<i64>,
) -> bool {
    match installment_count {
        Some(count) => total_amount.round() == (installment_amount * count as f64).round(),
        None => false,
    }
}

/// Moving more money than was paid is inconsistent. Missing amounts must
/// already have been defaulted to zero by the caller.
pub fn payment_consistency(movement_amount: f64, payment_amount: f64) -> PaymentConsistency {
    if movement_amount > payment_amount {
        PaymentConsistency::Inconsistent
    } else {
        PaymentConsistency::Consistent
    }
}
