//! Human-readable document numbers and SKUs.

use branchdesk_core::{DomainError, DomainResult};

pub const ORDER_PREFIX: &str = "SO";
pub const INVOICE_PREFIX: &str = "INV";

/// `<prefix>-<sequence>` with the sequence zero-padded to six digits.
pub fn document_number(prefix: &str, sequence: u32) -> String {
    format!("{prefix}-{sequence:06}")
}

/// `SO-000001`.
pub fn order_number(sequence: u32) -> String {
    document_number(ORDER_PREFIX, sequence)
}

/// `INV-000001`.
pub fn invoice_number(sequence: u32) -> String {
    document_number(INVOICE_PREFIX, sequence)
}

/// SKU from a category name: first three characters upper-cased, then the
/// sequence zero-padded to four digits (`Electronics`, 12 → `ELE-0012`).
pub fn sku(category: &str, sequence: u32) -> DomainResult<String> {
    let code: String = category
        .trim()
        .chars()
        .take(3)
        .flat_map(char::to_uppercase)
        .collect();
    if code.is_empty() {
        return Err(DomainError::validation("category cannot be empty"));
    }
    Ok(format!("{code}-{sequence:04}"))
}
