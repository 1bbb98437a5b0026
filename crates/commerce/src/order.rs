use serde::{Deserialize, Serialize};

use branchdesk_core::{DomainError, DomainResult, ProductId};

use crate::money::{Money, Rate};

/// Sales tax applied to order and POS subtotals (8%).
pub const TAX_RATE: Rate = Rate::saturating(800);

/// Order line: product, quantity, unit price and line discount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i64,
    /// Price in smallest currency unit (cents).
    pub unit_price: Money,
    pub discount: Rate,
}

impl OrderLine {
    pub fn new(
        product_id: ProductId,
        quantity: i64,
        unit_price: Money,
        discount: Rate,
    ) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }
        if unit_price.is_negative() {
            return Err(DomainError::validation("unit price cannot be negative"));
        }
        if unit_price.checked_mul(quantity).is_none() {
            return Err(DomainError::OutOfRange("line amount"));
        }
        Ok(Self {
            product_id,
            quantity,
            unit_price,
            discount,
        })
    }

    /// Amount before the line discount.
    pub fn gross(&self) -> Money {
        self.unit_price
            .checked_mul(self.quantity)
            .unwrap_or(Money::ZERO)
    }

    /// `quantity × unit_price × (1 − discount)`, rounded to the cent.
    pub fn line_total(&self) -> Money {
        self.gross().discounted(self.discount)
    }
}

/// Totals for a sales order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Tax at [`TAX_RATE`] on a subtotal that already reflects discounts.
    pub fn from_subtotal(subtotal: Money) -> DomainResult<Self> {
        let tax = subtotal.apply(TAX_RATE);
        Ok(Self {
            subtotal,
            tax,
            total: subtotal.checked_add(tax)?,
        })
    }
}

/// Subtotal is the sum of rounded line totals; tax is rounded once on the
/// subtotal. Fails when an amount no longer fits in cents.
pub fn order_totals(lines: &[OrderLine]) -> DomainResult<OrderTotals> {
    OrderTotals::from_subtotal(Money::try_sum(lines.iter().map(OrderLine::line_total))?)
}
