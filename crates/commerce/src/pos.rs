//! Point-of-sale cart.

use serde::{Deserialize, Serialize};

use branchdesk_core::{DomainError, DomainResult, ProductId};

use crate::money::{Money, Rate};
use crate::order::TAX_RATE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Digital,
}

/// A sellable product as shown on the POS grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosProduct {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub sku: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl CartLine {
    pub fn total(&self) -> Money {
        self.unit_price
            .checked_mul(self.quantity)
            .unwrap_or(Money::ZERO)
    }
}

/// Cart totals. The discount comes off the subtotal before tax.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
    discount: Rate,
    payment_method: PaymentMethod,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across lines.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn discount(&self) -> Rate {
        self.discount
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Add one unit; increments the existing line for the same product.
    pub fn add(&mut self, product: &PosProduct) -> DomainResult<()> {
        if product.price.is_negative() {
            return Err(DomainError::validation("price cannot be negative"));
        }
        match self.lines.iter_mut().find(|line| line.product_id == product.id) {
            Some(line) => {
                let quantity = line
                    .quantity
                    .checked_add(1)
                    .filter(|q| line.unit_price.checked_mul(*q).is_some())
                    .ok_or_else(|| DomainError::OutOfRange("quantity"))?;
                line.quantity = quantity;
            }
            None => self.lines.push(CartLine {
                product_id: product.id,
                sku: product.sku.clone(),
                name: product.name.clone(),
                unit_price: product.price,
                quantity: 1,
            }),
        }
        Ok(())
    }

    /// Set a line's quantity. Zero or less removes the line.
    pub fn update_quantity(&mut self, product_id: ProductId, quantity: i64) -> DomainResult<()> {
        if quantity <= 0 {
            self.remove(product_id);
            return Ok(());
        }
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
            .ok_or_else(|| DomainError::not_found(format!("cart line for {product_id}")))?;
        if line.unit_price.checked_mul(quantity).is_none() {
            return Err(DomainError::OutOfRange("quantity"));
        }
        line.quantity = quantity;
        Ok(())
    }

    /// Returns whether a line was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    pub fn set_discount(&mut self, discount: Rate) {
        self.discount = discount;
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    /// Empty the cart after a completed sale; the payment method is kept.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount = Rate::ZERO;
    }

    /// Fails when an amount no longer fits in cents.
    pub fn totals(&self) -> DomainResult<CartTotals> {
        let subtotal = Money::try_sum(self.lines.iter().map(CartLine::total))?;
        let discount = subtotal.apply(self.discount);
        let taxable = subtotal.checked_sub(discount)?;
        let tax = taxable.apply(TAX_RATE);
        Ok(CartTotals {
            subtotal,
            discount,
            tax,
            total: taxable.checked_add(tax)?,
        })
    }
}
