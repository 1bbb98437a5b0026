//! Stock levels and replenishment status.

use serde::{Deserialize, Serialize};

use branchdesk_core::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Good,
    Low,
    Critical,
    Out,
}

impl StockStatus {
    /// `Out` at or below zero, `Critical` under a quarter of the reorder
    /// point, `Low` under the reorder point, otherwise `Good`.
    pub fn classify(available: i64, reorder_point: i64) -> Self {
        if available <= 0 {
            StockStatus::Out
        } else if available.saturating_mul(4) < reorder_point {
            StockStatus::Critical
        } else if available < reorder_point {
            StockStatus::Low
        } else {
            StockStatus::Good
        }
    }

    /// Needs replenishing.
    pub fn needs_attention(&self) -> bool {
        !matches!(self, StockStatus::Good)
    }
}

/// On-hand and reserved quantities for one product at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    pub sku: String,
    pub product_name: String,
    pub warehouse: String,
    pub bin: Option<String>,
    pub qty_on_hand: i64,
    pub qty_reserved: i64,
    pub reorder_point: i64,
}

impl StockLevel {
    pub fn new(
        sku: impl Into<String>,
        product_name: impl Into<String>,
        warehouse: impl Into<String>,
        qty_on_hand: i64,
        qty_reserved: i64,
        reorder_point: i64,
    ) -> DomainResult<Self> {
        if qty_on_hand < 0 || qty_reserved < 0 {
            return Err(DomainError::validation("quantities cannot be negative"));
        }
        if reorder_point < 0 {
            return Err(DomainError::validation("reorder point cannot be negative"));
        }
        Ok(Self {
            sku: sku.into(),
            product_name: product_name.into(),
            warehouse: warehouse.into(),
            bin: None,
            qty_on_hand,
            qty_reserved,
            reorder_point,
        })
    }

    pub fn with_bin(mut self, bin: impl Into<String>) -> Self {
        self.bin = Some(bin.into());
        self
    }

    /// On hand minus reserved; negative when over-reserved.
    pub fn available(&self) -> i64 {
        self.qty_on_hand.saturating_sub(self.qty_reserved)
    }

    pub fn status(&self) -> StockStatus {
        StockStatus::classify(self.available(), self.reorder_point)
    }
}

/// Count of levels per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    pub good: usize,
    pub low: usize,
    pub critical: usize,
    pub out: usize,
}

impl StockSummary {
    pub fn from_levels<'a>(levels: impl IntoIterator<Item = &'a StockLevel>) -> Self {
        levels
            .into_iter()
            .fold(Self::default(), |mut summary, level| {
                match level.status() {
                    StockStatus::Good => summary.good += 1,
                    StockStatus::Low => summary.low += 1,
                    StockStatus::Critical => summary.critical += 1,
                    StockStatus::Out => summary.out += 1,
                }
                summary
            })
    }

    pub fn total(&self) -> usize {
        self.good + self.low + self.critical + self.out
    }

    /// Items below their reorder point, including stock-outs.
    pub fn below_reorder_point(&self) -> usize {
        self.low + self.critical + self.out
    }
}
