//! `branchdesk-commerce` — sales and stock arithmetic.
//!
//! Pure calculations behind the POS, order entry and stock screens. Amounts
//! are integer minor units, rates are basis points; nothing here does IO.

pub mod money;
pub mod numbering;
pub mod order;
pub mod pos;
pub mod stock;

pub use money::{Money, Rate};
pub use numbering::{invoice_number, order_number, sku};
pub use order::{OrderLine, OrderTotals, TAX_RATE, order_totals};
pub use pos::{Cart, CartLine, CartTotals, PaymentMethod, PosProduct};
pub use stock::{StockLevel, StockStatus, StockSummary};
