use serde::{Deserialize, Serialize};

use branchdesk_core::{DomainError, DomainResult};

const BPS_SCALE: i128 = 10_000;

/// Amount in the smallest currency unit (cents).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// `self × quantity`, or `None` on overflow.
    pub fn checked_mul(self, quantity: i64) -> Option<Money> {
        self.0.checked_mul(quantity).map(Money)
    }

    pub fn checked_add(self, rhs: Money) -> DomainResult<Money> {
        self.0
            .checked_add(rhs.0)
            .map(Money)
            .ok_or(DomainError::OutOfRange("amount"))
    }

    pub fn checked_sub(self, rhs: Money) -> DomainResult<Money> {
        self.0
            .checked_sub(rhs.0)
            .map(Money)
            .ok_or(DomainError::OutOfRange("amount"))
    }

    /// Sum of `amounts`; fails instead of wrapping.
    pub fn try_sum(amounts: impl IntoIterator<Item = Money>) -> DomainResult<Money> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, Money::checked_add)
    }

    /// `self × rate`, rounded half away from zero to whole cents.
    pub fn apply(self, rate: Rate) -> Money {
        Money(scale_round(i128::from(self.0), i128::from(rate.bps())))
    }

    /// `self × (1 − rate)`, rounded the same way as [`Money::apply`].
    pub fn discounted(self, rate: Rate) -> Money {
        Money(scale_round(i128::from(self.0), BPS_SCALE - i128::from(rate.bps())))
    }
}

/// `value × bps / 10_000` with half-away-from-zero rounding. Inputs are an
/// `i64` amount and a rate within `0..=10_000`, so the result fits in `i64`.
fn scale_round(value: i128, bps: i128) -> i64 {
    let product = value * bps;
    let half = BPS_SCALE / 2;
    let rounded = if product >= 0 {
        (product + half) / BPS_SCALE
    } else {
        -((-product + half) / BPS_SCALE)
    };
    rounded as i64
}

impl core::fmt::Display for Money {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// A percentage in basis points (`800` = 8%), between 0% and 100%.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Rate(u32);

impl Rate {
    pub const ZERO: Rate = Rate(0);
    pub const MAX_BPS: u32 = 10_000;

    pub fn from_bps(bps: u32) -> DomainResult<Self> {
        if bps > Self::MAX_BPS {
            return Err(DomainError::OutOfRange("rate"));
        }
        Ok(Self(bps))
    }

    /// Clamps to 100%.
    pub const fn saturating(bps: u32) -> Self {
        if bps > Self::MAX_BPS {
            Self(Self::MAX_BPS)
        } else {
            Self(bps)
        }
    }

    /// Whole percent, e.g. `Rate::percent(15)` for 15%.
    pub fn percent(percent: u32) -> DomainResult<Self> {
        let bps = percent
            .checked_mul(100)
            .ok_or_else(|| DomainError::OutOfRange("rate"))?;
        Self::from_bps(bps)
    }

    pub const fn bps(&self) -> u32 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u32> for Rate {
    type Error = DomainError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        Rate::from_bps(bps)
    }
}

impl From<Rate> for u32 {
    fn from(rate: Rate) -> u32 {
        rate.0
    }
}

impl core::fmt::Display for Rate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}
