use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};

/// A contractual participation percentage in the range `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct SharePercent(u8);

impl SharePercent {
    pub fn new(value: i64) -> Result<Self> {
        if (0..=100).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(LedgerError::InvalidSharePercent(value))
        }
    }

    pub fn value(&self) -> i64 {
        i64::from(self.0)
    }

    /// Pro-rata portion of `amount`: `amount * percent / 100`, truncated toward zero.
    pub fn portion_of(&self, amount: i64) -> Result<i64> {
        let portion = i128::from(amount) * i128::from(self.0) / 100;
        // |portion| <= |amount| so this always fits
        i64::try_from(portion).map_err(|_| LedgerError::ArithmeticOverflow {
            context: "pro-rata share",
        })
    }
}

impl TryFrom<i64> for SharePercent {
    type Error = LedgerError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SharePercent> for i64 {
    fn from(percent: SharePercent) -> Self {
        percent.value()
    }
}

/// Simple-interest fee accrued on a position at each settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeAccrual {
    pub days: i64,
    pub days_per_year: i64,
}

impl Default for FeeAccrual {
    fn default() -> Self {
        Self {
            days: 30,
            days_per_year: 365,
        }
    }
}

impl FeeAccrual {
    /// `share_amount * days * annual_rate / (100 * days_per_year)`, truncated toward zero.
    pub fn accrue(&self, share_amount: i64, annual_rate_percent: i64) -> Result<i64> {
        let overflow = || LedgerError::ArithmeticOverflow {
            context: "settlement fee accrual",
        };
        let denominator = 100i128 * i128::from(self.days_per_year);
        if denominator == 0 {
            return Err(overflow());
        }
        let fee = i128::from(share_amount)
            .checked_mul(i128::from(self.days))
            .and_then(|v| v.checked_mul(i128::from(annual_rate_percent)))
            .ok_or_else(overflow)?
            / denominator;
        i64::try_from(fee).map_err(|_| overflow())
    }
}

/// A participant's exposure to one loan.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Asset {
    pub loan_id: String,
    /// Outstanding principal exposure. May go negative across repeated settlements.
    pub share_amount: i64,
    pub syndicated_amount: i64,
    pub settlement_fee: i64,
}

/// A financing entity and the positions it holds.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub share_percent: SharePercent,
    pub asset_list: Vec<Asset>,
}

impl Participant {
    pub fn new(id: impl Into<String>, name: impl Into<String>, share_percent: SharePercent) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            share_percent,
            asset_list: Vec::new(),
        }
    }

    /// Appends a new position for `loan_id` sized at this participant's pro-rata share.
    ///
    /// No deduplication: calling twice for the same loan yields two positions.
    pub fn add_position(&mut self, loan_id: &str, principal_amount: i64) -> Result<Asset> {
        let asset = Asset {
            loan_id: loan_id.to_string(),
            share_amount: self.share_percent.portion_of(principal_amount)?,
            syndicated_amount: principal_amount,
            settlement_fee: 0,
        };
        self.asset_list.push(asset.clone());
        Ok(asset)
    }

    /// Applies a settlement to every position on `loan_id` and returns how many matched.
    ///
    /// Each matching position accrues a fee on its pre-settlement share amount, then
    /// has this participant's portion of `settlement_amount` subtracted. Nothing is
    /// mutated if any position would overflow.
    pub fn apply_settlement(
        &mut self,
        loan_id: &str,
        annual_rate_percent: i64,
        settlement_amount: i64,
        accrual: FeeAccrual,
    ) -> Result<usize> {
        let portion = self.share_percent.portion_of(settlement_amount)?;

        let mut updates = Vec::new();
        for (idx, asset) in self.asset_list.iter().enumerate() {
            if asset.loan_id != loan_id {
                continue;
            }
            let fee = accrual.accrue(asset.share_amount, annual_rate_percent)?;
            let settlement_fee =
                asset
                    .settlement_fee
                    .checked_add(fee)
                    .ok_or(LedgerError::ArithmeticOverflow {
                        context: "settlement fee",
                    })?;
            let share_amount =
                asset
                    .share_amount
                    .checked_sub(portion)
                    .ok_or(LedgerError::ArithmeticOverflow {
                        context: "position share amount",
                    })?;
            updates.push((idx, share_amount, settlement_fee));
        }

        for &(idx, share_amount, settlement_fee) in &updates {
            let asset = &mut self.asset_list[idx];
            asset.share_amount = share_amount;
            asset.settlement_fee = settlement_fee;
        }
        Ok(updates.len())
    }

    pub fn positions<'a>(&'a self, loan_id: &'a str) -> impl Iterator<Item = &'a Asset> + 'a {
        self.asset_list.iter().filter(move |a| a.loan_id == loan_id)
    }
}
