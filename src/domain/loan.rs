use serde::{Deserialize, Serialize};

/// Borrower contact details carried on a loan application.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(default)]
pub struct PersonalInfo {
    pub firstname: String,
    pub lastname: String,
    #[serde(rename = "DOB")]
    pub dob: String,
    pub email: String,
    pub mobile: String,
}

/// Monthly borrower cash flows used during underwriting.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct FinancialInfo {
    pub monthly_salary: i64,
    pub monthly_rent: i64,
    pub other_expenditure: i64,
    pub monthly_loan_payment: i64,
}

/// The canonical per-loan record held by the ledger.
///
/// Every field defaults to its zero value when absent from an inbound payload,
/// and unknown fields are ignored.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct LoanApplication {
    pub id: String,
    pub property_id: String,
    pub land_id: String,
    pub permit_id: String,
    pub buyer_id: String,
    #[serde(rename = "appraiserApplicationId")]
    pub appraisal_application_id: String,
    pub sales_contract_id: String,
    pub personal_info: PersonalInfo,
    pub financial_info: FinancialInfo,
    pub status: String,
    pub requested_amount: i64,
    pub fair_market_value: i64,
    pub approved_amount: i64,
    pub deal_amount: i64,
    /// Decremented by every settlement. Not floored at zero.
    pub outstanding_settlement_amount: i64,
    /// Annual rate as a whole-number percentage.
    pub all_in_rate: i64,
    pub reviewer_id: String,
    pub last_modified_date: String,
}

impl LoanApplication {
    /// Reduces the outstanding amount by a settlement.
    ///
    /// Overpayment drives the balance negative; it is neither rejected nor clamped.
    pub fn settle(&mut self, amount: i64) -> crate::error::Result<()> {
        self.outstanding_settlement_amount = self
            .outstanding_settlement_amount
            .checked_sub(amount)
            .ok_or(crate::error::LedgerError::ArithmeticOverflow {
                context: "outstanding settlement amount",
            })?;
        Ok(())
    }
}
