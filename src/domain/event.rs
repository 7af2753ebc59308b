use serde::{Deserialize, Serialize};

/// Notifications published on the event channel after a mutating operation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(tag = "eventType", rename_all = "camelCase")]
pub enum LedgerEvent {
    #[serde(rename_all = "camelCase")]
    LoanApplicationCreation { loan_id: String, description: String },
    #[serde(rename_all = "camelCase")]
    LoanSettlement { loan_id: String, amount: i64 },
}

impl LedgerEvent {
    pub fn created(loan_id: &str) -> Self {
        Self::LoanApplicationCreation {
            loan_id: loan_id.to_string(),
            description: format!("{loan_id} Successfully created"),
        }
    }

    pub fn settled(loan_id: &str, amount: i64) -> Self {
        Self::LoanSettlement {
            loan_id: loan_id.to_string(),
            amount,
        }
    }
}
