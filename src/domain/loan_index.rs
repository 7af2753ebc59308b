use super::loan::LoanApplication;
use serde::{Deserialize, Serialize};

/// Append-only list of loan snapshots, one per creation, in creation order.
///
/// Snapshots are taken at creation time and are not refreshed by settlement.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(transparent)]
pub struct LoanIndex {
    loans: Vec<LoanApplication>,
}

impl LoanIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, loan: LoanApplication) {
        self.loans.push(loan);
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    pub fn loans(&self) -> &[LoanApplication] {
        &self.loans
    }

    /// Every snapshot recorded for `loan_id`, oldest first.
    pub fn entries_for<'a>(&'a self, loan_id: &'a str) -> impl Iterator<Item = &'a LoanApplication> + 'a {
        self.loans.iter().filter(move |l| l.id == loan_id)
    }
}

impl From<Vec<LoanApplication>> for LoanIndex {
    fn from(loans: Vec<LoanApplication>) -> Self {
        Self { loans }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(id: &str) -> LoanApplication {
        LoanApplication {
            id: id.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_append_preserves_order() {
        let mut index = LoanIndex::new();
        index.append(loan("b"));
        index.append(loan("a"));
        index.append(loan("c"));

        let ids: Vec<&str> = index.loans().iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut index = LoanIndex::new();
        index.append(loan("la1"));
        index.append(loan("la1"));
        assert_eq!(index.len(), 2);
        assert_eq!(index.entries_for("la1").count(), 2);
    }
}
