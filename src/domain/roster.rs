use super::participant::{Participant, SharePercent};
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One configured participant: who it is and what share it takes of every loan.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub share_percent: SharePercent,
}

impl RosterEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>, share_percent: SharePercent) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            share_percent,
        }
    }

    /// A fresh ledger record for this entry with no positions.
    pub fn to_participant(&self) -> Participant {
        Participant::new(self.id.clone(), self.name.clone(), self.share_percent)
    }
}

/// Ordered list of participants supplied by the caller.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(transparent)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    /// Builds a roster, rejecting empty or duplicate identifiers.
    pub fn new(entries: Vec<RosterEntry>) -> Result<Self> {
        let roster = Self { entries };
        roster.validate()?;
        Ok(roster)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if entry.id.is_empty() {
                return Err(LedgerError::InvalidConfig(
                    "roster entry with empty id".to_string(),
                ));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(LedgerError::InvalidConfig(format!(
                    "duplicate roster entry {:?}",
                    entry.id
                )));
            }
        }
        Ok(())
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.id.as_str())
    }
}
