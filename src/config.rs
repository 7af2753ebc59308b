use crate::domain::participant::FeeAccrual;
use crate::domain::roster::Roster;
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_INDEX_KEY: &str = "loanlist";
pub const DEFAULT_EVENT_NAME: &str = "evtSender";

/// How read-modify-write cycles treat concurrent writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsistencyMode {
    /// Plain put after read. Overlapping invocations can lose updates.
    #[default]
    LastWriteWins,
    /// Put only if the version read is still current, otherwise fail with
    /// `VersionConflict`. Conflicts are never retried.
    Optimistic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedgerConfig {
    pub roster: Roster,
    pub index_key: String,
    pub event_name: String,
    pub consistency: ConsistencyMode,
    pub accrual_days: i64,
    pub days_per_year: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            roster: Roster::default(),
            index_key: DEFAULT_INDEX_KEY.to_string(),
            event_name: DEFAULT_EVENT_NAME.to_string(),
            consistency: ConsistencyMode::default(),
            accrual_days: FeeAccrual::default().days,
            days_per_year: FeeAccrual::default().days_per_year,
        }
    }
}

impl LedgerConfig {
    pub fn with_roster(roster: Roster) -> Self {
        Self {
            roster,
            ..Self::default()
        }
    }

    /// Reads a JSON config file and validates it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| LedgerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.roster.validate()?;
        if self.index_key.is_empty() {
            return Err(LedgerError::InvalidConfig("indexKey is empty".to_string()));
        }
        if self.roster.get(&self.index_key).is_some() {
            return Err(LedgerError::InvalidConfig(format!(
                "participant id {:?} collides with the loan index key",
                self.index_key
            )));
        }
        if self.accrual_days < 0 || self.days_per_year <= 0 {
            return Err(LedgerError::InvalidConfig(
                "accrualDays must be >= 0 and daysPerYear > 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fee_accrual(&self) -> FeeAccrual {
        FeeAccrual {
            days: self.accrual_days,
            days_per_year: self.days_per_year,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.index_key, "loanlist");
        assert_eq!(config.event_name, "evtSender");
        assert_eq!(config.consistency, ConsistencyMode::LastWriteWins);
        assert_eq!(config.fee_accrual(), FeeAccrual::default());
        assert!(config.roster.is_empty());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"roster":[{{"id":"P1","name":"DeucheBank","sharePercent":80}},{{"id":"P2","name":"CITIBank","sharePercent":20}}],"consistency":"optimistic"}}"#
        )
        .unwrap();

        let config = LedgerConfig::load(file.path()).unwrap();
        assert_eq!(config.roster.entries().len(), 2);
        assert_eq!(config.consistency, ConsistencyMode::Optimistic);
        assert_eq!(config.index_key, "loanlist");
    }

    #[test]
    fn test_load_rejects_duplicate_roster() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"roster":[{{"id":"P1","sharePercent":80}},{{"id":"P1","sharePercent":20}}]}}"#
        )
        .unwrap();
        assert!(matches!(
            LedgerConfig::load(file.path()),
            Err(LedgerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_participant_cannot_shadow_index_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"roster":[{{"id":"loanlist","sharePercent":10}}]}}"#).unwrap();
        assert!(LedgerConfig::load(file.path()).is_err());
    }
}
