use std::num::ParseIntError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{operation}: missing {argument}")]
    MissingArgument {
        operation: String,
        argument: &'static str,
    },
    #[error("could not decode {shape}: {source}")]
    Decode {
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode {shape}: {source}")]
    Encode {
        shape: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid integer {value:?}: {source}")]
    Parse {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("no value stored under key {key:?}")]
    NotFound { key: String },
    #[error("state store failure: {0}")]
    StoreFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("version conflict on {key:?}: expected {expected:?}, actual {actual:?}")]
    VersionConflict {
        key: String,
        expected: Option<u64>,
        actual: Option<u64>,
    },
    #[error("arithmetic overflow in {context}")]
    ArithmeticOverflow { context: &'static str },
    #[error("share percent must be within 0..=100, got {0}")]
    InvalidSharePercent(i64),
    #[error("loan id {key:?} is reserved for a participant or the loan index")]
    ReservedKey { key: String },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    pub fn missing(operation: &str, argument: &'static str) -> Self {
        Self::MissingArgument {
            operation: operation.to_string(),
            argument,
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreFailure(Box::new(std::io::Error::other(message.into())))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for LedgerError {
    fn from(e: rocksdb::Error) -> Self {
        Self::StoreFailure(Box::new(e))
    }
}
