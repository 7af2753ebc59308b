use crate::error::{LedgerError, Result};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct ResultRow<'a> {
    operation: &'a str,
    status: &'a str,
    payload: &'a str,
}

/// Writes one CSV row per invocation outcome: `operation,status,payload`.
///
/// Successful payloads are written as UTF-8 text (lossily if the store returned
/// non-UTF-8 bytes); failures carry the error message.
pub struct ResultWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ResultWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_result(&mut self, operation: &str, outcome: &Result<Vec<u8>>) -> Result<()> {
        let (status, payload) = match outcome {
            Ok(bytes) => ("ok", String::from_utf8_lossy(bytes).into_owned()),
            Err(e) => ("error", e.to_string()),
        };
        self.writer.serialize(ResultRow {
            operation,
            status,
            payload: &payload,
        })?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(LedgerError::from)
    }
}
