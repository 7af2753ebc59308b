use crate::error::{LedgerError, Result};
use std::io::Read;

/// One row of a batch file: an operation name and its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub operation: String,
    pub args: Vec<String>,
}

impl TryFrom<csv::StringRecord> for Invocation {
    type Error = LedgerError;

    fn try_from(record: csv::StringRecord) -> Result<Self> {
        let mut fields = record.iter().map(str::to_string);
        let operation = fields
            .next()
            .filter(|op| !op.is_empty())
            .ok_or_else(|| LedgerError::missing("invocation", "operation name"))?;
        Ok(Self {
            operation,
            args: fields.collect(),
        })
    }
}

/// Reads invocations from a CSV source.
///
/// The first row is a header and is skipped. Rows may have any number of fields;
/// the first is the operation and the rest are its arguments. Fields are trimmed,
/// and arguments containing commas (such as JSON payloads) must be quoted.
pub struct InvocationReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> InvocationReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields one invocation per row.
    pub fn invocations(self) -> impl Iterator<Item = Result<Invocation>> {
        self.reader
            .into_records()
            .map(|record| record.map_err(LedgerError::from).and_then(Invocation::try_from))
    }
}
