//! Batch input and output for the command-line driver.

pub mod csv;
