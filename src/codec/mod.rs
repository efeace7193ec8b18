//! Tabular text codec for parties, bills, payments and invoices.

pub mod records;
pub mod tabular;

pub use tabular::{decode, encode, DecodeOptions, TabularRecord};
