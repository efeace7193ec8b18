//! Daily-cap payment scheduling.

pub mod ledger;
pub mod scheduler;
pub mod summary;
