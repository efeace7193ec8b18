pub mod bill;
pub mod error;
pub mod invoice;
pub mod money;
pub mod party;
