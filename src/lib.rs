//! # invoice-scheduler
//!
//! Party allocation, invoice generation and daily-cap payment scheduling.
//!
//! Two independent pipelines share one tabular codec:
//!
//! - **generation**: optionally split a total across synthesized parties,
//!   then invoice every party's balance in numbered, dated rows with drawn
//!   rates and margins.
//! - **scheduling**: turn dated bills into a day-by-day payment schedule
//!   where no party is paid more than the daily cap on any one day.
//!
//! ## Architecture
//!
//! - **core**: parties, bills, payments, invoice rows, money helpers and errors
//! - **generation**: AmountAllocator and InvoiceEmitter
//! - **scheduling**: DailyCapScheduler, per-party ledgers, schedule summaries
//! - **codec**: Row-oriented text decoding and encoding
//! - **pipeline**: Job boundary returning attachments or structured failures

pub mod codec;
pub mod core;
pub mod generation;
pub mod pipeline;
pub mod scheduling;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::codec::{decode, encode, DecodeOptions, TabularRecord};
    pub use crate::core::bill::{Bill, PaymentRow};
    pub use crate::core::error::{EngineError, EngineResult};
    pub use crate::core::invoice::{DocumentKind, InvoiceRow};
    pub use crate::core::party::{Party, PartyName};
    pub use crate::generation::allocator::AmountAllocator;
    pub use crate::generation::config::{AmountRange, GenerationConfig};
    pub use crate::generation::emitter::{EmissionParams, InvoiceEmitter};
    pub use crate::scheduling::scheduler::{DailyCapScheduler, ScheduleConfig};
    pub use crate::scheduling::summary::ScheduleSummary;
}
