use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the allocation, emission, scheduling and codec stages.
///
/// Every variant except [`EngineError::ProcessingFailure`] describes a
/// problem with the caller's input and is reported back verbatim.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount { amount: Decimal, reason: String },

    #[error("daily cap must be positive, got {0}")]
    InvalidCap(Decimal),

    #[error("start date {start} is after end date {end}")]
    EmptyRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("party ceiling {ceiling} exceeds total amount {total}")]
    InfeasibleAllocation { total: Decimal, ceiling: Decimal },

    #[error("malformed row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("internal error: {0}")]
    ProcessingFailure(String),
}

impl EngineError {
    pub fn invalid_amount(amount: Decimal, reason: impl Into<String>) -> Self {
        Self::InvalidAmount {
            amount,
            reason: reason.into(),
        }
    }

    pub fn malformed(row: usize, reason: impl Into<String>) -> Self {
        Self::MalformedRow {
            row,
            reason: reason.into(),
        }
    }

    /// HTTP-style status: 400 for caller input problems, 500 for internal faults.
    pub fn status(&self) -> u16 {
        match self {
            Self::ProcessingFailure(_) => 500,
            _ => 400,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status() < 500
    }
}

impl From<csv::Error> for EngineError {
    fn from(err: csv::Error) -> Self {
        let row = err
            .position()
            .map(|p| p.record() as usize)
            .unwrap_or_default();
        Self::MalformedRow {
            row,
            reason: err.to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
