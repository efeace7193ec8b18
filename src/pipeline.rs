//! Job boundary: primitive parameters in, a downloadable table or a
//! structured failure out.
//!
//! Each job validates everything up front, runs to completion, and either
//! returns the full output or nothing at all.

use crate::codec::{decode, encode, DecodeOptions};
use crate::core::bill::Bill;
use crate::core::error::{EngineError, EngineResult};
use crate::core::invoice::DocumentKind;
use crate::core::party::Party;
use crate::generation::allocator::AmountAllocator;
use crate::generation::config::{AmountRange, GenerationConfig};
use crate::generation::emitter::{EmissionParams, InvoiceEmitter};
use crate::scheduling::scheduler::{DailyCapScheduler, ScheduleConfig};
use crate::scheduling::summary::ScheduleSummary;
use chrono::NaiveDate;
use log::{error, info, warn};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const INVOICES_FILENAME: &str = "invoices.csv";

/// Where the parties of a generation job come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartySource {
    /// Party rows (`name, balance`) supplied by the caller.
    Manual(String),
    /// Parties synthesized by the allocator.
    Generated { total: Decimal, ceiling: Decimal },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_number: u64,
    pub product: String,
    pub rate_range: AmountRange,
    pub margin_range: AmountRange,
    pub kind: DocumentKind,
    pub parties: PartySource,
}

impl InvoiceRequest {
    /// Request with rate, margin and document kind taken from `config`.
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        start_number: u64,
        product: impl Into<String>,
        parties: PartySource,
        config: &GenerationConfig,
    ) -> Self {
        Self {
            start_date,
            end_date,
            start_number,
            product: product.into(),
            rate_range: config.rate_range,
            margin_range: config.margin_range,
            kind: config.document_kind,
            parties,
        }
    }

    fn emission_params(&self) -> EmissionParams {
        EmissionParams {
            start_date: self.start_date,
            end_date: self.end_date,
            start_number: self.start_number,
            product: self.product.clone(),
            rate_range: self.rate_range,
            margin_range: self.margin_range,
            kind: self.kind,
        }
    }
}

/// A finished job's attachment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobOutput {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
    pub rows: usize,
}

/// A failed job: an HTTP-style status and a human-readable message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobFailure {
    pub status: u16,
    pub message: String,
}

impl From<EngineError> for JobFailure {
    fn from(err: EngineError) -> Self {
        if err.is_client_error() {
            warn!("rejected job: {}", err);
        } else {
            error!("job failed: {}", err);
        }
        Self {
            status: err.status(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for JobFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}

/// Filename for a payment schedule processed on `today`.
pub fn payments_filename(today: NaiveDate) -> String {
    format!("payments_{}.csv", today.format("%Y-%m-%d"))
}

/// Generate invoices for the requested parties.
pub fn generate_invoices<R: Rng + ?Sized>(
    request: &InvoiceRequest,
    config: &GenerationConfig,
    rng: &mut R,
) -> Result<JobOutput, JobFailure> {
    run_generation(request, config, rng).map_err(JobFailure::from)
}

fn run_generation<R: Rng + ?Sized>(
    request: &InvoiceRequest,
    config: &GenerationConfig,
    rng: &mut R,
) -> EngineResult<JobOutput> {
    config.validate()?;
    let params = request.emission_params();
    params.validate()?;
    if request.start_number == 0 {
        return Err(EngineError::InvalidInput(
            "starting invoice number must be positive".into(),
        ));
    }

    let parties = match &request.parties {
        PartySource::Manual(text) => manual_parties(text, config)?,
        PartySource::Generated { total, ceiling } => {
            AmountAllocator::from_config(config).allocate(*total, *ceiling, rng)?
        }
    };
    info!(
        "generating {} invoices from {} to {} for {} parties",
        request.kind,
        request.start_date,
        request.end_date,
        parties.len()
    );

    let rows = InvoiceEmitter::from_config(config).emit(&parties, &params, rng)?;
    if rows.is_empty() {
        return Err(EngineError::ProcessingFailure("no invoices generated".into()));
    }
    Ok(JobOutput {
        filename: INVOICES_FILENAME.to_string(),
        content_type: CSV_CONTENT_TYPE,
        body: encode(&rows)?,
        rows: rows.len(),
    })
}

/// Decode caller-supplied party rows, optionally normalising names, and
/// merge repeated names so each party's invoices stay together.
fn manual_parties(text: &str, config: &GenerationConfig) -> EngineResult<Vec<Party>> {
    if text.trim().is_empty() {
        return Err(EngineError::InvalidInput("missing party data".into()));
    }
    let decoded: Vec<Party> = decode(text, &DecodeOptions::default())?;

    let mut merged: Vec<Party> = Vec::with_capacity(decoded.len());
    for mut party in decoded {
        if config.normalize_unregistered {
            party.name = party.name.normalized_unregistered();
        }
        match merged.iter_mut().find(|p| p.name == party.name) {
            Some(existing) => {
                existing.balance = existing
                    .balance
                    .checked_add(party.balance)
                    .ok_or_else(|| {
                        EngineError::invalid_amount(party.balance, "merged balance out of range")
                    })?;
            }
            None => merged.push(party),
        }
    }
    if merged.is_empty() {
        return Err(EngineError::InvalidInput("no valid party data found".into()));
    }
    Ok(merged)
}

/// Split the bills in `input` into a daily-capped payment schedule.
pub fn schedule_payments(
    input: &str,
    config: &ScheduleConfig,
    options: &DecodeOptions,
    today: NaiveDate,
) -> Result<(JobOutput, ScheduleSummary), JobFailure> {
    run_schedule(input, config, options, today).map_err(JobFailure::from)
}

fn run_schedule(
    input: &str,
    config: &ScheduleConfig,
    options: &DecodeOptions,
    today: NaiveDate,
) -> EngineResult<(JobOutput, ScheduleSummary)> {
    if input.trim().is_empty() {
        return Err(EngineError::InvalidInput("no input data provided".into()));
    }
    let scheduler = DailyCapScheduler::from_config(config)?;
    let bills: Vec<Bill> = decode(input, options)?;
    let rows = scheduler.schedule(&bills)?;
    if rows.is_empty() {
        return Err(EngineError::ProcessingFailure(
            "no payment records generated".into(),
        ));
    }

    let summary = ScheduleSummary::from_rows(&rows);
    let output = JobOutput {
        filename: payments_filename(today),
        content_type: CSV_CONTENT_TYPE,
        body: encode(&rows)?,
        rows: rows.len(),
    };
    Ok((output, summary))
}
