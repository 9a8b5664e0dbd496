//! Journal entry DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{AccountId, Currency, Money};
use domain_ledger::{EntryLine, EntryStatus, EntryType, JournalEntry, RecurrenceFrequency};

#[derive(Debug, Deserialize)]
pub struct EntryLineRequest {
    pub account_id: Uuid,
    #[serde(default)]
    pub debit: Option<Decimal>,
    #[serde(default)]
    pub credit: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

impl EntryLineRequest {
    pub fn into_line(self, currency: Currency) -> EntryLine {
        let account_id = AccountId::from(self.account_id);
        let mut line = match (self.debit, self.credit) {
            (Some(d), _) if !d.is_zero() => {
                EntryLine::debit(account_id, Money::new(d, currency))
            }
            (_, Some(c)) => EntryLine::credit(account_id, Money::new(c, currency)),
            _ => EntryLine::debit(account_id, Money::zero(currency)),
        };
        if let Some(description) = self.description {
            line = line.with_description(description);
        }
        line
    }
}

#[derive(Debug, Deserialize)]
pub struct RecurrenceRequest {
    pub frequency: RecurrenceFrequency,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    pub entry_date: NaiveDate,
    #[serde(default)]
    pub entry_type: Option<EntryType>,
    pub description: String,
    pub lines: Vec<EntryLineRequest>,
    #[serde(default)]
    pub entry_number: Option<String>,
    #[serde(default)]
    pub recurrence: Option<RecurrenceRequest>,
    #[serde(default)]
    pub auto_reversal_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEntryRequest {
    pub entry_date: NaiveDate,
    pub description: String,
    pub lines: Vec<EntryLineRequest>,
    /// Version the caller last read; a mismatch rejects the update
    #[serde(default)]
    pub version: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct VoidEntryRequest {
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub version: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct EntryLineResponse {
    pub account_id: Uuid,
    pub debit: Decimal,
    pub credit: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub id: Uuid,
    pub entry_number: Option<String>,
    pub entry_date: NaiveDate,
    pub entry_type: EntryType,
    pub status: EntryStatus,
    pub description: String,
    pub lines: Vec<EntryLineResponse>,
    pub total_debits: Decimal,
    pub total_credits: Decimal,
    pub reversal_of: Option<Uuid>,
    pub posted_at: Option<DateTime<Utc>>,
    pub posted_by: Option<String>,
    pub voided_at: Option<DateTime<Utc>>,
    pub void_reason: Option<String>,
    pub version: u32,
    pub created_at: DateTime<Utc>,
}

impl EntryResponse {
    pub fn from_entry(entry: &JournalEntry, currency: Currency) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            entry_number: entry.entry_number.clone(),
            entry_date: entry.entry_date,
            entry_type: entry.entry_type,
            status: entry.status,
            description: entry.description.clone(),
            lines: entry
                .lines
                .iter()
                .map(|l| EntryLineResponse {
                    account_id: *l.account_id.as_uuid(),
                    debit: l.debit.amount(),
                    credit: l.credit.amount(),
                    description: l.description.clone(),
                })
                .collect(),
            total_debits: entry.total_debits(currency).amount(),
            total_credits: entry.total_credits(currency).amount(),
            reversal_of: entry.reversal_of.map(|id| *id.as_uuid()),
            posted_at: entry.posted_at,
            posted_by: entry.posted_by.clone(),
            voided_at: entry.voided_at,
            void_reason: entry.void_reason.clone(),
            version: entry.version,
            created_at: entry.created_at,
        }
    }
}

/// Returned by post when an adjusting entry spawned its reversal draft
#[derive(Debug, Serialize)]
pub struct PostEntryResponse {
    #[serde(flatten)]
    pub entry: EntryResponse,
    pub auto_reversal_entry_id: Option<Uuid>,
}
