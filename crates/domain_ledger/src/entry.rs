//! Journal entry and entry line types
//!
//! A journal entry is an ordered set of debit/credit lines against
//! accounts. Drafts may be unbalanced and edited freely; posting is
//! gated by the balance check in the ledger.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{AccountId, JournalEntryId, Money};

/// Journal entry lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryStatus {
    Draft,
    Posted,
    Void,
}

/// Classification of a journal entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntryType {
    Standard,
    Adjusting,
    Closing,
    Reversing,
    Recurring,
}

/// How often a recurring entry fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecurrenceFrequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl RecurrenceFrequency {
    /// Returns the occurrence following `date`
    pub fn next_after(&self, date: NaiveDate) -> NaiveDate {
        match self {
            RecurrenceFrequency::Daily => date + Days::new(1),
            RecurrenceFrequency::Weekly => date + Days::new(7),
            RecurrenceFrequency::Biweekly => date + Days::new(14),
            RecurrenceFrequency::Monthly => date + Months::new(1),
            RecurrenceFrequency::Quarterly => date + Months::new(3),
            RecurrenceFrequency::Yearly => date + Months::new(12),
        }
    }
}

/// Recurrence descriptor carried as data; an external scheduler polls
/// `next_occurrence` and invokes duplicate+post for each occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurrence {
    pub frequency: RecurrenceFrequency,
    /// No occurrences after this date
    pub end_date: Option<NaiveDate>,
    /// Next date an occurrence is due
    pub next_occurrence: NaiveDate,
}

/// Auto-reversal descriptor for adjusting entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoReversal {
    /// Date the synthesized reversal entry is dated at
    pub reversal_date: NaiveDate,
}

/// A single debit or credit line in a journal entry
///
/// Exactly one of `debit`/`credit` must be non-zero for the entry to
/// post; drafts may hold invalid lines while being edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryLine {
    pub id: Uuid,
    pub account_id: AccountId,
    pub debit: Money,
    pub credit: Money,
    pub description: Option<String>,
}

impl EntryLine {
    /// Creates a debit line
    pub fn debit(account_id: AccountId, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            debit: amount,
            credit: Money::zero(amount.currency()),
            description: None,
        }
    }

    /// Creates a credit line
    pub fn credit(account_id: AccountId, amount: Money) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            debit: Money::zero(amount.currency()),
            credit: amount,
            description: None,
        }
    }

    /// Adds a description to the line
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns a copy with debit and credit swapped
    pub fn swapped(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id: self.account_id,
            debit: self.credit,
            credit: self.debit,
            description: self.description.clone(),
        }
    }

    /// True if exactly one side is non-zero and that side is positive
    pub fn is_single_sided(&self) -> bool {
        (self.debit.is_positive() && self.credit.is_zero())
            || (self.credit.is_positive() && self.debit.is_zero())
    }
}

/// A journal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Unique identifier
    pub id: JournalEntryId,
    /// Human-readable sequence number (assigned at creation or post)
    pub entry_number: Option<String>,
    /// Entry date
    pub entry_date: NaiveDate,
    /// Entry classification
    pub entry_type: EntryType,
    /// Lifecycle status
    pub status: EntryStatus,
    /// Description
    pub description: String,
    /// Ordered debit/credit lines
    pub lines: Vec<EntryLine>,
    /// Recurrence descriptor (Recurring entries)
    pub recurrence: Option<Recurrence>,
    /// Auto-reversal descriptor (Adjusting entries)
    pub auto_reversal: Option<AutoReversal>,
    /// Back-reference to the entry this one reverses
    pub reversal_of: Option<JournalEntryId>,
    /// When the entry was posted
    pub posted_at: Option<DateTime<Utc>>,
    /// Who posted the entry
    pub posted_by: Option<String>,
    /// When the entry was voided
    pub voided_at: Option<DateTime<Utc>>,
    /// Why the entry was voided
    pub void_reason: Option<String>,
    /// Version for optimistic concurrency
    pub version: u32,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl JournalEntry {
    /// Creates a new draft entry
    pub fn new(
        entry_date: NaiveDate,
        entry_type: EntryType,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JournalEntryId::new_v7(),
            entry_number: None,
            entry_date,
            entry_type,
            status: EntryStatus::Draft,
            description: description.into(),
            lines: Vec::new(),
            recurrence: None,
            auto_reversal: None,
            reversal_of: None,
            posted_at: None,
            posted_by: None,
            voided_at: None,
            void_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds a debit line
    pub fn debit(mut self, account_id: AccountId, amount: Money) -> Self {
        self.lines.push(EntryLine::debit(account_id, amount));
        self
    }

    /// Adds a credit line
    pub fn credit(mut self, account_id: AccountId, amount: Money) -> Self {
        self.lines.push(EntryLine::credit(account_id, amount));
        self
    }

    /// Adds a prepared line
    pub fn line(mut self, line: EntryLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Attaches a recurrence descriptor; the entry type becomes Recurring
    pub fn with_recurrence(mut self, frequency: RecurrenceFrequency, end_date: Option<NaiveDate>) -> Self {
        self.entry_type = EntryType::Recurring;
        self.recurrence = Some(Recurrence {
            frequency,
            end_date,
            next_occurrence: frequency.next_after(self.entry_date),
        });
        self
    }

    /// Attaches an auto-reversal descriptor
    pub fn with_auto_reversal(mut self, reversal_date: NaiveDate) -> Self {
        self.auto_reversal = Some(AutoReversal { reversal_date });
        self
    }

    /// Presets the human-readable number (collisions are rejected by the ledger)
    pub fn with_entry_number(mut self, number: impl Into<String>) -> Self {
        self.entry_number = Some(number.into());
        self
    }

    pub fn is_draft(&self) -> bool {
        self.status == EntryStatus::Draft
    }

    pub fn is_posted(&self) -> bool {
        self.status == EntryStatus::Posted
    }

    /// Sum of all debit lines
    pub fn total_debits(&self, currency: core_kernel::Currency) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(currency), |acc, l| acc + l.debit)
    }

    /// Sum of all credit lines
    pub fn total_credits(&self, currency: core_kernel::Currency) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(currency), |acc, l| acc + l.credit)
    }

    /// True while the recurrence has occurrences left to schedule
    pub fn recurrence_active(&self) -> bool {
        match &self.recurrence {
            Some(r) => r.end_date.map_or(true, |end| r.next_occurrence <= end),
            None => false,
        }
    }
}

/// Returns the last day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .expect("first of month is always valid");
    (first + Months::new(1)) - Days::new(1)
}
