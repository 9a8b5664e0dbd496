//! Journal posting engine
//!
//! The `Ledger` owns the chart of accounts, all journal entries, and
//! per-account running balances. It enforces double-entry rules:
//!
//! # Invariants
//!
//! - A POSTED entry always balances to the currency's minor unit
//! - Every posted line has exactly one of debit/credit non-zero
//! - Balances are only ever changed by post and void, as one unit
//! - Posted entries are never edited; corrections go through
//!   void (in-place compensation) or reverse (mirror draft)

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, Utc};
use tracing::info;

use core_kernel::{AccountId, Currency, JournalEntryId, Money};

use crate::account::Account;
use crate::entry::{EntryLine, EntryStatus, EntryType, JournalEntry};
use crate::error::LedgerError;

/// The double-entry ledger
#[derive(Debug)]
pub struct Ledger {
    /// Chart of accounts
    accounts: HashMap<AccountId, Account>,
    /// Account display numbers already taken
    account_numbers: HashSet<String>,
    /// All journal entries
    entries: HashMap<JournalEntryId, JournalEntry>,
    /// Creation order, for ledger listings
    entry_order: Vec<JournalEntryId>,
    /// Entry sequence numbers already taken
    entry_numbers: HashSet<String>,
    /// Running account balances, oriented to each account's normal side
    balances: HashMap<AccountId, Money>,
    /// Next candidate for automatic entry numbering
    next_entry_seq: u64,
    /// Ledger currency
    currency: Currency,
}

impl Ledger {
    /// Creates an empty ledger in the given currency
    pub fn new(currency: Currency) -> Self {
        Self {
            accounts: HashMap::new(),
            account_numbers: HashSet::new(),
            entries: HashMap::new(),
            entry_order: Vec::new(),
            entry_numbers: HashSet::new(),
            balances: HashMap::new(),
            next_entry_seq: 1,
            currency,
        }
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    // ------------------------------------------------------------------
    // Account registry
    // ------------------------------------------------------------------

    /// Adds an account to the chart of accounts
    pub fn add_account(&mut self, account: Account) -> Result<AccountId, LedgerError> {
        if self.accounts.contains_key(&account.id()) {
            return Err(LedgerError::AccountAlreadyExists(account.id().to_string()));
        }
        if !self.account_numbers.insert(account.number().to_string()) {
            return Err(LedgerError::DuplicateAccountNumber(
                account.number().to_string(),
            ));
        }

        let account_id = account.id();
        self.balances.insert(account_id, Money::zero(self.currency));
        self.accounts.insert(account_id, account);
        Ok(account_id)
    }

    /// Gets an account by ID
    pub fn get_account(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    /// Iterates all accounts
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.values()
    }

    /// Renames an account
    pub fn rename_account(
        &mut self,
        id: &AccountId,
        name: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))?;
        account.rename(name);
        Ok(())
    }

    /// Activates or deactivates an account; inactive accounts reject new postings
    pub fn set_account_active(&mut self, id: &AccountId, active: bool) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .get_mut(id)
            .ok_or_else(|| LedgerError::AccountNotFound(id.to_string()))?;
        if active {
            account.activate();
        } else {
            account.deactivate();
        }
        Ok(())
    }

    /// Returns the current running balance of an account
    pub fn get_balance(&self, id: &AccountId) -> Option<Money> {
        self.balances.get(id).copied()
    }

    // ------------------------------------------------------------------
    // Draft management
    // ------------------------------------------------------------------

    /// Registers a new draft entry
    pub fn create_entry(&mut self, entry: JournalEntry) -> Result<JournalEntryId, LedgerError> {
        if !entry.is_draft() {
            return Err(LedgerError::invalid_status("create", entry.status));
        }
        if let Some(number) = &entry.entry_number {
            if !self.entry_numbers.insert(number.clone()) {
                return Err(LedgerError::DuplicateEntryNumber(number.clone()));
            }
        }

        let id = entry.id;
        self.entries.insert(id, entry);
        self.entry_order.push(id);
        Ok(id)
    }

    /// Gets an entry by ID
    pub fn get_entry(&self, id: &JournalEntryId) -> Option<&JournalEntry> {
        self.entries.get(id)
    }

    /// Iterates entries in creation order
    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entry_order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Replaces a draft's date, description, and lines. Posted and void
    /// entries are immutable.
    pub fn update_draft(
        &mut self,
        id: &JournalEntryId,
        entry_date: NaiveDate,
        description: impl Into<String>,
        lines: Vec<EntryLine>,
    ) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| LedgerError::EntryNotFound(id.to_string()))?;
        if !entry.is_draft() {
            return Err(LedgerError::invalid_status("edit", entry.status));
        }

        entry.entry_date = entry_date;
        entry.description = description.into();
        entry.lines = lines;
        entry.version += 1;
        entry.updated_at = Utc::now();
        Ok(())
    }

    /// Optimistic concurrency guard: a caller that read the entry at
    /// version N passes N back with its mutation and is rejected if
    /// another writer got there first
    pub fn ensure_version(
        &self,
        id: &JournalEntryId,
        expected: Option<u32>,
    ) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| LedgerError::EntryNotFound(id.to_string()))?;
        match expected {
            Some(expected) if expected != entry.version => Err(LedgerError::VersionConflict {
                entity: id.to_string(),
                expected,
                actual: entry.version,
            }),
            _ => Ok(()),
        }
    }

    /// Hard-deletes a draft entry
    pub fn delete_draft(&mut self, id: &JournalEntryId) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| LedgerError::EntryNotFound(id.to_string()))?;
        if !entry.is_draft() {
            return Err(LedgerError::invalid_status("delete", entry.status));
        }

        if let Some(number) = &entry.entry_number {
            self.entry_numbers.remove(number);
        }
        self.entries.remove(id);
        self.entry_order.retain(|e| e != id);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Posting
    // ------------------------------------------------------------------

    /// Validates that a line set could post: at least one line, every
    /// line single-sided, and total debits equal total credits within
    /// the currency's minor unit.
    pub fn validate_balance(&self, lines: &[EntryLine]) -> Result<(), LedgerError> {
        if lines.is_empty() {
            return Err(LedgerError::NoLines);
        }

        let mut debits = Money::zero(self.currency);
        let mut credits = Money::zero(self.currency);

        for line in lines {
            if !line.is_single_sided() {
                let reason = if line.debit.is_zero() && line.credit.is_zero() {
                    "line has neither debit nor credit"
                } else if !line.debit.is_zero() && !line.credit.is_zero() {
                    "line has both debit and credit"
                } else {
                    "line amount must be positive"
                };
                return Err(LedgerError::InvalidLine {
                    account: line.account_id.to_string(),
                    reason: reason.to_string(),
                });
            }

            debits = debits
                .checked_add(&line.debit)
                .map_err(|e| LedgerError::Calculation(e.to_string()))?;
            credits = credits
                .checked_add(&line.credit)
                .map_err(|e| LedgerError::Calculation(e.to_string()))?;
        }

        if !debits.balances_with(&credits) {
            return Err(LedgerError::Unbalanced {
                debits: debits.amount(),
                credits: credits.amount(),
                difference: (debits.amount() - credits.amount()).abs(),
            });
        }

        Ok(())
    }

    /// Posts a draft entry, atomically applying its lines to account
    /// balances. Returns the id of the auto-reversal draft when the
    /// entry is an Adjusting entry carrying a reversal descriptor.
    pub fn post(
        &mut self,
        id: &JournalEntryId,
        posted_by: impl Into<String>,
    ) -> Result<Option<JournalEntryId>, LedgerError> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| LedgerError::EntryNotFound(id.to_string()))?;
        if !entry.is_draft() {
            return Err(LedgerError::invalid_status("post", entry.status));
        }

        self.validate_balance(&entry.lines)?;

        for line in &entry.lines {
            let account = self
                .accounts
                .get(&line.account_id)
                .ok_or_else(|| LedgerError::AccountNotFound(line.account_id.to_string()))?;
            if !account.is_active() {
                return Err(LedgerError::AccountInactive(line.account_id.to_string()));
            }
        }

        // All checks passed; the rest cannot fail, so the commit is
        // all-or-nothing.
        let deltas = self.line_deltas(&self.entries[id].lines, false);
        self.apply_deltas(&deltas);

        let number = match self.entries[id].entry_number.clone() {
            Some(number) => number,
            None => {
                let number = self.reserve_entry_number();
                self.entries.get_mut(id).expect("entry exists").entry_number = Some(number.clone());
                number
            }
        };

        let reversal = {
            let entry = self.entries.get_mut(id).expect("entry exists");
            let now = Utc::now();
            entry.status = EntryStatus::Posted;
            entry.posted_at = Some(now);
            entry.posted_by = Some(posted_by.into());
            entry.version += 1;
            entry.updated_at = now;

            if entry.entry_type == EntryType::Adjusting {
                entry.auto_reversal.map(|r| {
                    let mut draft =
                        JournalEntry::new(r.reversal_date, EntryType::Reversing, entry.description.clone());
                    draft.lines = entry.lines.iter().map(EntryLine::swapped).collect();
                    draft.reversal_of = Some(entry.id);
                    draft
                })
            } else {
                None
            }
        };

        let reversal_id = match reversal {
            Some(draft) => Some(self.create_entry(draft)?),
            None => None,
        };

        info!(entry = %id, number = %number, "posted journal entry");
        Ok(reversal_id)
    }

    /// Voids a posted entry: an in-place compensating adjustment that
    /// exactly negates the original postings, tracked for audit via
    /// the void stamp. The only corrective paths for a posted entry
    /// are void and reverse.
    pub fn void(
        &mut self,
        id: &JournalEntryId,
        reason: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| LedgerError::EntryNotFound(id.to_string()))?;
        if !entry.is_posted() {
            return Err(LedgerError::invalid_status("void", entry.status));
        }

        let deltas = self.line_deltas(&entry.lines, true);
        self.apply_deltas(&deltas);

        let entry = self.entries.get_mut(id).expect("entry exists");
        let now = Utc::now();
        entry.status = EntryStatus::Void;
        entry.voided_at = Some(now);
        entry.void_reason = Some(reason.into());
        entry.version += 1;
        entry.updated_at = now;

        info!(entry = %id, "voided journal entry");
        Ok(())
    }

    /// Creates a draft that mirrors a posted entry with debit and
    /// credit swapped, referencing the source. The source entry keeps
    /// its status; posting the mirror returns every touched account to
    /// its pre-source balance.
    pub fn reverse(&mut self, id: &JournalEntryId) -> Result<JournalEntryId, LedgerError> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| LedgerError::EntryNotFound(id.to_string()))?;
        if !entry.is_posted() {
            return Err(LedgerError::invalid_status("reverse", entry.status));
        }

        let mut draft = JournalEntry::new(
            Utc::now().date_naive(),
            EntryType::Reversing,
            format!("Reversal of {}", entry.entry_number.as_deref().unwrap_or("entry")),
        );
        draft.lines = entry.lines.iter().map(EntryLine::swapped).collect();
        draft.reversal_of = Some(entry.id);

        self.create_entry(draft)
    }

    /// Creates a draft with identical lines and none of the
    /// status-derived fields, for reuse as a template
    pub fn duplicate(&mut self, id: &JournalEntryId) -> Result<JournalEntryId, LedgerError> {
        let entry = self
            .entries
            .get(id)
            .ok_or_else(|| LedgerError::EntryNotFound(id.to_string()))?;

        let entry_type = match entry.entry_type {
            // A copy of a recurring entry is a single occurrence
            EntryType::Recurring => EntryType::Standard,
            other => other,
        };

        let mut draft = JournalEntry::new(Utc::now().date_naive(), entry_type, entry.description.clone());
        draft.lines = entry
            .lines
            .iter()
            .map(|l| EntryLine {
                id: uuid::Uuid::new_v4(),
                ..l.clone()
            })
            .collect();

        self.create_entry(draft)
    }

    // ------------------------------------------------------------------
    // Recurrence
    // ------------------------------------------------------------------

    /// Lists recurring entries whose next occurrence is due on or
    /// before `as_of`. The external scheduler calls duplicate+post for
    /// each and then `advance_recurrence`.
    pub fn due_recurring(&self, as_of: NaiveDate) -> Vec<JournalEntryId> {
        self.entries()
            .filter(|e| {
                e.recurrence_active()
                    && e.recurrence
                        .as_ref()
                        .is_some_and(|r| r.next_occurrence <= as_of)
            })
            .map(|e| e.id)
            .collect()
    }

    /// Moves a recurring entry's next occurrence forward one period.
    /// Returns the new occurrence date, or None once the recurrence has
    /// run past its end date.
    pub fn advance_recurrence(
        &mut self,
        id: &JournalEntryId,
    ) -> Result<Option<NaiveDate>, LedgerError> {
        let entry = self
            .entries
            .get_mut(id)
            .ok_or_else(|| LedgerError::EntryNotFound(id.to_string()))?;
        let Some(recurrence) = entry.recurrence.as_mut() else {
            return Ok(None);
        };

        let next = recurrence.frequency.next_after(recurrence.next_occurrence);
        recurrence.next_occurrence = next;
        entry.updated_at = Utc::now();

        match recurrence.end_date {
            Some(end) if next > end => Ok(None),
            _ => Ok(Some(next)),
        }
    }

    // ------------------------------------------------------------------
    // Numbering
    // ------------------------------------------------------------------

    /// Returns the number the next posted entry would receive, without
    /// reserving it
    pub fn next_entry_number(&self) -> String {
        let mut seq = self.next_entry_seq;
        loop {
            let candidate = format!("JE-{:04}", seq);
            if !self.entry_numbers.contains(&candidate) {
                return candidate;
            }
            seq += 1;
        }
    }

    fn reserve_entry_number(&mut self) -> String {
        loop {
            let candidate = format!("JE-{:04}", self.next_entry_seq);
            self.next_entry_seq += 1;
            if self.entry_numbers.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    // ------------------------------------------------------------------
    // Balance maintenance
    // ------------------------------------------------------------------

    /// Computes per-account balance deltas for a line set. A debit
    /// increases debit-normal accounts and decreases credit-normal
    /// accounts; credits are symmetric. `negate` inverts the whole set
    /// (used by void).
    fn line_deltas(&self, lines: &[EntryLine], negate: bool) -> Vec<(AccountId, Money)> {
        lines
            .iter()
            .map(|line| {
                let account = &self.accounts[&line.account_id];
                let signed = if account.account_type().is_debit_normal() {
                    line.debit - line.credit
                } else {
                    line.credit - line.debit
                };
                (line.account_id, if negate { -signed } else { signed })
            })
            .collect()
    }

    fn apply_deltas(&mut self, deltas: &[(AccountId, Money)]) {
        for (account_id, delta) in deltas {
            let balance = self
                .balances
                .get_mut(account_id)
                .expect("balance exists for every account");
            *balance = *balance + *delta;
        }
    }
}
