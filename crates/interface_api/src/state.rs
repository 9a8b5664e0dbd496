//! Shared application state
//!
//! The ledger and document registry live in process behind one
//! RwLock, so every mutating operation runs serialized against the
//! balances it reads and writes, and reads proceed concurrently.

use std::sync::Arc;

use tokio::sync::RwLock;

use core_kernel::Currency;
use domain_documents::{ControlAccounts, DocumentRegistry};
use domain_ledger::{Ledger, StandardChartOfAccounts};

use crate::config::ApiConfig;
use crate::error::ApiError;

/// The composed bookkeeping engine
#[derive(Debug)]
pub struct Engine {
    pub ledger: Ledger,
    pub registry: DocumentRegistry,
}

impl Engine {
    /// Boots an engine with the standard chart of accounts
    pub fn bootstrap(currency: Currency) -> Result<Self, ApiError> {
        let mut ledger = Ledger::new(currency);
        for account in StandardChartOfAccounts::create_standard_accounts() {
            ledger
                .add_account(account)
                .map_err(|e| ApiError::Internal(e.to_string()))?;
        }
        let controls = ControlAccounts::from_chart(&ledger)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let registry = DocumentRegistry::new(controls);
        Ok(Self { ledger, registry })
    }

    pub fn currency(&self) -> Currency {
        self.ledger.currency()
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RwLock<Engine>>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(engine: Engine, config: ApiConfig) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
            config,
        }
    }
}

/// Parses the configured currency code
pub fn parse_currency(code: &str) -> Result<Currency, ApiError> {
    code.parse::<Currency>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}
