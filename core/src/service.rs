//! The data-access contract consumed by the portal views, and its two
//! implementations.
//!
//! `MockDataService` answers from the in-memory `RecordStore` and the
//! keyword query interpreter. `SqlDataService` answers from SQLite and
//! forwards console text to it verbatim, standing in for the remote
//! query endpoint.
//!
//! Callers are trusted: ids passed in have already been authorised by
//! the session layer.

use crate::{
    config::{Backend, PortalConfig},
    enrich::{
        self, EnrichedAccount, EnrichedBranch, EnrichedEmployee, EnrichedLoan, EnrichedTransaction,
    },
    error::{PortalError, PortalResult},
    model::{Account, Bank, Loan, Transaction, User},
    query,
    seed::RecordStore,
    store::PortalStore,
    types::{AccountNo, BankId, BranchId, EmployeeId, Row, UserId},
};
use std::time::Duration;

pub trait DataService {
    /// Short stable name, used in logs.
    fn name(&self) -> &'static str;

    fn list_users(&self) -> PortalResult<Vec<User>>;
    fn get_user(&self, user_id: UserId) -> PortalResult<Option<User>>;

    fn list_accounts_by_user(&self, user_id: UserId) -> PortalResult<Vec<EnrichedAccount>>;
    fn list_accounts_all(&self) -> PortalResult<Vec<EnrichedAccount>>;

    fn list_loans_by_user(&self, user_id: UserId) -> PortalResult<Vec<EnrichedLoan>>;
    fn list_loans_all(&self) -> PortalResult<Vec<EnrichedLoan>>;

    /// Newest first.
    fn list_transactions_by_account(
        &self,
        account_no: AccountNo,
    ) -> PortalResult<Vec<EnrichedTransaction>>;
    /// Newest first.
    fn list_transactions_all(&self) -> PortalResult<Vec<EnrichedTransaction>>;

    fn list_employees(&self) -> PortalResult<Vec<EnrichedEmployee>>;
    fn get_employee(&self, employee_id: EmployeeId) -> PortalResult<Option<EnrichedEmployee>>;

    fn list_branches(&self) -> PortalResult<Vec<EnrichedBranch>>;
    fn get_branch(&self, branch_id: BranchId) -> PortalResult<Option<EnrichedBranch>>;

    fn list_banks(&self) -> PortalResult<Vec<Bank>>;
    fn get_bank(&self, bank_id: BankId) -> PortalResult<Option<Bank>>;

    /// Run console text and return its rows.
    fn run_query(&self, text: &str) -> PortalResult<Vec<Row>>;
}

/// Build the service selected by `config`.
pub fn open_service(config: &PortalConfig) -> anyhow::Result<Box<dyn DataService>> {
    let records = config.records()?;
    let service: Box<dyn DataService> = match config.backend {
        Backend::Mock => {
            let latency = match config.latency_ms {
                Some(ms) => SimulatedLatency::flat(Duration::from_millis(ms)),
                None => SimulatedLatency::per_call(),
            };
            Box::new(MockDataService::new(records, latency))
        }
        Backend::Sqlite => {
            let store = PortalStore::open(&config.database)?;
            store.prepare(&records)?;
            Box::new(SqlDataService::new(store))
        }
    };
    log::info!("data service: {}", service.name());
    Ok(service)
}

// ── Simulated latency ──────────────────────────────────────────

/// The kinds of call the mock distinguishes when simulating latency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Lookup,
    /// Per-user listings and the small bank/branch tables.
    ShortListing,
    Listing,
    TransactionListing,
    Query,
}

/// Artificial delay applied before the mock answers a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedLatency {
    None,
    Flat(Duration),
    /// Per-call delays that mimic a network round trip.
    PerCall,
}

impl SimulatedLatency {
    pub fn none() -> Self { Self::None }

    pub fn flat(delay: Duration) -> Self {
        if delay.is_zero() { Self::None } else { Self::Flat(delay) }
    }

    pub fn per_call() -> Self { Self::PerCall }

    pub fn delay_for(&self, call: Call) -> Duration {
        match self {
            SimulatedLatency::None => Duration::ZERO,
            SimulatedLatency::Flat(d) => *d,
            SimulatedLatency::PerCall => Duration::from_millis(match call {
                Call::Lookup             => 300,
                Call::ShortListing       => 400,
                Call::Listing            => 500,
                Call::TransactionListing => 600,
                Call::Query              => 800,
            }),
        }
    }
}

// ── Mock backend ───────────────────────────────────────────────

pub struct MockDataService {
    records: RecordStore,
    latency: SimulatedLatency,
}

impl MockDataService {
    pub fn new(records: RecordStore, latency: SimulatedLatency) -> Self {
        Self { records, latency }
    }

    /// Seed data, no delay.
    pub fn seeded() -> Self {
        Self::new(RecordStore::seeded(), SimulatedLatency::none())
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    fn wait(&self, call: Call) {
        let delay = self.latency.delay_for(call);
        if !delay.is_zero() {
            log::trace!("mock latency {call:?}: {delay:?}");
            std::thread::sleep(delay);
        }
    }

    fn enrich_accounts<'a>(
        &self,
        accounts: impl Iterator<Item = &'a Account>,
    ) -> Vec<EnrichedAccount> {
        accounts
            .map(|a| enrich::enrich_account(a, &self.records.branches, &self.records.users))
            .collect()
    }

    fn enrich_loans<'a>(&self, loans: impl Iterator<Item = &'a Loan>) -> Vec<EnrichedLoan> {
        loans.map(|l| enrich::enrich_loan(l, &self.records.banks)).collect()
    }

    fn enrich_transactions<'a>(
        &self,
        txs: impl Iterator<Item = &'a Transaction>,
    ) -> Vec<EnrichedTransaction> {
        let mut out: Vec<EnrichedTransaction> = txs
            .map(|t| enrich::enrich_transaction(t, &self.records.branches))
            .collect();
        enrich::sort_newest_first(&mut out);
        out
    }
}

impl DataService for MockDataService {
    fn name(&self) -> &'static str { "mock" }

    fn list_users(&self) -> PortalResult<Vec<User>> {
        self.wait(Call::Listing);
        Ok(self.records.users.clone())
    }

    fn get_user(&self, user_id: UserId) -> PortalResult<Option<User>> {
        self.wait(Call::Lookup);
        Ok(self.records.user(user_id).cloned())
    }

    fn list_accounts_by_user(&self, user_id: UserId) -> PortalResult<Vec<EnrichedAccount>> {
        self.wait(Call::ShortListing);
        Ok(self.enrich_accounts(self.records.accounts.iter().filter(|a| a.user_id == user_id)))
    }

    fn list_accounts_all(&self) -> PortalResult<Vec<EnrichedAccount>> {
        self.wait(Call::Listing);
        Ok(self.enrich_accounts(self.records.accounts.iter()))
    }

    fn list_loans_by_user(&self, user_id: UserId) -> PortalResult<Vec<EnrichedLoan>> {
        self.wait(Call::ShortListing);
        Ok(self.enrich_loans(self.records.loans.iter().filter(|l| l.user_id == user_id)))
    }

    fn list_loans_all(&self) -> PortalResult<Vec<EnrichedLoan>> {
        self.wait(Call::Listing);
        Ok(self.enrich_loans(self.records.loans.iter()))
    }

    fn list_transactions_by_account(
        &self,
        account_no: AccountNo,
    ) -> PortalResult<Vec<EnrichedTransaction>> {
        self.wait(Call::Listing);
        Ok(self.enrich_transactions(
            self.records
                .transactions
                .iter()
                .filter(|t| t.account_no1 == account_no || t.account_no2 == account_no),
        ))
    }

    fn list_transactions_all(&self) -> PortalResult<Vec<EnrichedTransaction>> {
        self.wait(Call::TransactionListing);
        Ok(self.enrich_transactions(self.records.transactions.iter()))
    }

    fn list_employees(&self) -> PortalResult<Vec<EnrichedEmployee>> {
        self.wait(Call::Listing);
        Ok(self
            .records
            .employees
            .iter()
            .map(|e| enrich::enrich_employee(e, &self.records.branches))
            .collect())
    }

    fn get_employee(&self, employee_id: EmployeeId) -> PortalResult<Option<EnrichedEmployee>> {
        self.wait(Call::Lookup);
        Ok(self
            .records
            .employee(employee_id)
            .map(|e| enrich::enrich_employee(e, &self.records.branches)))
    }

    fn list_branches(&self) -> PortalResult<Vec<EnrichedBranch>> {
        self.wait(Call::ShortListing);
        Ok(self
            .records
            .branches
            .iter()
            .map(|b| enrich::enrich_branch(b, &self.records.banks))
            .collect())
    }

    fn get_branch(&self, branch_id: BranchId) -> PortalResult<Option<EnrichedBranch>> {
        self.wait(Call::Lookup);
        Ok(self
            .records
            .branch(branch_id)
            .map(|b| enrich::enrich_branch(b, &self.records.banks)))
    }

    fn list_banks(&self) -> PortalResult<Vec<Bank>> {
        self.wait(Call::ShortListing);
        Ok(self.records.banks.clone())
    }

    fn get_bank(&self, bank_id: BankId) -> PortalResult<Option<Bank>> {
        self.wait(Call::Lookup);
        Ok(self.records.bank(bank_id).cloned())
    }

    fn run_query(&self, text: &str) -> PortalResult<Vec<Row>> {
        self.wait(Call::Query);
        query::run_query(text, &self.records)
    }
}

// ── SQL backend ────────────────────────────────────────────────

pub struct SqlDataService {
    store: PortalStore,
}

impl SqlDataService {
    pub fn new(store: PortalStore) -> Self {
        Self { store }
    }

    /// In-memory database loaded with `records` and sealed read-only.
    pub fn in_memory(records: &RecordStore) -> PortalResult<Self> {
        let store = PortalStore::in_memory()?;
        store.prepare(records)?;
        Ok(Self::new(store))
    }
}

impl DataService for SqlDataService {
    fn name(&self) -> &'static str { "sqlite" }

    fn list_users(&self) -> PortalResult<Vec<User>> {
        self.store.all_users()
    }

    fn get_user(&self, user_id: UserId) -> PortalResult<Option<User>> {
        self.store.user(user_id)
    }

    fn list_accounts_by_user(&self, user_id: UserId) -> PortalResult<Vec<EnrichedAccount>> {
        self.store.accounts_for_user(user_id)
    }

    fn list_accounts_all(&self) -> PortalResult<Vec<EnrichedAccount>> {
        self.store.all_accounts()
    }

    fn list_loans_by_user(&self, user_id: UserId) -> PortalResult<Vec<EnrichedLoan>> {
        self.store.loans_for_user(user_id)
    }

    fn list_loans_all(&self) -> PortalResult<Vec<EnrichedLoan>> {
        self.store.all_loans()
    }

    fn list_transactions_by_account(
        &self,
        account_no: AccountNo,
    ) -> PortalResult<Vec<EnrichedTransaction>> {
        self.store.transactions_for_account(account_no)
    }

    fn list_transactions_all(&self) -> PortalResult<Vec<EnrichedTransaction>> {
        self.store.all_transactions()
    }

    fn list_employees(&self) -> PortalResult<Vec<EnrichedEmployee>> {
        self.store.all_employees()
    }

    fn get_employee(&self, employee_id: EmployeeId) -> PortalResult<Option<EnrichedEmployee>> {
        self.store.employee(employee_id)
    }

    fn list_branches(&self) -> PortalResult<Vec<EnrichedBranch>> {
        self.store.all_branches()
    }

    fn get_branch(&self, branch_id: BranchId) -> PortalResult<Option<EnrichedBranch>> {
        self.store.branch(branch_id)
    }

    fn list_banks(&self) -> PortalResult<Vec<Bank>> {
        self.store.all_banks()
    }

    fn get_bank(&self, bank_id: BankId) -> PortalResult<Option<Bank>> {
        self.store.bank(bank_id)
    }

    fn run_query(&self, text: &str) -> PortalResult<Vec<Row>> {
        if text.trim().is_empty() {
            return Err(PortalError::EmptyQuery);
        }
        let rows = self.store.execute_raw(text);
        match &rows {
            Ok(r) => log::debug!("console query returned {} rows", r.len()),
            Err(e) => log::warn!("console query failed: {e}"),
        }
        rows
    }
}
