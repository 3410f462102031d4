//! Page-level handlers: what each portal screen needs, computed from a
//! data service for a given session.
//!
//! RULE: every handler takes the caller's `Session` explicitly and checks
//! its role before touching data. Customers only ever see records keyed
//! by their own user id.

use crate::{
    aggregate::{
        self, direction, filter, loan_statuses, transfer_totals, CustomerOverview, Direction,
        EmployeeOverview, LoanStatus, TransferTotals,
    },
    clock::PortalClock,
    config::PortalConfig,
    enrich::{EnrichedAccount, EnrichedEmployee, EnrichedLoan, EnrichedTransaction},
    error::{PortalError, PortalResult},
    model::User,
    service::{open_service, DataService},
    session::{Credentials, Directory, Role, Session},
    types::{AccountNo, Row},
};
use serde::{Deserialize, Serialize};

/// How many console queries the history keeps.
pub const QUERY_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountsView {
    pub accounts:      Vec<EnrichedAccount>,
    pub total_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoansView {
    pub loans:             Vec<LoanStatus>,
    pub total_loan_amount: f64,
    pub average_interest:  f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectedTransaction {
    #[serde(flatten)]
    pub transaction: EnrichedTransaction,
    pub direction:   Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountActivity {
    /// `None` when the customer has no accounts.
    pub account_no:   Option<AccountNo>,
    pub transactions: Vec<DirectedTransaction>,
    pub totals:       TransferTotals,
}

/// A filtered listing with the counts shown above the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<T> {
    pub items:   Vec<T>,
    pub matched: usize,
    pub total:   usize,
    /// Sum of the listing's amount column over the matched items.
    pub amount:  f64,
    /// Mean of the amount column. Only the accounts listing fills it in.
    pub average: f64,
}

impl<T> SearchResult<T> {
    fn new(items: Vec<T>, total: usize, amount: f64) -> Self {
        Self { matched: items.len(), items, total, amount, average: 0.0 }
    }
}

pub struct Portal {
    service:   Box<dyn DataService>,
    directory: Directory,
    clock:     PortalClock,
}

impl Portal {
    pub fn new(service: Box<dyn DataService>, directory: Directory, clock: PortalClock) -> Self {
        Self { service, directory, clock }
    }

    pub fn from_config(config: &PortalConfig) -> anyhow::Result<Self> {
        Ok(Self::new(open_service(config)?, config.directory()?, config.clock))
    }

    pub fn service(&self) -> &dyn DataService {
        self.service.as_ref()
    }

    // ── Session ────────────────────────────────────────────────

    pub fn login(&self, creds: &Credentials) -> PortalResult<Session> {
        self.directory.login(creds)
    }

    pub fn logout(&self, session: Session) {
        self.directory.logout(session)
    }

    // ── Customer screens ───────────────────────────────────────

    fn own_user(&self, session: &Session) -> PortalResult<User> {
        let user_id = session.customer_id()?;
        self.service.get_user(user_id)?.ok_or_else(|| {
            log::warn!("session {} refers to missing user {user_id}", session.token);
            PortalError::NotAuthenticated
        })
    }

    pub fn customer_dashboard(&self, session: &Session) -> PortalResult<CustomerOverview> {
        let user = self.own_user(session)?;
        let accounts = self.service.list_accounts_by_user(user.user_id)?;
        let loans = self.service.list_loans_by_user(user.user_id)?;
        let recent = match accounts.first() {
            Some(first) => self.service.list_transactions_by_account(first.account.account_no)?,
            None => Vec::new(),
        };
        Ok(aggregate::customer_overview(&user, &accounts, &loans, &recent))
    }

    pub fn customer_accounts(&self, session: &Session) -> PortalResult<AccountsView> {
        let user_id = session.customer_id()?;
        let accounts = self.service.list_accounts_by_user(user_id)?;
        Ok(AccountsView {
            total_balance: aggregate::sum(&accounts, |a| a.account.balance),
            accounts,
        })
    }

    pub fn customer_loans(&self, session: &Session) -> PortalResult<LoansView> {
        let user_id = session.customer_id()?;
        let loans = self.service.list_loans_by_user(user_id)?;
        Ok(LoansView {
            total_loan_amount: aggregate::sum(&loans, |l| l.loan.loan_amount),
            average_interest:  aggregate::average(&loans, |l| l.loan.interest),
            loans:             loan_statuses(&loans, self.clock.now()),
        })
    }

    /// Transactions of one of the customer's accounts, each marked sent or
    /// received. `None` selects the first account.
    pub fn customer_activity(
        &self,
        session: &Session,
        account_no: Option<AccountNo>,
    ) -> PortalResult<AccountActivity> {
        let user_id = session.customer_id()?;
        let accounts = self.service.list_accounts_by_user(user_id)?;

        let selected = match account_no {
            Some(no) if accounts.iter().any(|a| a.account.account_no == no) => Some(no),
            Some(no) => {
                log::warn!("user {user_id} asked for account {no} they do not hold");
                return Err(PortalError::Forbidden { required: Role::Customer });
            }
            None => accounts.first().map(|a| a.account.account_no),
        };

        let Some(selected) = selected else {
            return Ok(AccountActivity {
                account_no:   None,
                transactions: Vec::new(),
                totals:       TransferTotals::default(),
            });
        };

        let txs = self.service.list_transactions_by_account(selected)?;
        Ok(AccountActivity {
            account_no:   Some(selected),
            totals:       transfer_totals(&txs, selected),
            transactions: txs
                .into_iter()
                .map(|t| DirectedTransaction { direction: direction(&t, selected), transaction: t })
                .collect(),
        })
    }

    // ── Employee screens ───────────────────────────────────────

    pub fn employee_dashboard(&self, session: &Session) -> PortalResult<EmployeeOverview> {
        session.require_role(Role::Employee)?;
        let users = self.service.list_users()?;
        let accounts = self.service.list_accounts_all()?;
        let loans = self.service.list_loans_all()?;
        let branches = self.service.list_branches()?;
        Ok(aggregate::employee_overview(&users, &accounts, &loans, &branches))
    }

    pub fn search_users(&self, session: &Session, query: &str) -> PortalResult<SearchResult<User>> {
        session.require_role(Role::Employee)?;
        let users = self.service.list_users()?;
        let hits = filter(&users, query);
        Ok(SearchResult::new(hits, users.len(), 0.0))
    }

    pub fn search_accounts(
        &self,
        session: &Session,
        query: &str,
    ) -> PortalResult<SearchResult<EnrichedAccount>> {
        session.require_role(Role::Employee)?;
        let accounts = self.service.list_accounts_all()?;
        let hits = filter(&accounts, query);
        // The balance cards cover every account, not just the matches.
        let total_balance = aggregate::sum(&accounts, |a| a.account.balance);
        let average = aggregate::average(&accounts, |a| a.account.balance);
        Ok(SearchResult { average, ..SearchResult::new(hits, accounts.len(), total_balance) })
    }

    pub fn search_transactions(
        &self,
        session: &Session,
        query: &str,
    ) -> PortalResult<SearchResult<EnrichedTransaction>> {
        session.require_role(Role::Employee)?;
        let txs = self.service.list_transactions_all()?;
        let hits = filter(&txs, query);
        let amount = aggregate::sum(&hits, |t| t.transaction.transaction_amount);
        Ok(SearchResult::new(hits, txs.len(), amount))
    }

    pub fn search_loans(
        &self,
        session: &Session,
        query: &str,
    ) -> PortalResult<SearchResult<EnrichedLoan>> {
        session.require_role(Role::Employee)?;
        let loans = self.service.list_loans_all()?;
        let hits = filter(&loans, query);
        let amount = aggregate::sum(&hits, |l| l.loan.loan_amount);
        Ok(SearchResult::new(hits, loans.len(), amount))
    }

    pub fn search_employees(
        &self,
        session: &Session,
        query: &str,
    ) -> PortalResult<SearchResult<EnrichedEmployee>> {
        session.require_role(Role::Employee)?;
        let employees = self.service.list_employees()?;
        let hits = filter(&employees, query);
        Ok(SearchResult::new(hits, employees.len(), 0.0))
    }

    /// The SQL console. Blank text is refused before reaching the service.
    pub fn console(&self, session: &Session, text: &str) -> PortalResult<Vec<Row>> {
        session.require_role(Role::Employee)?;
        if text.trim().is_empty() {
            return Err(PortalError::EmptyQuery);
        }
        let rows = self.service.run_query(text)?;
        log::info!("console ({}): {} rows for {:?}", self.service.name(), rows.len(), text);
        Ok(rows)
    }

    /// `console`, adding the text to `history` only when it ran.
    pub fn console_recorded(
        &self,
        session: &Session,
        text: &str,
        history: &mut QueryHistory,
    ) -> PortalResult<Vec<Row>> {
        let rows = self.console(session, text)?;
        history.record(text);
        Ok(rows)
    }

    /// The console history is an employee screen like the console itself.
    pub fn console_history<'h>(
        &self,
        session: &Session,
        history: &'h QueryHistory,
    ) -> PortalResult<&'h [String]> {
        session.require_role(Role::Employee)?;
        Ok(history.entries())
    }
}

/// Recent console queries, newest first, without consecutive repeats.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryHistory {
    entries: Vec<String>,
}

impl QueryHistory {
    pub fn record(&mut self, query: &str) {
        if self.entries.first().map(String::as_str) == Some(query) {
            return;
        }
        self.entries.insert(0, query.to_string());
        self.entries.truncate(QUERY_HISTORY_LIMIT);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Forget everything; called whenever the signed-in user changes.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
