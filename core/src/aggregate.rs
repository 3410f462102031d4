//! Aggregate/filter layer: search, sums, averages, loan progress and the
//! per-page summaries built on top of them.
//!
//! Everything here is a pure function of its inputs. "Now" is always a
//! parameter so callers pick the clock (see `clock.rs`).

use crate::{
    enrich::{EnrichedAccount, EnrichedBranch, EnrichedEmployee, EnrichedLoan, EnrichedTransaction},
    model::User,
    types::{AccountNo, Date, Timestamp},
};
use chrono::{Duration, Months};
use serde::{Deserialize, Serialize};

/// Length of the approximate month used for loan progress.
pub const DAYS_PER_MONTH: i64 = 30;

/// How many transactions the customer dashboard shows.
pub const RECENT_TRANSACTION_LIMIT: usize = 5;

// ── Search ─────────────────────────────────────────────────────

/// A record that can be matched by the free-text search box.
pub trait Searchable {
    /// The stringified fields a query is matched against.
    fn search_fields(&self) -> Vec<String>;

    /// `needle` must already be lowercased.
    fn matches(&self, needle: &str) -> bool {
        self.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Keep the items where `query` is a case-insensitive substring of any
/// searched field. A blank query keeps everything.
pub fn filter<T: Searchable + Clone>(items: &[T], query: &str) -> Vec<T> {
    if query.trim().is_empty() {
        return items.to_vec();
    }
    let needle = query.to_lowercase();
    items.iter().filter(|item| item.matches(&needle)).cloned().collect()
}

// f64 Display prints integral values without a fraction (15000, not
// 15000.0), which is how amounts read on screen.
fn amount_text(value: f64) -> String {
    value.to_string()
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.user_id.to_string(),
            self.name.clone(),
            self.address.clone(),
            self.mobile_number.clone(),
        ]
    }
}

impl Searchable for EnrichedAccount {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.account.account_no.to_string(),
            self.user_name.clone(),
            self.branch_address.clone(),
            self.branch_name.clone(),
            amount_text(self.account.balance),
        ]
    }
}

impl Searchable for EnrichedTransaction {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.transaction.transaction_id.to_string(),
            self.transaction.account_no1.to_string(),
            self.transaction.account_no2.to_string(),
            amount_text(self.transaction.transaction_amount),
            self.branch_address.clone(),
        ]
    }
}

impl Searchable for EnrichedLoan {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.loan.loan_id.to_string(),
            self.loan.loan_type.clone(),
            self.bank_name.clone(),
            amount_text(self.loan.loan_amount),
        ]
    }
}

impl Searchable for EnrichedEmployee {
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.employee.employee_id.to_string(),
            self.employee.name.clone(),
            self.branch_address.clone(),
        ]
    }
}

// ── Sums and averages ──────────────────────────────────────────

pub fn sum<T>(items: &[T], field: impl Fn(&T) -> f64) -> f64 {
    items.iter().map(field).sum()
}

/// Arithmetic mean; 0 for an empty collection.
pub fn average<T>(items: &[T], field: impl Fn(&T) -> f64) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    sum(items, field) / items.len() as f64
}

// ── Loans ──────────────────────────────────────────────────────

/// Percentage of a loan's term that has elapsed at `now`, using 30-day
/// months. The issue date counts from midnight. A term that runs past
/// the last representable date never completes.
pub fn loan_progress(issue_date: Date, duration_months: u32, now: Timestamp) -> u8 {
    let start = issue_date.and_time(chrono::NaiveTime::MIN);
    let term = Duration::days(i64::from(duration_months) * DAYS_PER_MONTH);

    if start.checked_add_signed(term).is_some_and(|end| now >= end) {
        return 100;
    }

    let total_ms = term.num_milliseconds() as f64;
    let elapsed_ms = (now - start).num_milliseconds() as f64;
    let pct = (elapsed_ms / total_ms * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

/// Calendar end date of a loan. Days past the end of a short month are
/// clamped to its last day.
pub fn loan_end_date(issue_date: Date, duration_months: u32) -> Date {
    issue_date
        .checked_add_months(Months::new(duration_months))
        .unwrap_or(Date::MAX)
}

/// A customer's loan card: the loan plus its repayment timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanStatus {
    #[serde(flatten)]
    pub loan:     EnrichedLoan,
    pub progress: u8,
    pub end_date: Date,
}

pub fn loan_statuses(loans: &[EnrichedLoan], now: Timestamp) -> Vec<LoanStatus> {
    loans
        .iter()
        .map(|l| LoanStatus {
            loan:     l.clone(),
            progress: loan_progress(l.loan.issue_date, l.loan.duration, now),
            end_date: loan_end_date(l.loan.issue_date, l.loan.duration),
        })
        .collect()
}

// ── Transactions ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Sent,
    Received,
}

/// Classify a transaction relative to the account being viewed.
/// Only meaningful for transactions that involve `reference`.
pub fn direction(tx: &EnrichedTransaction, reference: AccountNo) -> Direction {
    if tx.transaction.account_no1 == reference {
        Direction::Sent
    } else {
        Direction::Received
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferTotals {
    pub sent:     f64,
    pub received: f64,
}

pub fn transfer_totals(txs: &[EnrichedTransaction], account: AccountNo) -> TransferTotals {
    TransferTotals {
        sent: txs
            .iter()
            .filter(|t| t.transaction.account_no1 == account)
            .map(|t| t.transaction.transaction_amount)
            .sum(),
        received: txs
            .iter()
            .filter(|t| t.transaction.account_no2 == account)
            .map(|t| t.transaction.transaction_amount)
            .sum(),
    }
}

// ── Dashboards ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeCount {
    pub name:  String,
    pub value: usize,
}

/// Loan counts per loan type, in first-seen order.
pub fn loans_by_type(loans: &[EnrichedLoan]) -> Vec<TypeCount> {
    let mut counts: Vec<TypeCount> = Vec::new();
    for loan in loans {
        match counts.iter_mut().find(|c| c.name == loan.loan.loan_type) {
            Some(entry) => entry.value += 1,
            None => counts.push(TypeCount { name: loan.loan.loan_type.clone(), value: 1 }),
        }
    }
    counts
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchTotals {
    pub name:     String,
    pub accounts: usize,
    pub balance:  f64,
}

/// One entry per branch, including branches with no accounts. Accounts
/// at branches not in `branches` are not counted.
pub fn accounts_by_branch(branches: &[EnrichedBranch], accounts: &[EnrichedAccount]) -> Vec<BranchTotals> {
    branches
        .iter()
        .map(|b| {
            let held: Vec<&EnrichedAccount> = accounts
                .iter()
                .filter(|a| a.account.branch_id == b.branch.branch_id)
                .collect();
            BranchTotals {
                name:     format!("Branch {}", b.branch.branch_id),
                accounts: held.len(),
                balance:  held.iter().map(|a| a.account.balance).sum(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerOverview {
    pub user:                User,
    pub total_balance:       f64,
    pub total_loan_amount:   f64,
    pub average_interest:    f64,
    pub account_count:       usize,
    pub loan_count:          usize,
    pub recent_transactions: Vec<EnrichedTransaction>,
}

/// Customer dashboard. `first_account_txs` are the transactions of the
/// customer's first account, newest first.
pub fn customer_overview(
    user: &User,
    accounts: &[EnrichedAccount],
    loans: &[EnrichedLoan],
    first_account_txs: &[EnrichedTransaction],
) -> CustomerOverview {
    CustomerOverview {
        user:                user.clone(),
        total_balance:       sum(accounts, |a| a.account.balance),
        total_loan_amount:   sum(loans, |l| l.loan.loan_amount),
        average_interest:    average(loans, |l| l.loan.interest),
        account_count:       accounts.len(),
        loan_count:          loans.len(),
        recent_transactions: first_account_txs
            .iter()
            .take(RECENT_TRANSACTION_LIMIT)
            .cloned()
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeOverview {
    pub user_count:         usize,
    pub account_count:      usize,
    pub loan_count:         usize,
    pub branch_count:       usize,
    pub total_balance:      f64,
    pub loans_by_type:      Vec<TypeCount>,
    pub accounts_by_branch: Vec<BranchTotals>,
}

pub fn employee_overview(
    users: &[User],
    accounts: &[EnrichedAccount],
    loans: &[EnrichedLoan],
    branches: &[EnrichedBranch],
) -> EmployeeOverview {
    EmployeeOverview {
        user_count:         users.len(),
        account_count:      accounts.len(),
        loan_count:         loans.len(),
        branch_count:       branches.len(),
        total_balance:      sum(accounts, |a| a.account.balance),
        loans_by_type:      loans_by_type(loans),
        accounts_by_branch: accounts_by_branch(branches, accounts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn midnight(y: i32, m: u32, d: u32) -> Timestamp {
        day(y, m, d).and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn progress_uses_thirty_day_months() {
        // 2024-01-01 -> 2024-07-01 is 182 days of a 360-day term.
        let p = loan_progress(day(2024, 1, 1), 12, midnight(2024, 7, 1));
        assert_eq!(p, 51);
    }

    #[test]
    fn progress_is_zero_on_issue_day_and_full_at_end() {
        assert_eq!(loan_progress(day(2024, 1, 1), 12, midnight(2024, 1, 1)), 0);
        // 360 days after 2024-01-01 is 2024-12-26.
        assert_eq!(loan_progress(day(2024, 1, 1), 12, midnight(2024, 12, 26)), 100);
        assert_eq!(loan_progress(day(2024, 1, 1), 12, midnight(2030, 1, 1)), 100);
    }

    #[test]
    fn progress_before_issue_clamps_to_zero() {
        assert_eq!(loan_progress(day(2024, 6, 1), 12, midnight(2024, 1, 1)), 0);
    }

    #[test]
    fn zero_length_loan_is_complete() {
        assert_eq!(loan_progress(day(2024, 6, 1), 0, midnight(2024, 6, 1)), 100);
    }

    #[test]
    fn term_past_the_calendar_never_completes() {
        assert_eq!(loan_progress(day(2024, 1, 1), 4_000_000, midnight(2024, 1, 1)), 0);
        assert_eq!(loan_progress(day(2024, 1, 1), u32::MAX, midnight(2030, 1, 1)), 0);
        assert_eq!(loan_progress(Date::MAX, 1, Date::MAX.and_hms_opt(0, 0, 0).unwrap()), 0);
        assert_eq!(loan_end_date(day(2024, 1, 1), u32::MAX), Date::MAX);
    }

    #[test]
    fn end_date_clamps_to_month_end() {
        assert_eq!(loan_end_date(day(2024, 1, 31), 1), day(2024, 2, 29));
        assert_eq!(loan_end_date(day(2024, 1, 15), 60), day(2029, 1, 15));
    }

    #[test]
    fn average_of_empty_is_zero() {
        let empty: Vec<f64> = vec![];
        assert_eq!(average(&empty, |v| *v), 0.0);
        assert_eq!(sum(&empty, |v| *v), 0.0);
    }

    #[test]
    fn average_is_sum_over_count() {
        let values = vec![1.0, 2.0, 6.0];
        assert_eq!(sum(&values, |v| *v), 9.0);
        assert_eq!(average(&values, |v| *v), 3.0);
    }

    #[test]
    fn amounts_render_without_trailing_fraction() {
        assert_eq!(amount_text(15000.0), "15000");
        assert_eq!(amount_text(7.5), "7.5");
    }
}
