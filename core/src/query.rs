//! The mock query interpreter behind the employee SQL console.
//!
//! RULE: this is not a SQL parser. A query is lowercased and tested for
//! keyword containment against a fixed, ordered rule list; the first rule
//! that matches picks a canned result shape. Nothing here can fail on
//! user input: text no rule recognises gets an acknowledgement row.
//!
//! Classification and execution are separate steps so the matched shape
//! can be inspected (and tested) on its own.

use crate::{
    error::PortalResult,
    seed::RecordStore,
    types::{BranchId, Row},
};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

pub const UNRECOGNIZED_MESSAGE: &str =
    "Query executed successfully. No specific result handler for this query type.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Bank,
    Branch,
    Employee,
    Users,
    Account,
    Loan,
    TransactionHistory,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Bank               => "bank",
            Table::Branch             => "branch",
            Table::Employee           => "employee",
            Table::Users              => "users",
            Table::Account            => "account",
            Table::Loan               => "loan",
            Table::TransactionHistory => "transaction_history",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateKind {
    /// `[{count}]` over loans.
    LoanCount,
    /// `[{total_balance}]` over accounts.
    TotalBalance,
    /// `[{average_balance}]` over accounts.
    AverageBalance,
    /// `[{max_loan}]` over loan amounts.
    MaxLoan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupField {
    BranchId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    FullTable(Table),
    Aggregate(AggregateKind),
    /// Accounts joined with their owners.
    UserAccountJoin,
    GroupedCount(GroupField),
    Unrecognized,
}

/// One entry of the rule list. Matches when every `required` keyword is
/// present and, if `any_of` is non-empty, at least one of those is too.
struct Rule {
    required: &'static [&'static str],
    any_of:   &'static [&'static str],
    shape:    QueryShape,
}

// Order matters: the first matching rule wins.
const RULES: &[Rule] = &[
    Rule { required: &["select * from bank"], any_of: &[], shape: QueryShape::FullTable(Table::Bank) },
    Rule { required: &["select * from branch"], any_of: &[], shape: QueryShape::FullTable(Table::Branch) },
    Rule { required: &["select * from employee"], any_of: &[], shape: QueryShape::FullTable(Table::Employee) },
    Rule { required: &["select * from users"], any_of: &[], shape: QueryShape::FullTable(Table::Users) },
    Rule { required: &["select * from account"], any_of: &[], shape: QueryShape::FullTable(Table::Account) },
    Rule { required: &["select * from loan"], any_of: &[], shape: QueryShape::FullTable(Table::Loan) },
    Rule {
        required: &["select * from transaction_history"],
        any_of:   &[],
        shape:    QueryShape::FullTable(Table::TransactionHistory),
    },
    Rule { required: &["count", "from loan"], any_of: &[], shape: QueryShape::Aggregate(AggregateKind::LoanCount) },
    Rule {
        required: &["sum"],
        any_of:   &["from account", "balance"],
        shape:    QueryShape::Aggregate(AggregateKind::TotalBalance),
    },
    Rule { required: &["join", "users", "account"], any_of: &[], shape: QueryShape::UserAccountJoin },
    Rule { required: &["avg", "balance"], any_of: &[], shape: QueryShape::Aggregate(AggregateKind::AverageBalance) },
    Rule { required: &["max", "loan"], any_of: &[], shape: QueryShape::Aggregate(AggregateKind::MaxLoan) },
    Rule {
        required: &["count", "group by", "branchid"],
        any_of:   &[],
        shape:    QueryShape::GroupedCount(GroupField::BranchId),
    },
];

impl Rule {
    fn matches(&self, text: &str) -> bool {
        self.required.iter().all(|k| text.contains(k))
            && (self.any_of.is_empty() || self.any_of.iter().any(|k| text.contains(k)))
    }
}

/// Pick the result shape for a query. Case-insensitive.
pub fn classify(query: &str) -> QueryShape {
    let text = query.to_lowercase();
    RULES
        .iter()
        .find(|rule| rule.matches(&text))
        .map(|rule| rule.shape)
        .unwrap_or(QueryShape::Unrecognized)
}

/// Produce the canned rows for a shape.
pub fn execute(shape: QueryShape, store: &RecordStore) -> PortalResult<Vec<Row>> {
    let rows = match shape {
        QueryShape::FullTable(table) => full_table(table, store)?,
        QueryShape::Aggregate(kind) => vec![aggregate_row(kind, store)],
        QueryShape::UserAccountJoin => user_account_join(store),
        QueryShape::GroupedCount(GroupField::BranchId) => accounts_per_branch(store),
        QueryShape::Unrecognized => vec![row(json!({ "message": UNRECOGNIZED_MESSAGE }))],
    };
    Ok(rows)
}

/// Classify and execute in one step.
pub fn run_query(query: &str, store: &RecordStore) -> PortalResult<Vec<Row>> {
    let shape = classify(query);
    log::debug!("console query classified as {shape:?}");
    execute(shape, store)
}

// ── Executors ──────────────────────────────────────────────────

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = Row::new();
            map.insert("value".into(), other);
            map
        }
    }
}

fn to_rows<T: Serialize>(items: &[T]) -> PortalResult<Vec<Row>> {
    items
        .iter()
        .map(|item| Ok(row(serde_json::to_value(item)?)))
        .collect()
}

fn full_table(table: Table, store: &RecordStore) -> PortalResult<Vec<Row>> {
    match table {
        Table::Bank               => to_rows(&store.banks),
        Table::Branch             => to_rows(&store.branches),
        Table::Employee           => to_rows(&store.employees),
        Table::Users              => to_rows(&store.users),
        Table::Account            => to_rows(&store.accounts),
        Table::Loan               => to_rows(&store.loans),
        Table::TransactionHistory => to_rows(&store.transactions),
    }
}

fn aggregate_row(kind: AggregateKind, store: &RecordStore) -> Row {
    let balances = || store.accounts.iter().map(|a| a.balance);
    match kind {
        AggregateKind::LoanCount => row(json!({ "count": store.loans.len() })),
        AggregateKind::TotalBalance => row(json!({ "total_balance": balances().sum::<f64>() })),
        AggregateKind::AverageBalance => {
            let n = store.accounts.len();
            let avg = if n == 0 { 0.0 } else { balances().sum::<f64>() / n as f64 };
            row(json!({ "average_balance": avg }))
        }
        AggregateKind::MaxLoan => {
            // No loans: null rather than a sentinel number.
            let max = store
                .loans
                .iter()
                .map(|l| l.loan_amount)
                .fold(None, |acc: Option<f64>, x| Some(acc.map_or(x, |m| m.max(x))));
            row(json!({ "max_loan": max }))
        }
    }
}

fn user_account_join(store: &RecordStore) -> Vec<Row> {
    store
        .accounts
        .iter()
        .map(|account| {
            let user = store.user(account.user_id);
            row(json!({
                "accountNo":    account.account_no,
                "balance":      account.balance,
                "userId":       account.user_id,
                "userName":     user.map_or("Unknown", |u| u.name.as_str()),
                "address":      user.map_or("Unknown", |u| u.address.as_str()),
                "mobileNumber": user.map_or("Unknown", |u| u.mobile_number.as_str()),
            }))
        })
        .collect()
}

fn accounts_per_branch(store: &RecordStore) -> Vec<Row> {
    let mut counts: BTreeMap<BranchId, usize> = BTreeMap::new();
    for account in &store.accounts {
        *counts.entry(account.branch_id).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(branch_id, count)| row(json!({ "branchId": branch_id, "accountCount": count })))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_table_rules_are_case_insensitive() {
        assert_eq!(classify("SELECT * FROM BANK"), QueryShape::FullTable(Table::Bank));
        assert_eq!(classify("select * from Users"), QueryShape::FullTable(Table::Users));
        assert_eq!(
            classify("SELECT * FROM TRANSACTION_HISTORY"),
            QueryShape::FullTable(Table::TransactionHistory)
        );
    }

    #[test]
    fn bank_prefix_shadows_later_rules() {
        // "select * from bank" is a prefix of a bank/branch join.
        assert_eq!(
            classify("SELECT * FROM BANK JOIN BRANCH ON BANK.BankID = BRANCH.BankID"),
            QueryShape::FullTable(Table::Bank)
        );
    }

    #[test]
    fn loan_count_wins_over_group_by() {
        assert_eq!(
            classify("SELECT COUNT(*) FROM LOAN GROUP BY BankID"),
            QueryShape::Aggregate(AggregateKind::LoanCount)
        );
    }

    #[test]
    fn sum_with_balance_is_total_balance() {
        assert_eq!(
            classify("sum of balance please"),
            QueryShape::Aggregate(AggregateKind::TotalBalance)
        );
        assert_eq!(
            classify("SELECT SUM(Balance) FROM ACCOUNT"),
            QueryShape::Aggregate(AggregateKind::TotalBalance)
        );
    }

    #[test]
    fn grouped_count_needs_branch_id() {
        assert_eq!(
            classify("SELECT BranchID, COUNT(*) FROM ACCOUNT GROUP BY BranchID"),
            QueryShape::GroupedCount(GroupField::BranchId)
        );
        assert_eq!(classify("SELECT COUNT(*) FROM USERS GROUP BY name"), QueryShape::Unrecognized);
    }

    #[test]
    fn unrecognized_text_gets_message_row() {
        let rows = run_query("gibberish not a query", &RecordStore::seeded()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["message"], UNRECOGNIZED_MESSAGE);
    }

    #[test]
    fn max_loan_of_empty_store_is_null() {
        let rows = execute(QueryShape::Aggregate(AggregateKind::MaxLoan), &RecordStore::default()).unwrap();
        assert!(rows[0]["max_loan"].is_null());
    }

    #[test]
    fn average_balance_of_empty_store_is_zero() {
        let rows = execute(QueryShape::Aggregate(AggregateKind::AverageBalance), &RecordStore::default())
            .unwrap();
        assert_eq!(rows[0]["average_balance"], 0.0);
    }
}
