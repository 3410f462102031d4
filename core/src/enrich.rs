//! Join/enrichment layer: resolve foreign keys into display fields.
//!
//! RULE: enrichment is a pure copy. The base record is cloned, never
//! touched, and an unresolved key becomes a sentinel string instead of
//! an error.

use crate::{
    model::{Account, Bank, Branch, Employee, Loan, Transaction, User},
    types::{AccountNo, BankId, BranchId, UserId},
};
use serde::{Deserialize, Serialize};

pub const UNKNOWN_BRANCH: &str = "Unknown Branch";
pub const UNKNOWN_BANK: &str = "Unknown Bank";
pub const UNKNOWN_USER: &str = "Unknown User";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedAccount {
    #[serde(flatten)]
    pub account:        Account,
    pub branch_address: String,
    pub user_name:      String,
    pub branch_name:    String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedLoan {
    #[serde(flatten)]
    pub loan:      Loan,
    pub bank_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedEmployee {
    #[serde(flatten)]
    pub employee:       Employee,
    pub branch_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedBranch {
    #[serde(flatten)]
    pub branch:    Branch,
    pub bank_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTransaction {
    #[serde(flatten)]
    pub transaction:    Transaction,
    pub branch_address: String,
    pub from_account:   AccountNo,
    pub to_account:     AccountNo,
}

// ── Lookups ────────────────────────────────────────────────────

fn branch_address(branch_id: Option<BranchId>, branches: &[Branch]) -> String {
    branch_id
        .and_then(|id| branches.iter().find(|b| b.branch_id == id))
        .map(|b| b.branch_address.clone())
        .unwrap_or_else(|| UNKNOWN_BRANCH.to_string())
}

fn bank_name(bank_id: BankId, banks: &[Bank]) -> String {
    banks
        .iter()
        .find(|b| b.bank_id == bank_id)
        .map(|b| b.bank_name.clone())
        .unwrap_or_else(|| UNKNOWN_BANK.to_string())
}

fn user_name(user_id: UserId, users: &[User]) -> String {
    users
        .iter()
        .find(|u| u.user_id == user_id)
        .map(|u| u.name.clone())
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}

// ── Enrichment ─────────────────────────────────────────────────

pub fn enrich_account(account: &Account, branches: &[Branch], users: &[User]) -> EnrichedAccount {
    let branch = branches.iter().find(|b| b.branch_id == account.branch_id);
    EnrichedAccount {
        account:        account.clone(),
        branch_address: branch_address(Some(account.branch_id), branches),
        user_name:      user_name(account.user_id, users),
        branch_name:    branch
            .map(|b| format!("Branch #{}", b.branch_id))
            .unwrap_or_else(|| UNKNOWN_BRANCH.to_string()),
    }
}

pub fn enrich_loan(loan: &Loan, banks: &[Bank]) -> EnrichedLoan {
    EnrichedLoan {
        loan:      loan.clone(),
        bank_name: bank_name(loan.bank_id, banks),
    }
}

pub fn enrich_employee(employee: &Employee, branches: &[Branch]) -> EnrichedEmployee {
    EnrichedEmployee {
        employee:       employee.clone(),
        branch_address: branch_address(employee.branch_id, branches),
    }
}

pub fn enrich_branch(branch: &Branch, banks: &[Bank]) -> EnrichedBranch {
    EnrichedBranch {
        branch:    branch.clone(),
        bank_name: bank_name(branch.bank_id, banks),
    }
}

pub fn enrich_transaction(tx: &Transaction, branches: &[Branch]) -> EnrichedTransaction {
    EnrichedTransaction {
        transaction:    tx.clone(),
        branch_address: branch_address(tx.branch_id, branches),
        from_account:   tx.account_no1,
        to_account:     tx.account_no2,
    }
}

/// Order transactions newest first. Stable on equal timestamps.
pub fn sort_newest_first(txs: &mut [EnrichedTransaction]) {
    txs.sort_by(|a, b| b.transaction.transaction_time.cmp(&a.transaction.transaction_time));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::RecordStore;

    #[test]
    fn account_with_missing_branch_gets_sentinels() {
        let store = RecordStore::seeded();
        let orphan = Account { account_no: 9999, balance: 1.0, user_id: 42, branch_id: 99 };

        let enriched = enrich_account(&orphan, &store.branches, &store.users);
        assert_eq!(enriched.branch_address, UNKNOWN_BRANCH);
        assert_eq!(enriched.branch_name, UNKNOWN_BRANCH);
        assert_eq!(enriched.user_name, UNKNOWN_USER);
        assert_eq!(enriched.account, orphan, "base record must be carried unchanged");
    }

    #[test]
    fn account_resolves_branch_and_owner() {
        let store = RecordStore::seeded();
        let enriched = enrich_account(&store.accounts[0], &store.branches, &store.users);
        assert_eq!(enriched.user_name, "Amit Sharma");
        assert_eq!(enriched.branch_name, "Branch #1");
        assert!(enriched.branch_address.contains("Mumbai"));
    }

    #[test]
    fn employee_without_branch_is_unknown() {
        let employee = Employee { employee_id: 77, name: "Floating".into(), branch_id: None };
        let enriched = enrich_employee(&employee, &RecordStore::seeded().branches);
        assert_eq!(enriched.branch_address, UNKNOWN_BRANCH);
    }

    #[test]
    fn loan_and_branch_with_unknown_bank() {
        let store = RecordStore::seeded();
        let mut loan = store.loans[0].clone();
        loan.bank_id = 404;
        assert_eq!(enrich_loan(&loan, &store.banks).bank_name, UNKNOWN_BANK);

        let branch = Branch { branch_id: 50, branch_address: "Nowhere".into(), bank_id: 404 };
        assert_eq!(enrich_branch(&branch, &store.banks).bank_name, UNKNOWN_BANK);
    }

    #[test]
    fn enriched_wire_shape_is_flat() {
        let store = RecordStore::seeded();
        let enriched = enrich_transaction(&store.transactions[0], &store.branches);
        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(value["transactionId"], 1);
        assert_eq!(value["fromAccount"], 1001);
        assert_eq!(value["toAccount"], 1002);
        assert!(value["branchAddress"].as_str().unwrap().contains("Mumbai"));
    }
}
