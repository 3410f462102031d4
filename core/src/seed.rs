//! The record store: the fixed seed dataset behind the mock backend.
//!
//! RULE: the store is read-only once built. Every listing works on
//! borrowed slices and returns fresh derived vectors.

use crate::{
    model::{Account, Bank, Branch, Employee, Loan, Transaction, User},
    types::{BankId, BranchId, Date, EmployeeId, Timestamp, UserId, TIMESTAMP_FORMAT},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordStore {
    pub banks:        Vec<Bank>,
    pub branches:     Vec<Branch>,
    pub users:        Vec<User>,
    pub employees:    Vec<Employee>,
    pub accounts:     Vec<Account>,
    pub loans:        Vec<Loan>,
    pub transactions: Vec<Transaction>,
}

impl RecordStore {
    /// Load a dataset from a JSON file shaped like `{"banks": [...], ...}`.
    /// Missing collections load as empty.
    pub fn load_json(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let store: RecordStore = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        log::info!(
            "loaded dataset from {path}: {} users, {} accounts, {} loans, {} transactions",
            store.users.len(),
            store.accounts.len(),
            store.loans.len(),
            store.transactions.len()
        );
        Ok(store)
    }

    /// The compiled-in demo dataset.
    pub fn seeded() -> Self {
        Self {
            banks:        seed_banks(),
            branches:     seed_branches(),
            users:        seed_users(),
            employees:    seed_employees(),
            accounts:     seed_accounts(),
            loans:        seed_loans(),
            transactions: seed_transactions(),
        }
    }

    // ── Lookups ────────────────────────────────────────────────

    pub fn bank(&self, bank_id: BankId) -> Option<&Bank> {
        self.banks.iter().find(|b| b.bank_id == bank_id)
    }

    pub fn branch(&self, branch_id: BranchId) -> Option<&Branch> {
        self.branches.iter().find(|b| b.branch_id == branch_id)
    }

    pub fn user(&self, user_id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.user_id == user_id)
    }

    pub fn employee(&self, employee_id: EmployeeId) -> Option<&Employee> {
        self.employees.iter().find(|e| e.employee_id == employee_id)
    }
}

// ── Seed literals ──────────────────────────────────────────────

// Panics on a malformed literal; only used for the compiled-in dataset.
fn date(raw: &str) -> Date {
    Date::parse_from_str(raw, "%Y-%m-%d").expect("seed date literal")
}

fn timestamp(raw: &str) -> Timestamp {
    Timestamp::parse_from_str(raw, TIMESTAMP_FORMAT).expect("seed timestamp literal")
}

fn seed_banks() -> Vec<Bank> {
    [
        (1, "RBI", 500_000_000.0, 3),
        (2, "Canera Bank", 75_000_000.0, 2),
        (3, "ICICI Bank", 60_000_000.0, 1),
        (4, "Axis Bank", 60_000_000.0, 2),
    ]
    .into_iter()
    .map(|(bank_id, name, money, branches)| Bank {
        bank_id,
        bank_name: name.into(),
        bank_money: money,
        no_of_branches: branches,
    })
    .collect()
}

fn seed_branches() -> Vec<Branch> {
    [
        (1, "Shahid Bhagat Singh Road, Mumbai, Maharashtra - 400001", 1),
        (2, "6, Sansad Marg, New Delhi, Delhi - 110001", 1),
        (3, "15, Netaji Subhas Road, Kolkata, West Bengal - 700001", 1),
        (4, "No. 112, J.C. Road, Bengaluru, Karnataka - 560002", 2),
        (5, "H-54, Connaught Circus, New Delhi, Delhi - 110001", 2),
        (6, "E-7, Ground Floor, Nehru Place, New Delhi, Delhi - 110019", 3),
        (7, "Shop No. 1, Ground Floor, Andheri West, Mumbai, Maharashtra - 400058", 4),
        (8, "BD-20, Sector-1, Salt Lake City, Kolkata, West Bengal - 700064", 4),
    ]
    .into_iter()
    .map(|(branch_id, address, bank_id)| Branch {
        branch_id,
        branch_address: address.into(),
        bank_id,
    })
    .collect()
}

fn seed_users() -> Vec<User> {
    [
        (1, "Amit Sharma", "123 MG Road, Bengaluru, Karnataka - 560001", "9876543210"),
        (2, "Priya Singh", "456 Park Street, Kolkata, West Bengal - 700016", "9123456789"),
        (3, "Rahul Verma", "789 Nehru Place, New Delhi, Delhi - 110019", "9988776655"),
        (4, "Anjali Nair", "101 Marine Drive, Mumbai, Maharashtra - 400002", "9765432109"),
        (5, "Vikram Patel", "202 Anna Salai, Chennai, Tamil Nadu - 600002", "9898989898"),
        (6, "Sneha Gupta", "303 Banjara Hills, Hyderabad, Telangana - 500034", "9876543211"),
        (7, "Arjun Reddy", "404 Sector 17, Chandigarh - 160017", "9123456790"),
        (8, "Kavita Desai", "505 Connaught Place, New Delhi, Delhi - 110001", "9988776656"),
        (9, "Manish Kumar", "606 Juhu Beach, Mumbai, Maharashtra - 400049", "9765432110"),
        (10, "Pooja Joshi", "707 Salt Lake, Kolkata, West Bengal - 700091", "9898989899"),
    ]
    .into_iter()
    .map(|(user_id, name, address, mobile)| User {
        user_id,
        name: name.into(),
        address: address.into(),
        mobile_number: mobile.into(),
    })
    .collect()
}

fn seed_employees() -> Vec<Employee> {
    [
        (1, "Rajesh Sharma", 1),
        (2, "Priya Singh", 1),
        (3, "Amit Kumar", 2),
        (4, "Neha Gupta", 2),
        (5, "Suresh Verma", 3),
        (6, "Anita Patel", 3),
        (7, "Vijay Reddy", 4),
        (8, "Sunita Rao", 4),
        (9, "Arun Joshi", 5),
        (10, "Kavita Nair", 5),
        (11, "Manoj Desai", 6),
        (12, "Rashmi Iyer", 6),
        (13, "Pankaj Mehta", 7),
        (14, "Sneha Chawla", 7),
        (15, "Rahul Bhatia", 8),
        (16, "Anjali Sinha", 8),
    ]
    .into_iter()
    .map(|(employee_id, name, branch_id)| Employee {
        employee_id,
        name: name.into(),
        branch_id: Some(branch_id),
    })
    .collect()
}

fn seed_accounts() -> Vec<Account> {
    [
        (1001, 15_000.0, 1, 1),
        (1002, 25_000.0, 1, 2),
        (1003, 30_000.0, 2, 3),
        (1004, 20_000.0, 3, 4),
        (1005, 5_000.0, 3, 5),
        (1006, 12_000.0, 3, 6),
        (1007, 18_000.0, 4, 7),
        (1008, 22_000.0, 5, 8),
        (1009, 8_000.0, 5, 1),
        (1010, 16_000.0, 6, 2),
        (1011, 14_000.0, 7, 3),
        (1012, 9_000.0, 7, 4),
        (1013, 11_000.0, 7, 5),
        (1014, 13_000.0, 8, 6),
    ]
    .into_iter()
    .map(|(account_no, balance, user_id, branch_id)| Account {
        account_no,
        balance,
        user_id,
        branch_id,
    })
    .collect()
}

fn seed_loans() -> Vec<Loan> {
    [
        (1, 500_000.0, 60, 7.5, "Home Loan", "2024-01-15", 1, 1),
        (2, 200_000.0, 36, 8.0, "Car Loan", "2024-06-20", 1, 1),
        (3, 150_000.0, 24, 9.0, "Personal Loan", "2024-03-10", 2, 2),
        (4, 300_000.0, 48, 7.8, "Education Loan", "2023-09-05", 3, 3),
        (5, 100_000.0, 12, 10.0, "Personal Loan", "2024-02-14", 3, 3),
        (6, 250_000.0, 36, 8.5, "Car Loan", "2024-07-22", 3, 3),
        (7, 400_000.0, 60, 7.2, "Home Loan", "2023-11-30", 4, 4),
        (8, 120_000.0, 24, 9.5, "Personal Loan", "2024-05-18", 5, 2),
        (9, 220_000.0, 36, 8.3, "Car Loan", "2024-08-25", 5, 2),
    ]
    .into_iter()
    .map(
        |(loan_id, amount, duration, interest, loan_type, issued, user_id, bank_id)| Loan {
            loan_id,
            loan_amount: amount,
            duration,
            interest,
            loan_type: loan_type.into(),
            issue_date: date(issued),
            user_id,
            bank_id,
        },
    )
    .collect()
}

fn seed_transactions() -> Vec<Transaction> {
    [
        (1, 500.0, "2025-02-01 10:15:00", 1, 1001, 1002),
        (2, 1_500.0, "2025-02-02 11:00:00", 2, 1002, 1003),
        (3, 2_000.0, "2025-02-03 09:30:00", 3, 1003, 1004),
        (4, 750.0, "2025-02-04 14:45:00", 3, 1003, 1001),
        (5, 1_200.0, "2025-02-05 16:20:00", 4, 1004, 1005),
        (6, 300.0, "2025-02-06 12:10:00", 5, 1005, 1006),
        (7, 450.0, "2025-02-07 13:50:00", 6, 1006, 1007),
        (8, 800.0, "2025-02-08 15:30:00", 7, 1007, 1008),
        (9, 950.0, "2025-02-09 10:05:00", 8, 1008, 1009),
        (10, 1_100.0, "2025-02-10 11:25:00", 1, 1009, 1010),
        (11, 1_300.0, "2025-02-11 14:15:00", 2, 1010, 1011),
        (12, 700.0, "2025-02-12 09:45:00", 3, 1011, 1012),
        (13, 400.0, "2025-02-13 16:35:00", 4, 1012, 1013),
        (14, 600.0, "2025-02-14 13:25:00", 5, 1013, 1014),
        (15, 550.0, "2025-02-15 12:00:00", 6, 1014, 1001),
    ]
    .into_iter()
    .map(|(transaction_id, amount, time, branch_id, from, to)| Transaction {
        transaction_id,
        transaction_amount: amount,
        transaction_time: timestamp(time),
        branch_id: Some(branch_id),
        account_no1: from,
        account_no2: to,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_dataset_has_expected_sizes() {
        let store = RecordStore::seeded();
        assert_eq!(store.banks.len(), 4);
        assert_eq!(store.branches.len(), 8);
        assert_eq!(store.users.len(), 10);
        assert_eq!(store.employees.len(), 16);
        assert_eq!(store.accounts.len(), 14);
        assert_eq!(store.loans.len(), 9);
        assert_eq!(store.transactions.len(), 15);
    }

    #[test]
    fn seeded_foreign_keys_resolve() {
        let store = RecordStore::seeded();
        for account in &store.accounts {
            assert!(store.user(account.user_id).is_some(), "account {} user", account.account_no);
            assert!(store.branch(account.branch_id).is_some(), "account {} branch", account.account_no);
        }
        for loan in &store.loans {
            assert!(store.bank(loan.bank_id).is_some(), "loan {} bank", loan.loan_id);
        }
    }

    #[test]
    fn json_round_trip_preserves_dataset() {
        let store = RecordStore::seeded();
        let json = serde_json::to_string(&store).unwrap();
        let back: RecordStore = serde_json::from_str(&json).unwrap();
        assert_eq!(store, back);
    }
}
