use super::PortalStore;
use crate::{error::PortalResult, seed::RecordStore};
use rusqlite::params;

impl PortalStore {
    // ── Seed load ─────────────────────────────────────────────────

    /// Insert every record of `records` in one transaction.
    pub fn load_records(&self, records: &RecordStore) -> PortalResult<()> {
        let tx = self.conn.unchecked_transaction()?;

        for b in &records.banks {
            tx.execute(
                "INSERT INTO bank (bankId, bankName, bankMoney, noOfBranches) VALUES (?1, ?2, ?3, ?4)",
                params![b.bank_id, b.bank_name, b.bank_money, b.no_of_branches],
            )?;
        }
        for b in &records.branches {
            tx.execute(
                "INSERT INTO branch (branchId, branchAdd, bankId) VALUES (?1, ?2, ?3)",
                params![b.branch_id, b.branch_address, b.bank_id],
            )?;
        }
        for u in &records.users {
            tx.execute(
                "INSERT INTO users (userId, name, address, mobileNumber) VALUES (?1, ?2, ?3, ?4)",
                params![u.user_id, u.name, u.address, u.mobile_number],
            )?;
        }
        for e in &records.employees {
            tx.execute(
                "INSERT INTO employee (employeeId, name, branchId) VALUES (?1, ?2, ?3)",
                params![e.employee_id, e.name, e.branch_id],
            )?;
        }
        for a in &records.accounts {
            tx.execute(
                "INSERT INTO account (accountNo, balance, userId, branchId) VALUES (?1, ?2, ?3, ?4)",
                params![a.account_no, a.balance, a.user_id, a.branch_id],
            )?;
        }
        for l in &records.loans {
            tx.execute(
                "INSERT INTO loan (loanId, loanAmount, duration, interest, loanType, issueDate, userId, bankId)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    l.loan_id,
                    l.loan_amount,
                    l.duration,
                    l.interest,
                    l.loan_type,
                    l.issue_date,
                    l.user_id,
                    l.bank_id
                ],
            )?;
        }
        for t in &records.transactions {
            tx.execute(
                "INSERT INTO transaction_history
                    (transactionId, transactionAmount, transactionTime, branchId, accountNo1, accountNo2)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    t.transaction_id,
                    t.transaction_amount,
                    t.transaction_time,
                    t.branch_id,
                    t.account_no1,
                    t.account_no2
                ],
            )?;
        }

        tx.commit()?;
        log::info!(
            "seeded database: {} banks, {} branches, {} users, {} accounts, {} loans, {} transactions",
            records.banks.len(),
            records.branches.len(),
            records.users.len(),
            records.accounts.len(),
            records.loans.len(),
            records.transactions.len()
        );
        Ok(())
    }
}
