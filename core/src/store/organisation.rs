use super::PortalStore;
use crate::{
    enrich::{EnrichedBranch, EnrichedEmployee, UNKNOWN_BANK, UNKNOWN_BRANCH},
    error::PortalResult,
    model::{Bank, Branch, Employee, User},
    types::{BankId, BranchId, EmployeeId, UserId},
};
use rusqlite::{params, OptionalExtension, Row};

fn user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        user_id:       row.get(0)?,
        name:          row.get(1)?,
        address:       row.get(2)?,
        mobile_number: row.get(3)?,
    })
}

fn bank_row(row: &Row<'_>) -> rusqlite::Result<Bank> {
    Ok(Bank {
        bank_id:        row.get(0)?,
        bank_name:      row.get(1)?,
        bank_money:     row.get(2)?,
        no_of_branches: row.get(3)?,
    })
}

fn branch_row(row: &Row<'_>) -> rusqlite::Result<EnrichedBranch> {
    Ok(EnrichedBranch {
        branch: Branch {
            branch_id:      row.get(0)?,
            branch_address: row.get(1)?,
            bank_id:        row.get(2)?,
        },
        bank_name: row.get(3)?,
    })
}

fn employee_row(row: &Row<'_>) -> rusqlite::Result<EnrichedEmployee> {
    Ok(EnrichedEmployee {
        employee: Employee {
            employee_id: row.get(0)?,
            name:        row.get(1)?,
            branch_id:   row.get(2)?,
        },
        branch_address: row.get(3)?,
    })
}

const BRANCH_SELECT: &str = "
    SELECT br.branchId, br.branchAdd, br.bankId, COALESCE(b.bankName, ?1)
    FROM branch br
    LEFT JOIN bank b ON b.bankId = br.bankId";

const EMPLOYEE_SELECT: &str = "
    SELECT e.employeeId, e.name, e.branchId, COALESCE(b.branchAdd, ?1)
    FROM employee e
    LEFT JOIN branch b ON b.branchId = e.branchId";

impl PortalStore {
    // ── Users ─────────────────────────────────────────────────────

    pub fn all_users(&self) -> PortalResult<Vec<User>> {
        let mut stmt = self.conn.prepare(
            "SELECT userId, name, address, mobileNumber FROM users ORDER BY userId",
        )?;
        let rows = stmt.query_map([], user_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn user(&self, user_id: UserId) -> PortalResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT userId, name, address, mobileNumber FROM users WHERE userId = ?1",
                params![user_id],
                user_row,
            )
            .optional()?;
        Ok(user)
    }

    // ── Banks and branches ────────────────────────────────────────

    pub fn all_banks(&self) -> PortalResult<Vec<Bank>> {
        let mut stmt = self.conn.prepare(
            "SELECT bankId, bankName, bankMoney, noOfBranches FROM bank ORDER BY bankId",
        )?;
        let rows = stmt.query_map([], bank_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn bank(&self, bank_id: BankId) -> PortalResult<Option<Bank>> {
        let bank = self
            .conn
            .query_row(
                "SELECT bankId, bankName, bankMoney, noOfBranches FROM bank WHERE bankId = ?1",
                params![bank_id],
                bank_row,
            )
            .optional()?;
        Ok(bank)
    }

    pub fn all_branches(&self) -> PortalResult<Vec<EnrichedBranch>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BRANCH_SELECT} ORDER BY br.branchId"))?;
        let rows = stmt.query_map(params![UNKNOWN_BANK], branch_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn branch(&self, branch_id: BranchId) -> PortalResult<Option<EnrichedBranch>> {
        let branch = self
            .conn
            .query_row(
                &format!("{BRANCH_SELECT} WHERE br.branchId = ?2"),
                params![UNKNOWN_BANK, branch_id],
                branch_row,
            )
            .optional()?;
        Ok(branch)
    }

    // ── Employees ─────────────────────────────────────────────────

    pub fn all_employees(&self) -> PortalResult<Vec<EnrichedEmployee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT} ORDER BY e.employeeId"))?;
        let rows = stmt.query_map(params![UNKNOWN_BRANCH], employee_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn employee(&self, employee_id: EmployeeId) -> PortalResult<Option<EnrichedEmployee>> {
        let employee = self
            .conn
            .query_row(
                &format!("{EMPLOYEE_SELECT} WHERE e.employeeId = ?2"),
                params![UNKNOWN_BRANCH, employee_id],
                employee_row,
            )
            .optional()?;
        Ok(employee)
    }
}
