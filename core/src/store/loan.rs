use super::PortalStore;
use crate::{
    enrich::{EnrichedLoan, UNKNOWN_BANK},
    error::PortalResult,
    model::Loan,
    types::UserId,
};
use rusqlite::{params, Row};

const LOAN_SELECT: &str = "
    SELECT l.loanId, l.loanAmount, l.duration, l.interest, l.loanType,
           l.issueDate, l.userId, l.bankId, COALESCE(b.bankName, ?1)
    FROM loan l
    LEFT JOIN bank b ON b.bankId = l.bankId";

fn loan_row(row: &Row<'_>) -> rusqlite::Result<EnrichedLoan> {
    Ok(EnrichedLoan {
        loan: Loan {
            loan_id:     row.get(0)?,
            loan_amount: row.get(1)?,
            duration:    row.get(2)?,
            interest:    row.get(3)?,
            loan_type:   row.get(4)?,
            issue_date:  row.get(5)?,
            user_id:     row.get(6)?,
            bank_id:     row.get(7)?,
        },
        bank_name: row.get(8)?,
    })
}

impl PortalStore {
    // ── Loan ──────────────────────────────────────────────────────

    pub fn loans_for_user(&self, user_id: UserId) -> PortalResult<Vec<EnrichedLoan>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{LOAN_SELECT} WHERE l.userId = ?2 ORDER BY l.loanId"))?;
        let rows = stmt.query_map(params![UNKNOWN_BANK, user_id], loan_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn all_loans(&self) -> PortalResult<Vec<EnrichedLoan>> {
        let mut stmt = self.conn.prepare(&format!("{LOAN_SELECT} ORDER BY l.loanId"))?;
        let rows = stmt.query_map(params![UNKNOWN_BANK], loan_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
