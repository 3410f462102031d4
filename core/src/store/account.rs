use super::PortalStore;
use crate::{
    enrich::{EnrichedAccount, UNKNOWN_BRANCH, UNKNOWN_USER},
    error::PortalResult,
    model::Account,
    types::UserId,
};
use rusqlite::{params, Row};

const ACCOUNT_SELECT: &str = "
    SELECT a.accountNo, a.balance, a.userId, a.branchId,
           COALESCE(b.branchAdd, ?1),
           COALESCE(u.name, ?2),
           CASE WHEN b.branchId IS NULL THEN ?1 ELSE 'Branch #' || b.branchId END
    FROM account a
    LEFT JOIN branch b ON b.branchId = a.branchId
    LEFT JOIN users u  ON u.userId = a.userId";

fn account_row(row: &Row<'_>) -> rusqlite::Result<EnrichedAccount> {
    Ok(EnrichedAccount {
        account: Account {
            account_no: row.get(0)?,
            balance:    row.get(1)?,
            user_id:    row.get(2)?,
            branch_id:  row.get(3)?,
        },
        branch_address: row.get(4)?,
        user_name:      row.get(5)?,
        branch_name:    row.get(6)?,
    })
}

impl PortalStore {
    // ── Account ───────────────────────────────────────────────────

    pub fn accounts_for_user(&self, user_id: UserId) -> PortalResult<Vec<EnrichedAccount>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACCOUNT_SELECT} WHERE a.userId = ?3 ORDER BY a.accountNo"))?;
        let rows = stmt.query_map(params![UNKNOWN_BRANCH, UNKNOWN_USER, user_id], account_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn all_accounts(&self) -> PortalResult<Vec<EnrichedAccount>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACCOUNT_SELECT} ORDER BY a.accountNo"))?;
        let rows = stmt.query_map(params![UNKNOWN_BRANCH, UNKNOWN_USER], account_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
