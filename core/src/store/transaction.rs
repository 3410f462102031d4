use super::PortalStore;
use crate::{
    enrich::{EnrichedTransaction, UNKNOWN_BRANCH},
    error::PortalResult,
    model::Transaction,
    types::AccountNo,
};
use rusqlite::{params, Row};

const TXN_SELECT: &str = "
    SELECT t.transactionId, t.transactionAmount, t.transactionTime, t.branchId,
           t.accountNo1, t.accountNo2, COALESCE(b.branchAdd, ?1)
    FROM transaction_history t
    LEFT JOIN branch b ON b.branchId = t.branchId";

// Newest first; ties keep insertion (id) order.
const NEWEST_FIRST: &str = "ORDER BY t.transactionTime DESC, t.transactionId ASC";

fn txn_row(row: &Row<'_>) -> rusqlite::Result<EnrichedTransaction> {
    let transaction = Transaction {
        transaction_id:     row.get(0)?,
        transaction_amount: row.get(1)?,
        transaction_time:   row.get(2)?,
        branch_id:          row.get(3)?,
        account_no1:        row.get(4)?,
        account_no2:        row.get(5)?,
    };
    Ok(EnrichedTransaction {
        from_account:   transaction.account_no1,
        to_account:     transaction.account_no2,
        branch_address: row.get(6)?,
        transaction,
    })
}

impl PortalStore {
    // ── Transaction history ───────────────────────────────────────

    /// Transactions where the account is either source or destination.
    pub fn transactions_for_account(
        &self,
        account_no: AccountNo,
    ) -> PortalResult<Vec<EnrichedTransaction>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TXN_SELECT} WHERE t.accountNo1 = ?2 OR t.accountNo2 = ?2 {NEWEST_FIRST}"
        ))?;
        let rows = stmt.query_map(params![UNKNOWN_BRANCH, account_no], txn_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    pub fn all_transactions(&self) -> PortalResult<Vec<EnrichedTransaction>> {
        let mut stmt = self.conn.prepare(&format!("{TXN_SELECT} {NEWEST_FIRST}"))?;
        let rows = stmt.query_map(params![UNKNOWN_BRANCH], txn_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
