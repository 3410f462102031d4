//! SQLite persistence layer for the SQL console backend.
//!
//! RULE: Only store/ talks to the database.
//! The data service calls store methods; it never prepares SQL itself,
//! with the one deliberate exception of `execute_raw`, which forwards
//! console text verbatim.

mod account;
mod loan;
mod organisation;
mod records;
mod transaction;

use crate::{
    error::{PortalError, PortalResult},
    seed::RecordStore,
    types::Row,
};
use rusqlite::{types::ValueRef, Connection};
use serde_json::Value;

/// Reply for console text that would change the database.
pub const READONLY_MESSAGE: &str = "The console is readonly: only statements that read data can run";

pub struct PortalStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl PortalStore {
    pub fn open(path: &str) -> PortalResult<Self> {
        if path == ":memory:" {
            return Self::in_memory();
        }
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> PortalResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn, path: None })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> PortalResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_banking.sql"))?;
        Ok(())
    }

    /// Migrate, load `records` if the tables are empty, then seal.
    /// A file database that already holds data is left as it is.
    pub fn prepare(&self, records: &RecordStore) -> PortalResult<()> {
        self.migrate()?;
        let location = self.path.as_deref().unwrap_or(":memory:");
        if self.bank_count()? == 0 && self.account_count()? == 0 {
            log::info!("seeding {location}");
            self.load_records(records)?;
        } else {
            log::info!("{location} already populated; skipping seed load");
        }
        self.seal()
    }

    /// Refuse all writes on this connection. `execute_raw` re-applies it
    /// before each console statement.
    pub fn seal(&self) -> PortalResult<()> {
        self.conn.execute_batch("PRAGMA query_only = ON;")?;
        Ok(())
    }

    // ── Console ────────────────────────────────────────────────

    /// Run one statement of console text exactly as given.
    ///
    /// Rows come back as column-name maps. Any executor failure becomes
    /// `PortalError::Query` carrying SQLite's message unchanged.
    ///
    /// RULE: console text never writes. PRAGMA text is refused outright,
    /// any statement SQLite does not report as read-only is refused, and
    /// the seal is re-applied before every statement.
    pub fn execute_raw(&self, sql: &str) -> PortalResult<Vec<Row>> {
        if is_pragma(sql) {
            log::warn!("console refused PRAGMA text");
            return Err(PortalError::Query(READONLY_MESSAGE.to_string()));
        }
        self.seal()?;
        self.execute_raw_inner(sql)
            .map_err(|e| PortalError::Query(e.to_string()))?
            .ok_or_else(|| {
                log::warn!("console refused a writing statement");
                PortalError::Query(READONLY_MESSAGE.to_string())
            })
    }

    /// `None` when the prepared statement would write.
    fn execute_raw_inner(&self, sql: &str) -> rusqlite::Result<Option<Vec<Row>>> {
        let mut stmt = self.conn.prepare(sql)?;
        if !stmt.readonly() {
            return Ok(None);
        }
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut map = Row::new();
            for (idx, name) in columns.iter().enumerate() {
                map.insert(name.clone(), json_value(row.get_ref(idx)?));
            }
            out.push(map);
        }
        Ok(Some(out))
    }

    // ── Counts ─────────────────────────────────────────────────

    pub fn bank_count(&self) -> PortalResult<i64> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM bank", [], |row| row.get(0))?)
    }

    pub fn account_count(&self) -> PortalResult<i64> {
        Ok(self.conn.query_row("SELECT COUNT(*) FROM account", [], |row| row.get(0))?)
    }
}

/// Leading SQL comments are skipped before looking for the keyword.
fn is_pragma(sql: &str) -> bool {
    let mut rest = sql.trim_start();
    loop {
        if let Some(after) = rest.strip_prefix("--") {
            rest = after.split_once('\n').map_or("", |(_, tail)| tail).trim_start();
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map_or("", |(_, tail)| tail).trim_start();
        } else {
            break;
        }
    }
    rest.get(..6).is_some_and(|word| word.eq_ignore_ascii_case("pragma"))
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Value::from(f),
        ValueRef::Text(t) => Value::from(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::from(b.to_vec()),
    }
}
