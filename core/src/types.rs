//! Shared primitive types used across the portal core.

use chrono::{NaiveDate, NaiveDateTime};

pub type BankId = i64;
pub type BranchId = i64;
pub type UserId = i64;
pub type EmployeeId = i64;
pub type AccountNo = i64;
pub type LoanId = i64;
pub type TransactionId = i64;

/// A calendar date with no time zone (loan issue dates).
pub type Date = NaiveDate;

/// A wall-clock timestamp with no time zone (transaction times).
pub type Timestamp = NaiveDateTime;

/// One result row of a console query: column name to JSON value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Wire format for transaction timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
