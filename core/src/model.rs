//! Entity records of the banking dataset.
//!
//! RULE: records are immutable after load. Nothing in the core creates,
//! mutates or deletes a record; derived views live in `enrich`.

use crate::types::{
    AccountNo, BankId, BranchId, Date, EmployeeId, LoanId, Timestamp, TransactionId, UserId,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bank {
    pub bank_id:        BankId,
    pub bank_name:      String,
    pub bank_money:     f64,
    pub no_of_branches: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub branch_id: BranchId,
    /// Stored as `branchAdd`, the column name of the branch table.
    #[serde(rename = "branchAdd")]
    pub branch_address: String,
    pub bank_id: BankId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id:       UserId,
    pub name:          String,
    pub address:       String,
    pub mobile_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub employee_id: EmployeeId,
    pub name:        String,
    pub branch_id:   Option<BranchId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub account_no: AccountNo,
    pub balance:    f64,
    pub user_id:    UserId,
    pub branch_id:  BranchId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub loan_id:     LoanId,
    pub loan_amount: f64,
    /// Term in months.
    pub duration:    u32,
    /// Annual rate in percent.
    pub interest:    f64,
    pub loan_type:   String,
    pub issue_date:  Date,
    pub user_id:     UserId,
    pub bank_id:     BankId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id:     TransactionId,
    pub transaction_amount: f64,
    #[serde(with = "timestamp_format")]
    pub transaction_time:   Timestamp,
    pub branch_id:          Option<BranchId>,
    /// Source account.
    pub account_no1:        AccountNo,
    /// Destination account.
    pub account_no2:        AccountNo,
}

/// Serde adapter for `YYYY-MM-DD HH:MM:SS` timestamps.
pub mod timestamp_format {
    use crate::types::{Timestamp, TIMESTAMP_FORMAT};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &Timestamp, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(d)?;
        Timestamp::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_time_uses_space_separated_wire_format() {
        let json = r#"{
            "transactionId": 1, "transactionAmount": 500.0,
            "transactionTime": "2025-02-01 10:15:00",
            "branchId": null, "accountNo1": 1001, "accountNo2": 1002
        }"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.branch_id, None);

        let back = serde_json::to_value(&tx).unwrap();
        assert_eq!(back["transactionTime"], "2025-02-01 10:15:00");
    }

    #[test]
    fn branch_address_serializes_as_column_name() {
        let branch = Branch { branch_id: 1, branch_address: "MG Road".into(), bank_id: 1 };
        let value = serde_json::to_value(&branch).unwrap();
        assert_eq!(value["branchAdd"], "MG Road");
        assert!(value.get("branchAddress").is_none());
    }
}
