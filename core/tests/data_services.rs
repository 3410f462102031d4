//! Data-access contract tests.
//!
//! Both backends are built from the same seed records and must answer
//! every listing identically: same records, same enrichment, same order.

use bankportal_core::{
    enrich::UNKNOWN_BRANCH,
    model::Transaction,
    seed::RecordStore,
    service::{DataService, MockDataService, SimulatedLatency, SqlDataService},
    types::Timestamp,
};
use std::time::{Duration, Instant};

fn mock() -> MockDataService {
    MockDataService::seeded()
}

fn sql() -> SqlDataService {
    SqlDataService::in_memory(&RecordStore::seeded()).expect("build sqlite service")
}

fn backends() -> Vec<Box<dyn DataService>> {
    vec![Box::new(mock()), Box::new(sql())]
}

#[test]
fn backends_agree_on_every_listing() {
    let mock = mock();
    let sql = sql();

    assert_eq!(mock.list_users().unwrap(), sql.list_users().unwrap());
    assert_eq!(mock.list_accounts_all().unwrap(), sql.list_accounts_all().unwrap());
    assert_eq!(mock.list_loans_all().unwrap(), sql.list_loans_all().unwrap());
    assert_eq!(mock.list_transactions_all().unwrap(), sql.list_transactions_all().unwrap());
    assert_eq!(mock.list_employees().unwrap(), sql.list_employees().unwrap());
    assert_eq!(mock.list_branches().unwrap(), sql.list_branches().unwrap());
    assert_eq!(mock.list_banks().unwrap(), sql.list_banks().unwrap());

    for user_id in 1..=10 {
        assert_eq!(
            mock.list_accounts_by_user(user_id).unwrap(),
            sql.list_accounts_by_user(user_id).unwrap(),
            "accounts of user {user_id}"
        );
        assert_eq!(
            mock.list_loans_by_user(user_id).unwrap(),
            sql.list_loans_by_user(user_id).unwrap(),
            "loans of user {user_id}"
        );
    }
    for account_no in 1001..=1014 {
        assert_eq!(
            mock.list_transactions_by_account(account_no).unwrap(),
            sql.list_transactions_by_account(account_no).unwrap(),
            "transactions of account {account_no}"
        );
    }
}

#[test]
fn accounts_by_user_selects_only_that_user() {
    for service in backends() {
        let accounts = service.list_accounts_by_user(3).unwrap();
        let numbers: Vec<_> = accounts.iter().map(|a| a.account.account_no).collect();
        assert_eq!(numbers, vec![1004, 1005, 1006], "{}", service.name());
        assert!(accounts.iter().all(|a| a.user_name == "Rahul Verma"));

        assert!(service.list_accounts_by_user(10).unwrap().is_empty(), "Pooja holds no account");
        assert!(service.list_loans_by_user(404).unwrap().is_empty());
    }
}

#[test]
fn transactions_by_account_match_either_side_newest_first() {
    for service in backends() {
        let txs = service.list_transactions_by_account(1001).unwrap();
        let ids: Vec<_> = txs.iter().map(|t| t.transaction.transaction_id).collect();
        assert_eq!(ids, vec![15, 4, 1], "{}", service.name());
        assert!(txs
            .iter()
            .all(|t| t.from_account == 1001 || t.to_account == 1001));

        let all = service.list_transactions_all().unwrap();
        assert_eq!(all.len(), 15);
        assert!(
            all.windows(2)
                .all(|w| w[0].transaction.transaction_time >= w[1].transaction.transaction_time),
            "{} listing must be newest first",
            service.name()
        );
    }
}

#[test]
fn lookups_return_none_for_missing_ids() {
    for service in backends() {
        assert_eq!(service.get_user(2).unwrap().map(|u| u.name), Some("Priya Singh".into()));
        assert!(service.get_user(404).unwrap().is_none());
        assert!(service.get_employee(404).unwrap().is_none());
        assert!(service.get_branch(404).unwrap().is_none());
        assert!(service.get_bank(404).unwrap().is_none());

        let branch = service.get_branch(7).unwrap().expect("branch 7");
        assert_eq!(branch.bank_name, "Axis Bank");
        let employee = service.get_employee(16).unwrap().expect("employee 16");
        assert!(employee.branch_address.contains("Salt Lake"));
    }
}

#[test]
fn transaction_without_branch_gets_sentinel_on_both_backends() {
    let mut records = RecordStore::seeded();
    records.transactions.push(Transaction {
        transaction_id:     16,
        transaction_amount: 99.0,
        transaction_time:   Timestamp::parse_from_str("2025-02-20 08:00:00", "%Y-%m-%d %H:%M:%S")
            .unwrap(),
        branch_id:          None,
        account_no1:        1014,
        account_no2:        1002,
    });

    let mock = MockDataService::new(records.clone(), SimulatedLatency::none());
    let sql = SqlDataService::in_memory(&records).unwrap();
    let services: [&dyn DataService; 2] = [&mock, &sql];
    for service in services {
        let newest = &service.list_transactions_all().unwrap()[0];
        assert_eq!(newest.transaction.transaction_id, 16, "{}", service.name());
        assert_eq!(newest.branch_address, UNKNOWN_BRANCH);
    }
}

#[test]
fn empty_dataset_yields_empty_listings() {
    let mock = MockDataService::new(RecordStore::default(), SimulatedLatency::none());
    let sql = SqlDataService::in_memory(&RecordStore::default()).unwrap();
    let services: [&dyn DataService; 2] = [&mock, &sql];
    for service in services {
        assert!(service.list_users().unwrap().is_empty());
        assert!(service.list_accounts_all().unwrap().is_empty());
        assert!(service.list_transactions_all().unwrap().is_empty());
    }
}

#[test]
fn flat_latency_delays_mock_calls() {
    let service = MockDataService::new(
        RecordStore::seeded(),
        SimulatedLatency::flat(Duration::from_millis(20)),
    );
    let started = Instant::now();
    service.list_banks().unwrap();
    assert!(
        started.elapsed() >= Duration::from_millis(20),
        "expected at least 20ms, took {:?}",
        started.elapsed()
    );
}
