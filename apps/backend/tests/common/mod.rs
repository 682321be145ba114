#![allow(dead_code)]

use bazaar_backend::db::txn_policy::{set_txn_policy, TxnPolicy};

pub use backend_test_support::problem_details::{assert_problem, assert_problem_detail};

#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

// Each test builds its own database, so committing is the default.
// `BAZAAR_TXN_POLICY=rollback` flips it for runs against a shared Postgres.
#[ctor::ctor]
fn init_txn_policy() {
    let policy = match std::env::var("BAZAAR_TXN_POLICY")
        .unwrap_or_default()
        .to_lowercase()
        .as_str()
    {
        "rollback" => TxnPolicy::RollbackOnOk,
        _ => TxnPolicy::CommitOnOk,
    };
    set_txn_policy(policy);
}
