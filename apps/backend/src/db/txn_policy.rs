use std::sync::OnceLock;

/// What `with_txn` does with a transaction whose closure succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnPolicy {
    CommitOnOk,
    /// Integration tests roll back so every test sees a clean database
    RollbackOnOk,
}

static POLICY: OnceLock<TxnPolicy> = OnceLock::new();

/// `CommitOnOk` unless a policy was set for the process.
pub fn current() -> TxnPolicy {
    POLICY.get().copied().unwrap_or(TxnPolicy::CommitOnOk)
}

/// First call wins; later calls are ignored.
pub fn set_txn_policy(policy: TxnPolicy) {
    let _ = POLICY.set(policy);
}
