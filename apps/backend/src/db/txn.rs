use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use actix_web::{HttpMessage, HttpRequest};
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::warn;

use super::{require_db, txn_policy};
use crate::error::AppError;
use crate::state::app_state::AppState;

pub type TxnFuture<'a, R> = Pin<Box<dyn Future<Output = Result<R, AppError>> + 'a>>;

/// Transaction injected into request extensions by tests; `with_txn` neither
/// commits nor rolls it back.
#[derive(Clone)]
pub struct SharedTxn(pub Arc<DatabaseTransaction>);

impl SharedTxn {
    pub fn transaction(&self) -> &DatabaseTransaction {
        &self.0
    }

    pub fn from_req(req: &HttpRequest) -> Option<SharedTxn> {
        req.extensions().get::<SharedTxn>().cloned()
    }

    pub async fn open(db: &DatabaseConnection) -> Result<Self, AppError> {
        Ok(Self(Arc::new(db.begin().await?)))
    }

    /// Roll back once every clone handed to requests has been dropped.
    pub async fn rollback(self) -> Result<(), AppError> {
        let txn = Arc::try_unwrap(self.0)
            .map_err(|_| AppError::internal("shared transaction still in use"))?;
        txn.rollback().await?;
        Ok(())
    }
}

/// Run `f` inside a transaction.
///
/// 1) A `SharedTxn` in the request extensions is used as-is.
/// 2) Otherwise a transaction is opened, and on `Ok` the process `TxnPolicy`
///    decides between commit and rollback. On `Err` it is rolled back.
pub async fn with_txn<R, F>(
    req: Option<&HttpRequest>,
    state: &AppState,
    f: F,
) -> Result<R, AppError>
where
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> TxnFuture<'a, R>,
{
    // Clone out before awaiting so no RefCell borrow is held across the await.
    let shared_txn = req.and_then(SharedTxn::from_req);

    if let Some(shared) = shared_txn {
        return f(shared.transaction()).await;
    }

    let db = require_db(state)?;
    let txn = db.begin().await?;
    let out = f(&txn).await;

    match out {
        Ok(val) => {
            match txn_policy::current() {
                txn_policy::TxnPolicy::CommitOnOk => txn.commit().await?,
                txn_policy::TxnPolicy::RollbackOnOk => txn.rollback().await?,
            }
            Ok(val)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback after failed transaction also failed");
            }
            Err(err)
        }
    }
}
