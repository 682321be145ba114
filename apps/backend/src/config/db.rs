//! Database selection lives in `db-infra` so the migration CLI shares it.

pub use db_infra::config::db::{
    db_kind_from_env, make_conn_spec, validate_db_config, DbKind, DbOwner, RuntimeEnv,
};
