//! PostgreSQL implementation of the control connection, plus the pool bookkeeping around it.

use crate::name::DatabaseName;
use crate::provisioner::{
    ControlConnection, CreateError, ProvisionError, ProvisioningOutcome, ensure_database,
};
use async_trait::async_trait;
use sqlx::Executor;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::str::FromStr;
use std::time::Duration;

const DUPLICATE_DATABASE: &str = "42P04";
// Two sessions that both pass the catalog check can collide on the pg_database name index
// instead of getting 42P04.
const UNIQUE_VIOLATION: &str = "23505";

/// Whether a failed `CREATE DATABASE` means someone else created the database first.
pub fn is_duplicate_database(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == DUPLICATE_DATABASE || code == UNIQUE_VIOLATION)
}

/// Runs catalog queries and DDL on an administrative pool.
#[derive(Clone, Debug)]
pub struct PgControl {
    pool: PgPool,
}

impl PgControl {
    pub fn new(pool: PgPool) -> Self {
        PgControl { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ControlConnection for PgControl {
    async fn database_exists(&self, name: &DatabaseName) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM pg_database WHERE datname = $1")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn create_database(&self, name: &DatabaseName) -> Result<(), CreateError> {
        // CREATE DATABASE cannot run inside a transaction block, so it goes over the simple
        // query protocol on an autocommit connection.
        let statement = format!("CREATE DATABASE {}", name.quoted());
        match self.pool.execute(statement.as_str()).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_database(&err) => Err(CreateError::AlreadyExists),
            Err(err) => Err(CreateError::Failed(err)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        PoolSettings {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl PoolSettings {
    fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
    }
}

/// Owns the control pool and knows how to open pools scoped to provisioned databases.
#[derive(Clone, Debug)]
pub struct Provisioner {
    control: PgControl,
    connect_options: PgConnectOptions,
    settings: PoolSettings,
}

impl Provisioner {
    /// Builds the control pool from a connection URL. Connections are opened lazily, so this
    /// succeeds even if the server is not reachable yet.
    pub fn new(control_url: &str, settings: PoolSettings) -> Result<Self, ProvisionError> {
        let connect_options =
            PgConnectOptions::from_str(control_url).map_err(ProvisionError::InvalidSettings)?;
        let pool = settings
            .pool_options()
            .connect_lazy_with(connect_options.clone());

        Ok(Provisioner {
            control: PgControl::new(pool),
            connect_options,
            settings,
        })
    }

    pub fn control(&self) -> &PgControl {
        &self.control
    }

    pub async fn ensure(&self, name: &DatabaseName) -> Result<ProvisioningOutcome, ProvisionError> {
        ensure_database(&self.control, name).await
    }

    /// Opens a new pool on `name`, using the control connection's server and credentials.
    pub async fn connect_target(&self, name: &DatabaseName) -> Result<PgPool, ProvisionError> {
        let options = self.connect_options.clone().database(name.as_str());
        self.settings
            .pool_options()
            .connect_with(options)
            .await
            .map_err(|source| ProvisionError::Connect {
                name: name.clone(),
                source,
            })
    }

    /// True once the control connection answers queries.
    pub async fn is_ready(&self) -> bool {
        match ping(self.control.pool()).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Control connection not ready");
                false
            }
        }
    }
}

pub async fn ping(pool: &PgPool) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
}
