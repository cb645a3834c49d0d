use crate::metrics_defs::{PROVISION_FAILURES, PROVISION_OUTCOMES};
use crate::name::{DatabaseName, NameError};
use async_trait::async_trait;
use serde::Serialize;
use shared::counter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProvisioningOutcome {
    /// The catalog already listed the database; nothing was created.
    AlreadyExists,
    Created,
    /// Another creator won between our existence check and our create.
    CreateRaced,
}

impl ProvisioningOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisioningOutcome::AlreadyExists => "already_exists",
            ProvisioningOutcome::Created => "created",
            ProvisioningOutcome::CreateRaced => "create_raced",
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CreateError {
    #[error("database already exists")]
    AlreadyExists,
    #[error(transparent)]
    Failed(#[from] sqlx::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum ProvisionError {
    #[error("invalid database name: {0}")]
    InvalidName(#[from] NameError),
    #[error("invalid connection settings: {0}")]
    InvalidSettings(#[source] sqlx::Error),
    #[error("failed to look up database {name} in the catalog: {source}")]
    Check {
        name: DatabaseName,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to create database {name}: {source}")]
    Create {
        name: DatabaseName,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to connect to database {name}: {source}")]
    Connect {
        name: DatabaseName,
        #[source]
        source: sqlx::Error,
    },
}

/// Administrative access to the server's database catalog.
#[async_trait]
pub trait ControlConnection: Send + Sync {
    async fn database_exists(&self, name: &DatabaseName) -> Result<bool, sqlx::Error>;

    /// Issues the create. Implementations classify "the database already exists" as
    /// [`CreateError::AlreadyExists`].
    async fn create_database(&self, name: &DatabaseName) -> Result<(), CreateError>;
}

/// Makes sure `name` exists, creating it if the catalog does not list it.
///
/// Safe to call any number of times, sequentially or concurrently from several processes.
/// Losing a create race is not an error.
pub async fn ensure_database<C>(
    control: &C,
    name: &DatabaseName,
) -> Result<ProvisioningOutcome, ProvisionError>
where
    C: ControlConnection + ?Sized,
{
    let exists = match control.database_exists(name).await {
        Ok(exists) => exists,
        Err(source) => {
            counter!(PROVISION_FAILURES, "stage" => "check").increment(1);
            return Err(ProvisionError::Check {
                name: name.clone(),
                source,
            });
        }
    };

    let outcome = if exists {
        ProvisioningOutcome::AlreadyExists
    } else {
        match control.create_database(name).await {
            Ok(()) => ProvisioningOutcome::Created,
            Err(CreateError::AlreadyExists) => {
                tracing::debug!(database = %name, "Database was created concurrently");
                ProvisioningOutcome::CreateRaced
            }
            Err(CreateError::Failed(source)) => {
                counter!(PROVISION_FAILURES, "stage" => "create").increment(1);
                tracing::error!(database = %name, error = %source, "Failed to create database");
                return Err(ProvisionError::Create {
                    name: name.clone(),
                    source,
                });
            }
        }
    };

    counter!(PROVISION_OUTCOMES, "outcome" => outcome.as_str()).increment(1);
    tracing::info!(database = %name, outcome = outcome.as_str(), "Database ensured");
    Ok(outcome)
}
