use async_trait::async_trait;
use provisioner::postgres::ping;
use provisioner::{DatabaseName, ProvisionError, ProvisioningOutcome, Provisioner};

#[derive(thiserror::Error, Debug)]
pub enum DatabaseError {
    #[error(transparent)]
    Provision(#[from] ProvisionError),
    #[error("database {name} did not answer: {source}")]
    Ping {
        name: DatabaseName,
        #[source]
        source: sqlx::Error,
    },
}

/// Database access needed by the HTTP handlers.
#[async_trait]
pub trait Databases: Send + Sync {
    async fn is_ready(&self) -> bool;

    /// Ensures `name` exists, then runs a trivial query against it over a fresh target pool.
    async fn ensure_and_ping(
        &self,
        name: &DatabaseName,
    ) -> Result<(ProvisioningOutcome, i32), DatabaseError>;
}

#[async_trait]
impl Databases for Provisioner {
    async fn is_ready(&self) -> bool {
        Provisioner::is_ready(self).await
    }

    async fn ensure_and_ping(
        &self,
        name: &DatabaseName,
    ) -> Result<(ProvisioningOutcome, i32), DatabaseError> {
        let outcome = self.ensure(name).await?;

        let target = self.connect_target(name).await?;
        let result = ping(&target).await;
        target.close().await;

        let value = result.map_err(|source| DatabaseError::Ping {
            name: name.clone(),
            source,
        })?;
        Ok((outcome, value))
    }
}
