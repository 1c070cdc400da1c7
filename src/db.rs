use std::sync::Arc;

use anyhow::Context;
use sqlx::MySqlPool;
use tracing::info;

use crate::config::{Config, LeaveStore};
use crate::repository::{LeaveRepository, MemoryLeaveRepository, MySqlLeaveRepository};

pub async fn init_db(database_url: &str) -> anyhow::Result<MySqlPool> {
    MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Build the leave store selected by `LEAVE_STORE`.
pub async fn init_repository(config: &Config) -> anyhow::Result<Arc<dyn LeaveRepository>> {
    match (config.leave_store, config.database_url.as_deref()) {
        (LeaveStore::Mysql, Some(url)) => {
            let pool = init_db(url).await?;
            info!("Using MySQL leave store");
            Ok(Arc::new(MySqlLeaveRepository::new(pool)))
        }
        (LeaveStore::Mysql, None) => anyhow::bail!("DATABASE_URL must be set when LEAVE_STORE=mysql"),
        (LeaveStore::Memory, _) => {
            info!("Using in-memory leave store");
            Ok(Arc::new(MemoryLeaveRepository::new()))
        }
    }
}
