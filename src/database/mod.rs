use std::time::Duration;

use anyhow::{anyhow, Result};
use sqlx::{
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool, Postgres, Transaction,
};

use crate::config;

pub mod table;

/// PostgreSQL 連線池封裝。
///
/// 每次執行只會寫入少量資料，連線池維持最小規模。
#[derive(Clone)]
pub struct PostgresSQL {
    pub pool: PgPool,
}

impl PostgresSQL {
    /// 依設定建立連線池，實際連線延後到第一次使用時才建立
    pub fn new(setting: &config::PostgreSQL) -> Result<PostgresSQL> {
        let port = u16::try_from(setting.port)
            .map_err(|_| anyhow!("PostgreSQL port is out of range: {}", setting.port))?;
        let options = PgConnectOptions::new()
            .host(&setting.host)
            .port(port)
            .username(&setting.user)
            .password(&setting.password)
            .database(&setting.db)
            .application_name(env!("CARGO_PKG_NAME"));
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .min_connections(0)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Some(Duration::from_secs(60)))
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn tx(&self) -> Result<Transaction<'_, Postgres>> {
        Ok(self.pool().begin().await?)
    }
}
