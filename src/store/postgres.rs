use anyhow::Result;
use async_trait::async_trait;

use crate::{
    config,
    database::{table::gold_price::GoldPrice, PostgresSQL},
    error::StoreError,
    store::{InsertOutcome, PriceStore},
};

pub struct PostgresStore {
    db: PostgresSQL,
}

impl PostgresStore {
    pub fn new(setting: &config::PostgreSQL) -> Result<Self> {
        Ok(Self {
            db: PostgresSQL::new(setting)?,
        })
    }
}

#[async_trait]
impl PriceStore for PostgresStore {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    async fn insert(&self, row: &GoldPrice) -> Result<InsertOutcome, StoreError> {
        match row.insert(&self.db).await {
            Ok(true) => Ok(InsertOutcome::Inserted),
            Ok(false) => Ok(InsertOutcome::Duplicate),
            Err(why) => Err(to_store_error(&row.id, why)),
        }
    }
}

/// 資料庫回報的錯誤視為該筆被拒絕，其餘(連線、逾時)視為連線失敗
fn to_store_error(id: &str, why: anyhow::Error) -> StoreError {
    match why.downcast_ref::<sqlx::Error>() {
        Some(sqlx::Error::Database(e)) => StoreError::Rejected {
            id: id.to_string(),
            reason: e.message().to_string(),
        },
        Some(e) => StoreError::Connection(format!("{:?}", e)),
        None => StoreError::Connection(format!("{:?}", why)),
    }
}
