use anyhow::Result;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{Postgres, Transaction};

use crate::{
    database::PostgresSQL,
    declare::{Category, TimestampPolicy},
    feed::QuoteSlot,
    util::{datetime, text},
};

/// 金價資料列（`gold_price`）。
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GoldPrice {
    /// 類別前置字元加上建立時的 `YYmmddHH`，同一小時同類別會重複
    pub id: String,
    /// 類別代碼 SJC、BTMC、VNL
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub category: String,
    /// 買進價
    pub buy_price: Option<i64>,
    /// 賣出價
    pub sell_price: Option<i64>,
    /// 計價單位
    pub unit: String,
    /// 資料來源
    pub source: String,
    /// 報價時間
    pub timestamp: NaiveDateTime,
}

impl GoldPrice {
    /// 由一筆報價欄位建立資料列。
    ///
    /// `now` 用於產生 id；報價時間無法解析時，`Lenient` 以 `now` 代替，`Strict` 回傳 None。
    pub fn build(
        category: Category,
        slot: &QuoteSlot,
        unit: &str,
        source: &str,
        policy: TimestampPolicy,
        now: NaiveDateTime,
    ) -> Option<Self> {
        let timestamp = match (datetime::parse_quote_time(slot.time), policy) {
            (Some(t), _) => t,
            (None, TimestampPolicy::Lenient) => now,
            (None, TimestampPolicy::Strict) => return None,
        };

        Some(GoldPrice {
            id: generate_id(category, now),
            category: category.code().to_string(),
            buy_price: text::parse_price(slot.buy),
            sell_price: text::parse_price(slot.sell),
            unit: unit.to_string(),
            source: source.to_string(),
            timestamp,
        })
    }

    /// 寫入一筆金價，id 重複時忽略。
    ///
    /// 回傳 `true` 代表有寫入，`false` 代表 id 已存在。
    pub async fn insert(&self, db: &PostgresSQL) -> Result<bool> {
        let mut transaction: Transaction<Postgres> = db.tx().await?;

        match sqlx::query(
            r#"
INSERT INTO
    gold_price (
        id,
        type,
        buy_price,
        sell_price,
        unit,
        source,
        timestamp
    )
VALUES
    (
        $1,
        $2,
        $3,
        $4,
        $5,
        $6,
        $7
    )
ON CONFLICT
    (id)
DO NOTHING;
"#,
        )
        .bind(&self.id)
        .bind(&self.category)
        .bind(self.buy_price)
        .bind(self.sell_price)
        .bind(&self.unit)
        .bind(&self.source)
        .bind(self.timestamp)
        .execute(&mut *transaction)
        .await
        {
            Ok(r) => {
                transaction.commit().await?;
                Ok(r.rows_affected() > 0)
            }
            Err(why) => {
                transaction.rollback().await?;
                Err(anyhow::Error::from(why)
                    .context(format!("Failed to insert into gold_price({})", self.id)))
            }
        }
    }
}

/// 類別前置字元加上目前時間的 `YYmmddHH`
pub fn generate_id(category: Category, now: NaiveDateTime) -> String {
    format!("{}{}", category.prefix(), datetime::hour_stamp(now))
}
