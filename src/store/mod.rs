use anyhow::Result;
use async_trait::async_trait;

use crate::{
    config,
    database::table::gold_price::GoldPrice,
    declare::{OnError, StoreKind},
    error::StoreError,
    logging,
};

/// 直接連線 PostgreSQL
pub mod postgres;
/// Supabase REST (PostgREST)
pub mod rest;

/// 單筆寫入的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// id 已存在，資料庫內容維持不變
    Duplicate,
}

/// 金價資料的寫入端。
///
/// 實作必須以 id 做衝突容忍的寫入：id 已存在時回傳 [`InsertOutcome::Duplicate`]
/// 而不是錯誤。
#[async_trait]
pub trait PriceStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn insert(&self, row: &GoldPrice) -> Result<InsertOutcome, StoreError>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SaveSummary {
    pub inserted: usize,
    pub duplicates: usize,
    pub failed: usize,
}

/// 依設定建立寫入端
pub fn from_config(app: &config::App) -> Result<Box<dyn PriceStore>> {
    Ok(match app.store.kind {
        StoreKind::Postgres => Box::new(postgres::PostgresStore::new(&app.postgresql)?),
        StoreKind::Rest => Box::new(rest::RestStore::new(
            &app.supabase,
            app.feed.timeout_secs,
        )?),
    })
}

/// 逐筆寫入，每筆各自成功或失敗。
///
/// `OnError::Continue` 記錄失敗後繼續下一筆；`OnError::Abort` 遇到第一筆失敗就停止並回傳錯誤，
/// 已寫入的資料不會回復。
pub async fn save_all(
    store: &dyn PriceStore,
    rows: &[GoldPrice],
    on_error: OnError,
) -> Result<SaveSummary> {
    let mut summary = SaveSummary::default();

    if rows.is_empty() {
        logging::info_file_async("No gold price data to save");
        return Ok(summary);
    }

    for row in rows {
        match store.insert(row).await {
            Ok(InsertOutcome::Inserted) => summary.inserted += 1,
            Ok(InsertOutcome::Duplicate) => {
                summary.duplicates += 1;
                logging::debug_file_async(format!(
                    "{} skipped duplicate id {}",
                    store.name(),
                    row.id
                ));
            }
            Err(why) => {
                summary.failed += 1;
                logging::error_file_async(format!(
                    "{} failed to insert {} because {:?}",
                    store.name(),
                    row.id,
                    why
                ));

                if on_error == OnError::Abort {
                    return Err(anyhow::Error::from(why).context(format!(
                        "Aborted after {} inserted, {} duplicates",
                        summary.inserted, summary.duplicates
                    )));
                }
            }
        }
    }

    Ok(summary)
}
