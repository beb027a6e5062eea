use anyhow::Result;
use scopeguard::defer;

use crate::{
    config,
    crawler::btmc,
    declare::OnError,
    logging,
    store::{self, PriceStore, SaveSummary},
};

/// 一次完整的執行：抓取、解析、寫入
pub struct Pipeline {
    feed: config::Feed,
    store: Box<dyn PriceStore>,
    on_error: OnError,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// 解析出的資料列數
    pub parsed: usize,
    pub summary: SaveSummary,
}

impl Pipeline {
    pub fn new(feed: config::Feed, store: Box<dyn PriceStore>, on_error: OnError) -> Self {
        Pipeline {
            feed,
            store,
            on_error,
        }
    }

    pub fn from_config(app: &config::App) -> Result<Self> {
        Ok(Self::new(
            app.feed.clone(),
            store::from_config(app)?,
            app.store.on_error,
        ))
    }

    /// 抓取失敗或解析失敗時不寫入任何資料並回傳錯誤
    pub async fn execute(&self) -> Result<RunReport> {
        logging::info_file_async("抓取金價開始");
        defer! {
            logging::info_file_async("抓取金價結束");
        }

        let rows = btmc::price::visit(&self.feed).await?;
        for row in &rows {
            logging::info_console(format!(
                "{} {} buy:{} sell:{} {} @ {}",
                row.id,
                row.category,
                price_text(row.buy_price),
                price_text(row.sell_price),
                row.unit,
                row.timestamp.format("%Y-%m-%d %H:%M")
            ));
        }

        let summary = store::save_all(self.store.as_ref(), &rows, self.on_error).await?;
        let msg = format!(
            "{} rows parsed, {} inserted, {} duplicates, {} failed ({})",
            rows.len(),
            summary.inserted,
            summary.duplicates,
            summary.failed,
            self.store.name()
        );
        logging::info_file_async(msg.clone());
        logging::info_console(msg);

        Ok(RunReport {
            parsed: rows.len(),
            summary,
        })
    }
}

fn price_text(price: Option<i64>) -> String {
    match price {
        None => String::from("-"),
        Some(p) => p.to_string(),
    }
}
