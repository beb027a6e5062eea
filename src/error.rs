use thiserror::Error;

/// 抓取報價時會中止整次執行的錯誤
#[derive(Error, Debug)]
pub enum CrawlError {
    /// 連線失敗或逾時
    #[error("Failed to request {url} because {reason}")]
    Transport { url: String, reason: String },

    /// 回應的狀態碼不是 2xx
    #[error("{url} responded with status {status}")]
    Status { url: String, status: u16 },

    /// 回應內容不是合法的 JSON/XML
    #[error("Failed to decode the feed as {format} because {reason}")]
    Decode { format: String, reason: String },
}

/// 寫入資料時發生的錯誤
#[derive(Error, Debug)]
pub enum StoreError {
    /// 無法連線或執行 SQL/HTTP 請求
    #[error("Store connection failed: {0}")]
    Connection(String),

    /// 寫入被拒絕 (例如欄位格式錯誤)
    #[error("Store rejected row {id}: {reason}")]
    Rejected { id: String, reason: String },
}

impl From<sqlx::Error> for StoreError {
    fn from(why: sqlx::Error) -> Self {
        StoreError::Connection(format!("{:?}", why))
    }
}
