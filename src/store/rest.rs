use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use concat_string::concat_string;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION},
    StatusCode,
};

use crate::{
    config,
    database::table::gold_price::GoldPrice,
    error::StoreError,
    store::{InsertOutcome, PriceStore},
    util,
};

/// 透過 PostgREST 寫入。
///
/// `resolution=ignore-duplicates` 下 id 重複時伺服器不會回錯誤；
/// 若資料表沒有對應的唯一鍵設定，重複會以 409 回應，兩者都不算失敗。
pub struct RestStore {
    endpoint: String,
    headers: HeaderMap,
    timeout: Duration,
}

impl RestStore {
    pub fn new(setting: &config::Supabase, timeout_secs: u64) -> Result<Self> {
        let endpoint = concat_string!(
            setting.url.trim_end_matches('/'),
            "/rest/v1/",
            setting.table
        );

        let mut headers = HeaderMap::new();
        headers.insert(HeaderName::from_static("apikey"), header_value(&setting.key)?);
        headers.insert(
            AUTHORIZATION,
            header_value(&concat_string!("Bearer ", setting.key))?,
        );
        headers.insert(
            HeaderName::from_static("prefer"),
            HeaderValue::from_static("resolution=ignore-duplicates,return=minimal"),
        );

        Ok(Self {
            endpoint,
            headers,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|why| anyhow!("Invalid SUPABASE_KEY: {:?}", why))
}

#[async_trait]
impl PriceStore for RestStore {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn insert(&self, row: &GoldPrice) -> Result<InsertOutcome, StoreError> {
        let (status, body) = util::http::post_json(
            &self.endpoint,
            Some(self.headers.clone()),
            row,
            self.timeout,
        )
        .await
        .map_err(|why| StoreError::Connection(format!("{:?}", why)))?;

        match status {
            s if s.is_success() => Ok(InsertOutcome::Inserted),
            StatusCode::CONFLICT => Ok(InsertOutcome::Duplicate),
            s => Err(StoreError::Rejected {
                id: row.id.clone(),
                reason: format!("{} {}", s, body),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::{HeaderMap as AxumHeaders, StatusCode as AxumStatus},
        routing::post,
        Json, Router,
    };
    use chrono::NaiveDate;
    use serde_json::Value;
    use tokio::net::TcpListener;

    use crate::declare::OnError;
    use crate::store;

    use super::*;

    type Seen = Arc<Mutex<Vec<Value>>>;

    async fn handler(
        State(seen): State<Seen>,
        Path(table): Path<String>,
        headers: AxumHeaders,
        Json(v): Json<Value>,
    ) -> (AxumStatus, String) {
        let authorized = headers.get("apikey").map(|h| h.as_bytes()) == Some(b"anon".as_slice())
            && headers.get("authorization").map(|h| h.as_bytes())
                == Some(b"Bearer anon".as_slice())
            && headers
                .get("prefer")
                .and_then(|h| h.to_str().ok())
                .is_some_and(|h| h.contains("resolution=ignore-duplicates"));
        if !authorized || table != "gold_price" {
            return (AxumStatus::UNAUTHORIZED, "no".to_string());
        }

        if v["unit"] == "" {
            return (AxumStatus::BAD_REQUEST, "unit must not be empty".to_string());
        }

        let mut seen = seen.lock().unwrap();
        if seen.iter().any(|r| r["id"] == v["id"]) {
            return (AxumStatus::CONFLICT, "duplicate key".to_string());
        }
        seen.push(v);
        (AxumStatus::CREATED, String::new())
    }

    async fn serve(seen: Seen) -> String {
        let app = Router::new()
            .route("/rest/v1/{table}", post(handler))
            .with_state(seen);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{}/", addr)
    }

    fn setting(url: String) -> config::Supabase {
        config::Supabase {
            url,
            key: "anon".to_string(),
            ..Default::default()
        }
    }

    fn row(id: &str, unit: &str) -> GoldPrice {
        GoldPrice {
            id: id.to_string(),
            category: "VNL".to_string(),
            buy_price: None,
            sell_price: Some(7_000_000),
            unit: unit.to_string(),
            source: "btmc.vn".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap(),
        }
    }

    #[test]
    fn test_endpoint() {
        let store = RestStore::new(&setting("https://x.supabase.co/".to_string()), 5).unwrap();
        assert_eq!(store.endpoint, "https://x.supabase.co/rest/v1/gold_price");
        assert!(RestStore::new(&setting("https://x".to_string()), 5).is_ok());

        let mut bad = setting("https://x".to_string());
        bad.key = "line\nbreak".to_string();
        assert!(RestStore::new(&bad, 5).is_err());
    }

    #[tokio::test]
    async fn test_insert() {
        let seen: Seen = Arc::default();
        let store = RestStore::new(&setting(serve(seen.clone()).await), 5).unwrap();

        let first = row("GVNL24010110", "1 lượng");
        assert_eq!(store.insert(&first).await.unwrap(), InsertOutcome::Inserted);
        assert_eq!(store.insert(&first).await.unwrap(), InsertOutcome::Duplicate);

        let stored = seen.lock().unwrap().clone();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["type"], "VNL");
        assert!(stored[0]["buy_price"].is_null());
        assert_eq!(stored[0]["timestamp"], "2024-01-01T09:00:00");

        let why = store.insert(&row("GSJC24010110", "")).await.unwrap_err();
        assert!(matches!(why, StoreError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_save_all() {
        let seen: Seen = Arc::default();
        let store = RestStore::new(&setting(serve(seen.clone()).await), 5).unwrap();
        let rows = vec![
            row("GVNL24010110", "1 lượng"),
            row("GVNL24010110", "1 lượng"),
            row("GSJC24010110", ""),
            row("GBTMC24010110", "1 lượng"),
        ];

        let summary = store::save_all(&store, &rows, OnError::Continue)
            .await
            .unwrap();
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn test_unreachable() {
        let store = RestStore::new(&setting("http://127.0.0.1:9".to_string()), 1).unwrap();
        let why = store.insert(&row("GVNL24010110", "1 lượng")).await.unwrap_err();
        assert!(matches!(why, StoreError::Connection(_)));
    }
}
