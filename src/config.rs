use std::{env, path::Path, path::PathBuf, str::FromStr};

use anyhow::{anyhow, Result};
use config::{Config as config_config, File as config_file};
use serde::{Deserialize, Serialize};

use crate::declare::{FeedFormat, OnError, StoreKind, TimestampPolicy};

const CONFIG_PATH: &str = "app.json";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct App {
    #[serde(default)]
    pub system: System,
    #[serde(default)]
    pub feed: Feed,
    #[serde(default)]
    pub store: Store,
    #[serde(default)]
    pub postgresql: PostgreSQL,
    #[serde(default)]
    pub supabase: Supabase,
}

const SYSTEM_CRON: &str = "SYSTEM_CRON";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct System {
    /// 排程的 cron 表示式(含秒)，空字串代表只執行一次
    #[serde(default)]
    pub cron: String,
}

const FEED_URL: &str = "FEED_URL";
const FEED_KEY: &str = "FEED_KEY";
const FEED_FORMAT: &str = "FEED_FORMAT";
const FEED_UNIT: &str = "FEED_UNIT";
const FEED_SOURCE: &str = "FEED_SOURCE";
const FEED_LATEST_ONLY: &str = "FEED_LATEST_ONLY";
const FEED_TIMESTAMP_POLICY: &str = "FEED_TIMESTAMP_POLICY";
const FEED_TIMEOUT_SECS: &str = "FEED_TIMEOUT_SECS";

const DEFAULT_FEED_URL: &str = "http://api.btmc.vn/api/BTMCAPI/getpricebtmc";
const DEFAULT_UNIT: &str = "1 lượng";
const DEFAULT_SOURCE: &str = "btmc.vn";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Feed {
    pub url: String,
    pub key: String,
    pub format: FeedFormat,
    /// 報價的計價單位，例如 "1 lượng" 或 "10 chỉ"
    pub unit: String,
    pub source: String,
    /// 只保留同一批資料中時間最新的報價
    pub latest_only: bool,
    pub timestamp_policy: TimestampPolicy,
    pub timeout_secs: u64,
}

impl Default for Feed {
    fn default() -> Self {
        Feed {
            url: DEFAULT_FEED_URL.to_string(),
            key: String::new(),
            format: FeedFormat::default(),
            unit: DEFAULT_UNIT.to_string(),
            source: DEFAULT_SOURCE.to_string(),
            latest_only: false,
            timestamp_policy: TimestampPolicy::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

const STORE_KIND: &str = "STORE_KIND";
const STORE_ON_ERROR: &str = "STORE_ON_ERROR";

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct Store {
    pub kind: StoreKind,
    pub on_error: OnError,
}

const POSTGRESQL_HOST: &str = "POSTGRESQL_HOST";
const POSTGRESQL_PORT: &str = "POSTGRESQL_PORT";
const POSTGRESQL_USER: &str = "POSTGRESQL_USER";
const POSTGRESQL_PASSWORD: &str = "POSTGRESQL_PASSWORD";
const POSTGRESQL_DB: &str = "POSTGRESQL_DB";

// 舊版部署使用的變數名稱
const SUPABASE_HOST: &str = "SUPABASE_HOST";
const SUPABASE_PORT: &str = "SUPABASE_PORT";
const SUPABASE_USER: &str = "SUPABASE_USER";
const SUPABASE_PASSWORD: &str = "SUPABASE_PASSWORD";
const SUPABASE_DB: &str = "SUPABASE_DB";

const DEFAULT_POSTGRESQL_PORT: i32 = 5432;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PostgreSQL {
    pub host: String,
    pub port: i32,
    pub user: String,
    pub password: String,
    pub db: String,
}

impl Default for PostgreSQL {
    fn default() -> Self {
        PostgreSQL {
            host: String::new(),
            port: DEFAULT_POSTGRESQL_PORT,
            user: String::new(),
            password: String::new(),
            db: String::new(),
        }
    }
}

const SUPABASE_URL: &str = "SUPABASE_URL";
const SUPABASE_KEY: &str = "SUPABASE_KEY";
const SUPABASE_TABLE: &str = "SUPABASE_TABLE";

const DEFAULT_TABLE: &str = "gold_price";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Supabase {
    pub url: String,
    pub key: String,
    pub table: String,
}

impl Default for Supabase {
    fn default() -> Self {
        Supabase {
            url: String::new(),
            key: String::new(),
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl App {
    /// 讀取設定檔(若存在)，再以環境變數覆蓋，最後檢查設定是否完整
    pub fn load() -> Result<Self> {
        let app = Self::from_file_or_default(&config_path())?.override_with_env()?;
        app.validate()?;
        Ok(app)
    }

    fn from_file_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(App::default());
        }

        let app = config_config::builder()
            .add_source(config_file::from(path.to_path_buf()))
            .build()?
            .try_deserialize::<App>()?;

        Ok(app)
    }

    /// 將來至於 env 的設定值覆蓋掉 json 上的設定值
    fn override_with_env(self) -> Result<Self> {
        self.override_with(|name| env::var(name).ok())
    }

    fn override_with<F>(mut self, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(cron) = var(SYSTEM_CRON) {
            self.system.cron = cron;
        }

        if let Some(url) = var(FEED_URL) {
            self.feed.url = url;
        }

        if let Some(key) = var(FEED_KEY) {
            self.feed.key = key;
        }

        if let Some(format) = var(FEED_FORMAT) {
            self.feed.format = parse_enum(FEED_FORMAT, &format)?;
        }

        if let Some(unit) = var(FEED_UNIT) {
            self.feed.unit = unit;
        }

        if let Some(source) = var(FEED_SOURCE) {
            self.feed.source = source;
        }

        if let Some(latest_only) = var(FEED_LATEST_ONLY) {
            self.feed.latest_only = parse_bool(&latest_only).unwrap_or(false);
        }

        if let Some(policy) = var(FEED_TIMESTAMP_POLICY) {
            self.feed.timestamp_policy = parse_enum(FEED_TIMESTAMP_POLICY, &policy)?;
        }

        if let Some(timeout) = var(FEED_TIMEOUT_SECS) {
            self.feed.timeout_secs = u64::from_str(timeout.trim()).unwrap_or(DEFAULT_TIMEOUT_SECS);
        }

        if let Some(kind) = var(STORE_KIND) {
            self.store.kind = parse_enum(STORE_KIND, &kind)?;
        }

        if let Some(on_error) = var(STORE_ON_ERROR) {
            self.store.on_error = parse_enum(STORE_ON_ERROR, &on_error)?;
        }

        if let Some(host) = var(POSTGRESQL_HOST).or_else(|| var(SUPABASE_HOST)) {
            self.postgresql.host = host;
        }

        if let Some(port) = var(POSTGRESQL_PORT).or_else(|| var(SUPABASE_PORT)) {
            self.postgresql.port = i32::from_str(port.trim()).unwrap_or(DEFAULT_POSTGRESQL_PORT);
        }

        if let Some(user) = var(POSTGRESQL_USER).or_else(|| var(SUPABASE_USER)) {
            self.postgresql.user = user;
        }

        if let Some(password) = var(POSTGRESQL_PASSWORD).or_else(|| var(SUPABASE_PASSWORD)) {
            self.postgresql.password = password;
        }

        if let Some(db) = var(POSTGRESQL_DB).or_else(|| var(SUPABASE_DB)) {
            self.postgresql.db = db;
        }

        if let Some(url) = var(SUPABASE_URL) {
            self.supabase.url = url;
        }

        if let Some(key) = var(SUPABASE_KEY) {
            self.supabase.key = key;
        }

        if let Some(table) = var(SUPABASE_TABLE) {
            self.supabase.table = table;
        }

        Ok(self)
    }

    /// 啟動時檢查一次必要的設定值
    pub fn validate(&self) -> Result<()> {
        let mut missing: Vec<&str> = Vec::new();

        if self.feed.url.trim().is_empty() {
            missing.push(FEED_URL);
        }

        if self.feed.key.trim().is_empty() {
            missing.push(FEED_KEY);
        }

        match self.store.kind {
            StoreKind::Postgres => {
                if self.postgresql.host.trim().is_empty() {
                    missing.push(POSTGRESQL_HOST);
                }
                if self.postgresql.user.trim().is_empty() {
                    missing.push(POSTGRESQL_USER);
                }
                if self.postgresql.db.trim().is_empty() {
                    missing.push(POSTGRESQL_DB);
                }
            }
            StoreKind::Rest => {
                if self.supabase.url.trim().is_empty() {
                    missing.push(SUPABASE_URL);
                }
                if self.supabase.key.trim().is_empty() {
                    missing.push(SUPABASE_KEY);
                }
                if self.supabase.table.trim().is_empty() {
                    missing.push(SUPABASE_TABLE);
                }
            }
        }

        if !missing.is_empty() {
            return Err(anyhow!("Missing required settings: {}", missing.join(", ")));
        }

        if self.feed.timeout_secs == 0 {
            return Err(anyhow!("{} must be greater than 0", FEED_TIMEOUT_SECS));
        }

        if self.postgresql.port <= 0 || self.postgresql.port > u16::MAX as i32 {
            return Err(anyhow!(
                "{} is out of range: {}",
                POSTGRESQL_PORT,
                self.postgresql.port
            ));
        }

        Ok(())
    }
}

fn parse_enum<T: FromStr>(name: &str, value: &str) -> Result<T> {
    T::from_str(value.trim()).map_err(|_| anyhow!("Unsupported value for {}: '{}'", name, value))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// 回傳設定檔的路徑
fn config_path() -> PathBuf {
    PathBuf::from(CONFIG_PATH)
}
