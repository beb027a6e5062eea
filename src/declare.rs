use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// 金價類別
#[derive(PartialEq, Eq, Debug, Copy, Clone, Display)]
pub enum Category {
    /// 西貢珠寶 SJC 金條
    #[strum(serialize = "SJC")]
    Sjc,
    /// 寶信明州 BTMC 金品
    #[strum(serialize = "BTMC")]
    Btmc,
    /// 原料金 (vàng nguyên liệu)
    #[strum(serialize = "VNL")]
    Vnl,
}

/// 原料金的標記，比對前名稱會先轉成大寫
const RAW_MATERIAL_MARKER: &str = "NGUYÊN LIỆU";

impl Category {
    /// 依名稱判斷類別，優先順序為 SJC > BTMC > 原料金，都不符合回傳 None
    pub fn classify(name: &str) -> Option<Self> {
        let name_upper = name.to_uppercase();

        if name_upper.contains("SJC") {
            Some(Category::Sjc)
        } else if name_upper.contains("BTMC") {
            Some(Category::Btmc)
        } else if name_upper.contains(RAW_MATERIAL_MARKER) {
            Some(Category::Vnl)
        } else {
            None
        }
    }

    /// 內部使用的前置字元，用於產生資料列的 id
    pub fn prefix(&self) -> &'static str {
        match self {
            Category::Sjc => "GSJC",
            Category::Btmc => "GBTMC",
            Category::Vnl => "GVNL",
        }
    }

    /// 對外公開的類別代碼，即前置字元去掉開頭的 `G`
    pub fn code(&self) -> &'static str {
        let prefix = self.prefix();
        prefix.strip_prefix('G').unwrap_or(prefix)
    }

    pub fn iterator() -> impl Iterator<Item = Self> {
        [Self::Sjc, Self::Btmc, Self::Vnl].iter().copied()
    }
}

/// 來源資料的格式
#[derive(
    Serialize, Deserialize, PartialEq, Eq, Debug, Copy, Clone, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum FeedFormat {
    #[default]
    Json,
    Xml,
}

/// 報價時間無法解析時的處理方式
#[derive(
    Serialize, Deserialize, PartialEq, Eq, Debug, Copy, Clone, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum TimestampPolicy {
    /// 以目前時間代替
    #[default]
    Lenient,
    /// 捨棄該筆報價
    Strict,
}

/// 資料寫入的目的地
#[derive(
    Serialize, Deserialize, PartialEq, Eq, Debug, Copy, Clone, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StoreKind {
    /// 直接連線 PostgreSQL
    #[default]
    Postgres,
    /// 透過 Supabase (PostgREST) 的 REST API
    Rest,
}

/// 單筆寫入失敗時的處理方式
#[derive(
    Serialize, Deserialize, PartialEq, Eq, Debug, Copy, Clone, Default, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OnError {
    /// 記錄後繼續寫入其餘資料
    #[default]
    Continue,
    /// 停止寫入其餘資料
    Abort,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Category::classify("SJC 9999"), Some(Category::Sjc));
        assert_eq!(Category::classify("vàng miếng sjc"), Some(Category::Sjc));
        assert_eq!(
            Category::classify("VÀNG RỒNG THĂNG LONG BTMC"),
            Some(Category::Btmc)
        );
        assert_eq!(Category::classify("Vàng nguyên liệu"), Some(Category::Vnl));
        assert_eq!(Category::classify("Bạc"), None);
        assert_eq!(Category::classify(""), None);
    }

    #[test]
    fn test_classify_precedence() {
        assert_eq!(Category::classify("BTMC SJC"), Some(Category::Sjc));
        assert_eq!(Category::classify("btmc nguyên liệu"), Some(Category::Btmc));
        assert_eq!(
            Category::classify("SJC nguyên liệu BTMC"),
            Some(Category::Sjc)
        );
    }

    #[test]
    fn test_code() {
        let codes: Vec<&str> = Category::iterator().map(|c| c.code()).collect();
        assert_eq!(codes, vec!["SJC", "BTMC", "VNL"]);

        for category in Category::iterator() {
            assert_eq!(category.to_string(), category.code());
            assert!(category.prefix().starts_with('G'));
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!(FeedFormat::from_str("XML").unwrap(), FeedFormat::Xml);
        assert_eq!(FeedFormat::from_str("json").unwrap(), FeedFormat::Json);
        assert!(FeedFormat::from_str("csv").is_err());
        assert_eq!(
            TimestampPolicy::from_str("strict").unwrap(),
            TimestampPolicy::Strict
        );
        assert_eq!(StoreKind::from_str("Rest").unwrap(), StoreKind::Rest);
        assert_eq!(OnError::from_str("abort").unwrap(), OnError::Abort);
    }
}
