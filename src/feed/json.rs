use serde_json::{Map, Value};

use crate::{
    declare::FeedFormat,
    error::CrawlError,
    feed::{FeedDecoder, RawAttributeGroup, SlotScan},
};

/// Decodes `{"DataList": {"Data": [...]}}` responses.
pub struct JsonDecoder;

impl FeedDecoder for JsonDecoder {
    fn format(&self) -> FeedFormat {
        FeedFormat::Json
    }

    fn decode(&self, body: &str) -> Result<Vec<RawAttributeGroup>, CrawlError> {
        let root: Value = serde_json::from_str(body).map_err(|why| CrawlError::Decode {
            format: self.format().to_string(),
            reason: why.to_string(),
        })?;

        // 找不到 DataList.Data 視為沒有資料，不是錯誤
        let groups = match root.get("DataList").and_then(|list| list.get("Data")) {
            Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).map(to_group).collect(),
            Some(Value::Object(item)) => vec![to_group(item)],
            _ => Vec::new(),
        };

        Ok(groups)
    }

    fn scan(&self) -> SlotScan {
        SlotScan::Positional
    }
}

/// 線上的資料欄位名稱前面帶有 `@`，例如 `@n_1`，統一去掉
fn to_group(item: &Map<String, Value>) -> RawAttributeGroup {
    item.iter()
        .filter_map(|(key, value)| {
            let key = key.strip_prefix('@').unwrap_or(key);
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.to_string(), value))
        })
        .collect()
}
