use std::time::Duration;

use anyhow::Result;
use chrono::{Local, NaiveDateTime};

use crate::{
    config,
    crawler::btmc,
    database::table::gold_price::GoldPrice,
    declare::{Category, TimestampPolicy},
    feed, logging, util,
};

/// 抓取金價報價
pub async fn visit(setting: &config::Feed) -> Result<Vec<GoldPrice>> {
    let url = btmc::price_url(setting);
    let body = util::http::get_text(&url, Duration::from_secs(setting.timeout_secs)).await?;

    parse(&body, setting, Local::now().naive_local()).inspect_err(|why| {
        logging::error_file_async(format!(
            "Failed to decode the feed because {:?}. Raw response: {}",
            why,
            body.chars().take(300).collect::<String>()
        ));
    })
}

/// 將回應內容轉成金價資料列。
///
/// 名稱無法歸類的報價直接略過；`latest_only` 時只保留時間最新的報價，
/// 且報價時間無法解析的資料一律捨棄。
pub fn parse(body: &str, setting: &config::Feed, now: NaiveDateTime) -> Result<Vec<GoldPrice>> {
    let decoder = feed::decoder_for(setting.format);
    let groups = decoder.decode(body)?;
    logging::debug_file_async(format!(
        "{} feed decoded into {} records",
        decoder.format(),
        groups.len()
    ));

    let policy = if setting.latest_only {
        TimestampPolicy::Strict
    } else {
        setting.timestamp_policy
    };

    let rows: Vec<GoldPrice> = feed::extract(&groups, decoder.scan())
        .filter_map(|slot| {
            let category = Category::classify(slot.name)?;
            GoldPrice::build(
                category,
                &slot,
                &setting.unit,
                &setting.source,
                policy,
                now,
            )
        })
        .collect();

    if setting.latest_only {
        return Ok(retain_latest(rows));
    }

    Ok(rows)
}

/// 只保留報價時間等於最大值的資料列
pub fn retain_latest(mut rows: Vec<GoldPrice>) -> Vec<GoldPrice> {
    if let Some(latest) = rows.iter().map(|r| r.timestamp).max() {
        rows.retain(|r| r.timestamp == latest);
    }

    rows
}
