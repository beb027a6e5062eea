/// 金價抓取與寫入
pub mod gold_price;
