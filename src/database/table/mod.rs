/// 金價
pub mod gold_price;
