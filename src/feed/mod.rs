use crate::{declare::FeedFormat, error::CrawlError, util::text};

/// JSON 格式
pub mod json;
/// XML 格式
pub mod xml;

/// 每筆外層資料最多的報價欄位數，欄位編號為 1..=9
pub const MAX_SLOT: usize = 9;

/// One outer record of the feed: attribute keys in document order with their values.
///
/// Keys follow the positional convention `n_i` (name), `pb_i` (buy), `ps_i` (sell)
/// and `d_i` (time) for a slot index `i`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RawAttributeGroup {
    attrs: Vec<(String, String)>,
}

impl RawAttributeGroup {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.attrs.push((key.into(), value.into()));
    }

    /// 回傳第一個符合的值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    fn entry(&self, index: usize) -> Option<(&str, &str)> {
        self.attrs
            .get(index)
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawAttributeGroup {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        RawAttributeGroup {
            attrs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 解析來源資料的策略
pub trait FeedDecoder: Send + Sync {
    fn format(&self) -> FeedFormat;

    /// 將回應內容轉成外層資料列
    fn decode(&self, body: &str) -> Result<Vec<RawAttributeGroup>, CrawlError>;

    /// 此格式對應的欄位掃描方式
    fn scan(&self) -> SlotScan;
}

pub fn decoder_for(format: FeedFormat) -> Box<dyn FeedDecoder> {
    match format {
        FeedFormat::Json => Box::new(json::JsonDecoder),
        FeedFormat::Xml => Box::new(xml::XmlDecoder),
    }
}

/// How the slots of one outer record are located.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SlotScan {
    /// Probe `n_1` through `n_9` in index order.
    Positional,
    /// Walk the `n_*` keys in document order and pair each one with the
    /// `pb_/ps_/d_` keys that share its last character. Indices of 10 or more alias
    /// onto a single digit, so feeds are limited to slots 1..=9.
    TrailingSuffix,
}

/// One populated quote slot, borrowed from its [`RawAttributeGroup`].
///
/// Missing price or time keys are represented as empty strings.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QuoteSlot<'a> {
    pub name: &'a str,
    pub buy: &'a str,
    pub sell: &'a str,
    pub time: &'a str,
}

/// Lazy iterator over the populated slots of one outer record.
pub struct Slots<'a> {
    group: &'a RawAttributeGroup,
    scan: SlotScan,
    cursor: usize,
}

impl<'a> Slots<'a> {
    pub fn new(group: &'a RawAttributeGroup, scan: SlotScan) -> Self {
        Slots {
            group,
            scan,
            cursor: 0,
        }
    }

    fn slot(&self, name: &'a str, suffix: &str) -> QuoteSlot<'a> {
        let group: &'a RawAttributeGroup = self.group;
        let field = |prefix: &str| group.get(&format!("{}_{}", prefix, suffix)).unwrap_or("");

        QuoteSlot {
            name,
            buy: field("pb"),
            sell: field("ps"),
            time: field("d"),
        }
    }
}

impl<'a> Iterator for Slots<'a> {
    type Item = QuoteSlot<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let group: &'a RawAttributeGroup = self.group;

        match self.scan {
            SlotScan::Positional => {
                while self.cursor < MAX_SLOT {
                    self.cursor += 1;
                    let index = self.cursor.to_string();

                    match group.get(&format!("n_{}", index)) {
                        Some(name) if !name.is_empty() => return Some(self.slot(name, &index)),
                        _ => continue,
                    }
                }

                None
            }
            SlotScan::TrailingSuffix => {
                while let Some((key, name)) = group.entry(self.cursor) {
                    self.cursor += 1;

                    if !key.starts_with("n_") || name.is_empty() {
                        continue;
                    }

                    if let Some(suffix) = text::trailing_suffix(key) {
                        return Some(self.slot(name, suffix));
                    }
                }

                None
            }
        }
    }
}

/// Chains the slots of every outer record, in feed order.
pub fn extract(
    groups: &[RawAttributeGroup],
    scan: SlotScan,
) -> impl Iterator<Item = QuoteSlot<'_>> + '_ {
    groups.iter().flat_map(move |group| Slots::new(group, scan))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(pairs: &[(&str, &str)]) -> RawAttributeGroup {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_no_names_no_slots() {
        let g = group(&[("row", "1"), ("pb_1", "100"), ("ps_1", "200")]);
        assert_eq!(Slots::new(&g, SlotScan::Positional).count(), 0);
        assert_eq!(Slots::new(&g, SlotScan::TrailingSuffix).count(), 0);
        assert_eq!(Slots::new(&RawAttributeGroup::new(), SlotScan::Positional).count(), 0);
    }

    #[test]
    fn test_positional() {
        let g = group(&[
            ("n_3", "Bạc"),
            ("pb_3", "1"),
            ("n_1", "SJC 9999"),
            ("pb_1", "118000000"),
            ("ps_1", "120000000"),
            ("d_1", "01/01/2024 09:00"),
            ("n_2", ""),
            ("n_10", "ignored"),
        ]);

        let slots: Vec<QuoteSlot> = Slots::new(&g, SlotScan::Positional).collect();
        assert_eq!(slots.len(), 2);
        assert_eq!(
            slots[0],
            QuoteSlot {
                name: "SJC 9999",
                buy: "118000000",
                sell: "120000000",
                time: "01/01/2024 09:00",
            }
        );
        assert_eq!(
            slots[1],
            QuoteSlot {
                name: "Bạc",
                buy: "1",
                sell: "",
                time: "",
            }
        );
    }

    #[test]
    fn test_trailing_suffix_follows_document_order() {
        let g = group(&[
            ("row", "1"),
            ("n_2", "Vàng nguyên liệu"),
            ("pb_2", "0"),
            ("n_1", "SJC"),
            ("ps_1", "5"),
        ]);

        let names: Vec<&str> = Slots::new(&g, SlotScan::TrailingSuffix)
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Vàng nguyên liệu", "SJC"]);
    }

    #[test]
    fn test_trailing_suffix_aliases_two_digit_indices() {
        let g = group(&[
            ("n_10", "SJC"),
            ("pb_10", "999"),
            ("pb_0", "111"),
        ]);

        let slot = Slots::new(&g, SlotScan::TrailingSuffix).next().unwrap();
        assert_eq!(slot.buy, "111");
    }

    #[test]
    fn test_extract_chains_groups() {
        let groups = vec![
            group(&[("n_1", "SJC")]),
            group(&[("row", "2")]),
            group(&[("n_1", "BTMC"), ("n_2", "Vàng nguyên liệu")]),
        ];

        let names: Vec<&str> = extract(&groups, SlotScan::Positional)
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["SJC", "BTMC", "Vàng nguyên liệu"]);
    }

    #[test]
    fn test_decoder_for() {
        assert_eq!(decoder_for(FeedFormat::Json).format(), FeedFormat::Json);
        assert_eq!(decoder_for(FeedFormat::Json).scan(), SlotScan::Positional);
        assert_eq!(decoder_for(FeedFormat::Xml).format(), FeedFormat::Xml);
        assert_eq!(decoder_for(FeedFormat::Xml).scan(), SlotScan::TrailingSuffix);
    }
}
