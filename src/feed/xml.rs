use std::fmt::Display;

use quick_xml::{
    events::{BytesStart, Event},
    Reader,
};

use crate::{
    declare::FeedFormat,
    error::CrawlError,
    feed::{FeedDecoder, RawAttributeGroup, SlotScan},
};

/// 每筆外層資料的標籤名稱
const RECORD_TAG: &[u8] = b"Data";

/// Decodes XML responses where each `<Data .../>` element carries one outer record as
/// attributes. `Data` elements are collected at any depth, in document order.
pub struct XmlDecoder;

impl FeedDecoder for XmlDecoder {
    fn format(&self) -> FeedFormat {
        FeedFormat::Xml
    }

    fn decode(&self, body: &str) -> Result<Vec<RawAttributeGroup>, CrawlError> {
        let body = body.strip_prefix('\u{feff}').unwrap_or(body);
        let mut reader = Reader::from_str(body);
        reader.config_mut().trim_text(true);

        let mut groups = Vec::new();
        let mut depth = 0usize;
        let mut has_root = false;

        loop {
            match reader.read_event().map_err(decode_error)? {
                Event::Start(e) => {
                    enter_element(depth, &mut has_root)?;
                    depth += 1;
                    if e.local_name().as_ref() == RECORD_TAG {
                        groups.push(to_group(&e)?);
                    }
                }
                Event::Empty(e) => {
                    enter_element(depth, &mut has_root)?;
                    if e.local_name().as_ref() == RECORD_TAG {
                        groups.push(to_group(&e)?);
                    }
                }
                Event::End(_) => {
                    depth = depth.saturating_sub(1);
                }
                Event::Text(_) | Event::CData(_) if depth == 0 => {
                    return Err(decode_error("text outside of the root element"));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !has_root {
            return Err(decode_error("no root element"));
        }

        if depth != 0 {
            return Err(decode_error("unexpected end of document, element not closed"));
        }

        Ok(groups)
    }

    fn scan(&self) -> SlotScan {
        SlotScan::TrailingSuffix
    }
}

/// 只允許一個根節點
fn enter_element(depth: usize, has_root: &mut bool) -> Result<(), CrawlError> {
    if depth == 0 {
        if *has_root {
            return Err(decode_error("more than one root element"));
        }
        *has_root = true;
    }

    Ok(())
}

fn to_group(e: &BytesStart) -> Result<RawAttributeGroup, CrawlError> {
    let mut group = RawAttributeGroup::new();

    for attr in e.attributes() {
        let attr = attr.map_err(decode_error)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(decode_error)?.into_owned();
        group.push(key, value);
    }

    Ok(group)
}

fn decode_error(why: impl Display) -> CrawlError {
    CrawlError::Decode {
        format: FeedFormat::Xml.to_string(),
        reason: why.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::assert_err;

    use super::*;

    #[test]
    fn test_decode() {
        let body = r#"<?xml version="1.0" encoding="utf-8"?>
<DataList>
  <Data row="1" n_1="VÀNG MIẾNG SJC" pb_1="118000000" ps_1="120000000" d_1="01/01/2024 09:00" />
  <Data row="2" n_2="Vàng nguyên liệu &amp; trang sức" pb_2="0" ps_2="0" d_2="01/01/2024 09:00"></Data>
  <Other n_3="SJC" />
</DataList>"#;

        let groups = XmlDecoder.decode(body).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].get("row"), Some("1"));
        assert_eq!(groups[0].get("n_1"), Some("VÀNG MIẾNG SJC"));
        assert_eq!(groups[0].get("ps_1"), Some("120000000"));
        assert_eq!(groups[1].get("n_2"), Some("Vàng nguyên liệu & trang sức"));
    }

    #[test]
    fn test_nested_records() {
        let body = r#"<Root><DataList><Data n_1="SJC"/></DataList><Data n_2="BTMC"/></Root>"#;
        let groups = XmlDecoder.decode(body).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].get("n_2"), Some("BTMC"));
    }

    #[test]
    fn test_no_records() {
        let groups = XmlDecoder.decode("<DataList></DataList>").unwrap();
        assert!(groups.is_empty());
    }

    #[test]
    fn test_malformed() {
        assert_err!(XmlDecoder.decode(""));
        assert_err!(XmlDecoder.decode("<DataList><Data n_1=\"SJC\"/>"));
        assert_err!(XmlDecoder.decode("<DataList></Data>"));
        assert_err!(XmlDecoder.decode("<a/><b/>"));
        assert_err!(XmlDecoder.decode("{\"DataList\":{}}"));
        assert_err!(XmlDecoder.decode("<Data n_1=\"SJC\" n_1=\"BTMC\"/>"));
    }
}
