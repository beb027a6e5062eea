use concat_string::concat_string;

use crate::config;

/// 金價報價
pub mod price;

/// 組出含金鑰的報價網址
pub fn price_url(feed: &config::Feed) -> String {
    let separator = if feed.url.contains('?') { "&" } else { "?" };
    concat_string!(
        feed.url,
        separator,
        "key=",
        urlencoding::encode(&feed.key)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_url() {
        let mut feed = config::Feed {
            key: "3kd8ub1llcg9t45hnoh8hmn7t5kc2v".to_string(),
            ..Default::default()
        };
        assert_eq!(
            price_url(&feed),
            "http://api.btmc.vn/api/BTMCAPI/getpricebtmc?key=3kd8ub1llcg9t45hnoh8hmn7t5kc2v"
        );

        feed.url = "http://localhost/feed?format=xml".to_string();
        feed.key = "a b&c".to_string();
        assert_eq!(price_url(&feed), "http://localhost/feed?format=xml&key=a%20b%26c");
    }
}
