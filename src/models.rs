//! Data models for cryptocurrency market data.

use serde::{Deserialize, Serialize};

/// A single cryptocurrency as reported by the Coinranking API.
///
/// The API delivers every numeric field as a decimal string, so that is what
/// we store. Helper methods parse on demand for display math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    /// Unique identifier, stable across endpoints
    pub uuid: String,
    /// Full name of the coin (e.g., "Bitcoin")
    pub name: String,
    /// Ticker symbol (e.g., "BTC")
    pub symbol: String,
    /// Current price in USD as a decimal string
    #[serde(default)]
    pub price: String,
    /// 24h percentage change, signed decimal string
    #[serde(default)]
    pub change: Option<String>,
    /// Market capitalization in USD as a decimal string
    #[serde(default, alias = "market_cap")]
    pub market_cap: Option<String>,
    /// 24h trading volume. The API spells this key three different ways
    /// depending on the endpoint, so we normalize it here once and never
    /// think about it again.
    #[serde(
        default,
        rename = "24hVolume",
        alias = "volume24h",
        alias = "24h_volume"
    )]
    pub volume_24h: Option<String>,
    /// URL of the coin's icon
    #[serde(default)]
    pub icon_url: Option<String>,
}

impl Coin {
    /// Parse the price string, falling back to 0.0 for anything unparseable.
    pub fn price_value(&self) -> f64 {
        self.price.parse().unwrap_or(0.0)
    }

    /// Parse the 24h change percentage, if present.
    pub fn change_value(&self) -> Option<f64> {
        self.change.as_deref().and_then(|c| c.parse().ok())
    }

    /// Whether the coin lost value over the last 24h.
    /// A missing change field counts as not declining.
    pub fn is_decline(&self) -> bool {
        self.change
            .as_deref()
            .is_some_and(|c| c.trim_start().starts_with('-'))
    }

    /// Parse the market cap string, if present.
    pub fn market_cap_value(&self) -> Option<f64> {
        self.market_cap.as_deref().and_then(|m| m.parse().ok())
    }

    /// Parse the 24h volume string, if present.
    pub fn volume_value(&self) -> Option<f64> {
        self.volume_24h.as_deref().and_then(|v| v.parse().ok())
    }
}

impl Default for Coin {
    fn default() -> Self {
        Self {
            uuid: String::new(),
            name: String::new(),
            symbol: String::new(),
            price: "0".to_string(),
            change: None,
            market_cap: None,
            volume_24h: None,
            icon_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coin_from(json: &str) -> Coin {
        serde_json::from_str(json).expect("coin should deserialize")
    }

    #[test]
    fn test_deserialize_listing_shape() {
        let coin = coin_from(
            r#"{
                "uuid": "Qwsogvtv82FCd",
                "name": "Bitcoin",
                "symbol": "BTC",
                "price": "63432.21",
                "change": "-1.52",
                "marketCap": "1250000000000",
                "24hVolume": "32000000000",
                "iconUrl": "https://cdn.coinranking.com/btc.svg"
            }"#,
        );
        assert_eq!(coin.symbol, "BTC");
        assert_eq!(coin.volume_24h.as_deref(), Some("32000000000"));
        assert!(coin.is_decline());
    }

    #[test]
    fn test_volume_key_aliases_normalize() {
        let a = coin_from(r#"{"uuid":"x","name":"A","symbol":"A","24hVolume":"1"}"#);
        let b = coin_from(r#"{"uuid":"x","name":"A","symbol":"A","volume24h":"1"}"#);
        let c = coin_from(r#"{"uuid":"x","name":"A","symbol":"A","24h_volume":"1"}"#);
        assert_eq!(a.volume_24h.as_deref(), Some("1"));
        assert_eq!(a.volume_24h, b.volume_24h);
        assert_eq!(b.volume_24h, c.volume_24h);
    }

    #[test]
    fn test_market_cap_snake_case_alias() {
        let coin = coin_from(r#"{"uuid":"x","name":"A","symbol":"A","market_cap":"42"}"#);
        assert_eq!(coin.market_cap_value(), Some(42.0));
    }

    #[test]
    fn test_suggestion_shape_missing_fields() {
        // Search suggestions omit most market data; that must not be an error.
        let coin = coin_from(r#"{"uuid":"y","name":"Ether","symbol":"ETH"}"#);
        assert_eq!(coin.price, "");
        assert_eq!(coin.price_value(), 0.0);
        assert!(coin.change.is_none());
        assert!(!coin.is_decline());
    }

    #[test]
    fn test_numeric_accessors() {
        let coin = Coin {
            price: "10.5".to_string(),
            change: Some("2.31".to_string()),
            market_cap: Some("1000000".to_string()),
            volume_24h: Some("not-a-number".to_string()),
            ..Coin::default()
        };
        assert_eq!(coin.price_value(), 10.5);
        assert_eq!(coin.change_value(), Some(2.31));
        assert_eq!(coin.market_cap_value(), Some(1_000_000.0));
        assert_eq!(coin.volume_value(), None);
        assert!(!coin.is_decline());
    }
}
