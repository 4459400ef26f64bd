//! Coinranking API client.
//!
//! Because watching ten coins shed value in real time beats doing it one
//! browser tab at a time.

use crate::models::Coin;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// The RapidAPI gateway in front of Coinranking.
pub const DEFAULT_BASE_URL: &str = "https://coinranking1.p.rapidapi.com";

/// Host header RapidAPI insists on seeing next to the key.
pub const DEFAULT_API_HOST: &str = "coinranking1.p.rapidapi.com";

const USER_AGENT: &str = concat!("coinwatch/", env!("CARGO_PKG_VERSION"));

/// Failures the fetch layer can produce.
///
/// Everything collapses to a single display string at the state layer, but
/// keeping the variants apart makes the tests honest about what went wrong.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status. Carries the server's own
    /// `message` field when the body had one.
    #[error("{0}")]
    Api(String),
    /// Transport-level failure (DNS, TLS, timeout, ...).
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// The body was not the shape we were promised.
    #[error("unexpected response from API: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Coinranking API client.
#[derive(Clone)]
pub struct CoinrankingClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_host: String,
}

impl CoinrankingClient {
    /// Create a new client with the given credentials and request timeout.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        api_host: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            api_host: api_host.into(),
        })
    }

    /// Whether an API key was actually supplied.
    pub fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Fetch the top listing of coins, in API order.
    pub async fn fetch_coins(&self, limit: u32) -> Result<Vec<Coin>, ApiError> {
        let url = format!("{}/coins?limit={}", self.base_url, limit);
        let body = self.get(&url).await?;
        let parsed: ListEnvelope = serde_json::from_str(&body)?;
        Ok(parsed.data.coins)
    }

    /// Fetch full details for one coin by uuid.
    pub async fn fetch_coin(&self, uuid: &str) -> Result<Coin, ApiError> {
        let url = format!("{}/coin/{}", self.base_url, uuid);
        let body = self.get(&url).await?;
        let parsed: DetailEnvelope = serde_json::from_str(&body)?;
        Ok(parsed.data.coin)
    }

    /// Search for coins matching a term.
    ///
    /// A blank term resolves to an empty list without touching the network.
    /// Otherwise the suggestion endpoint supplies uuids, and the detail
    /// endpoint is hit once per uuid with the requests in flight together.
    /// A failed detail lookup degrades to the bare suggestion record; only a
    /// failed suggestion call fails the whole search. Result order follows
    /// suggestion order.
    pub async fn search_coins(&self, term: &str) -> Result<Vec<Coin>, ApiError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "{}/search-suggestions?query={}",
            self.base_url,
            urlencoding::encode(term)
        );
        let body = self.get(&url).await?;
        let parsed: ListEnvelope = serde_json::from_str(&body)?;
        let suggestions = parsed.data.coins;

        if suggestions.is_empty() {
            return Ok(Vec::new());
        }

        Ok(resolve_details(suggestions, |uuid| async move { self.fetch_coin(&uuid).await }).await)
    }

    /// Issue an authenticated GET and return the raw body of a 2xx response.
    async fn get(&self, url: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .get(url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.api_host)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api(error_reason(status, &body)));
        }

        Ok(response.text().await?)
    }
}

/// Upgrade each suggestion to its full detail record, with all lookups in
/// flight together. A lookup that fails keeps the suggestion it was meant to
/// replace, so one bad coin never voids the rest. `join_all` guarantees the
/// output order matches the suggestion order no matter which lookup settles
/// first.
async fn resolve_details<F, Fut>(suggestions: Vec<Coin>, lookup: F) -> Vec<Coin>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Coin, ApiError>>,
{
    let lookups = suggestions.into_iter().map(|suggestion| {
        let detail = lookup(suggestion.uuid.clone());
        async move { detail.await.unwrap_or(suggestion) }
    });
    join_all(lookups).await
}

/// Pull the server's `message` out of an error body, falling back to the
/// status line when the body is empty or not the expected shape.
fn error_reason(status: reqwest::StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|e| e.message)
        .unwrap_or_else(|| format!("API returned {}", status))
}

// Response envelopes. The API wraps everything in a `data` object.

#[derive(Debug, Deserialize)]
struct ListEnvelope {
    data: CoinList,
}

#[derive(Debug, Deserialize)]
struct CoinList {
    #[serde(default)]
    coins: Vec<Coin>,
}

#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    data: CoinDetail,
}

#[derive(Debug, Deserialize)]
struct CoinDetail {
    coin: Coin,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CoinrankingClient {
        CoinrankingClient::new("test-key", DEFAULT_BASE_URL, DEFAULT_API_HOST, 5)
            .expect("client should build")
    }

    #[test]
    fn test_error_reason_uses_server_message() {
        let reason = error_reason(
            reqwest::StatusCode::TOO_MANY_REQUESTS,
            r#"{"message":"rate limited"}"#,
        );
        assert_eq!(reason, "rate limited");
    }

    #[test]
    fn test_error_reason_falls_back_to_status() {
        let reason = error_reason(reqwest::StatusCode::BAD_GATEWAY, "<html>nope</html>");
        assert_eq!(reason, "API returned 502 Bad Gateway");

        let reason = error_reason(reqwest::StatusCode::NOT_FOUND, "");
        assert_eq!(reason, "API returned 404 Not Found");
    }

    #[test]
    fn test_api_error_display_is_bare_message() {
        let err = ApiError::Api("rate limited".to_string());
        assert_eq!(err.to_string(), "rate limited");
    }

    #[test]
    fn test_list_envelope_parses() {
        let body = r#"{"status":"success","data":{"stats":{"total":1},"coins":[
            {"uuid":"a","name":"Bit","symbol":"BIT","price":"10.5"}
        ]}}"#;
        let parsed: ListEnvelope = serde_json::from_str(body).expect("should parse");
        assert_eq!(parsed.data.coins.len(), 1);
        assert_eq!(parsed.data.coins[0].price, "10.5");
    }

    #[test]
    fn test_list_envelope_tolerates_missing_coins() {
        let body = r#"{"data":{}}"#;
        let parsed: ListEnvelope = serde_json::from_str(body).expect("should parse");
        assert!(parsed.data.coins.is_empty());
    }

    #[test]
    fn test_detail_envelope_parses() {
        let body = r#"{"data":{"coin":{"uuid":"a","name":"Bit","symbol":"BIT","price":"1"}}}"#;
        let parsed: DetailEnvelope = serde_json::from_str(body).expect("should parse");
        assert_eq!(parsed.data.coin.uuid, "a");
    }

    fn suggestion(uuid: &str) -> Coin {
        Coin {
            uuid: uuid.to_string(),
            name: format!("{}-name", uuid),
            symbol: uuid.to_uppercase(),
            ..Coin::default()
        }
    }

    #[tokio::test]
    async fn test_failed_detail_keeps_suggestion_in_place() {
        let suggestions = vec![suggestion("a"), suggestion("b"), suggestion("c")];

        let resolved = resolve_details(suggestions, |uuid| async move {
            if uuid == "b" {
                Err(ApiError::Api("detail endpoint down".to_string()))
            } else {
                Ok(Coin {
                    uuid: uuid.clone(),
                    name: format!("{}-detail", uuid),
                    symbol: uuid.to_uppercase(),
                    price: "99.0".to_string(),
                    ..Coin::default()
                })
            }
        })
        .await;

        // Same length, same order, the failed index holds the suggestion.
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].name, "a-detail");
        assert_eq!(resolved[1].name, "b-name");
        assert_eq!(resolved[2].name, "c-detail");
        assert_eq!(resolved[1].price, "0");
    }

    #[tokio::test]
    async fn test_all_details_resolve_in_suggestion_order() {
        let suggestions: Vec<Coin> = ["x", "y", "z"].iter().map(|u| suggestion(u)).collect();

        let resolved = resolve_details(suggestions, |uuid| async move {
            // Stagger completion so later suggestions settle first.
            let delay = match uuid.as_str() {
                "x" => 30,
                "y" => 20,
                _ => 1,
            };
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            Ok(Coin {
                uuid,
                ..Coin::default()
            })
        })
        .await;

        let uuids: Vec<&str> = resolved.iter().map(|c| c.uuid.as_str()).collect();
        assert_eq!(uuids, vec!["x", "y", "z"]);
    }

    #[tokio::test]
    async fn test_blank_search_skips_network() {
        // The client points at a real host but a blank term must return
        // before any request is issued, so this cannot hit the network.
        let coins = client().search_coins("   ").await.expect("blank search");
        assert!(coins.is_empty());

        let coins = client().search_coins("").await.expect("empty search");
        assert!(coins.is_empty());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let c = CoinrankingClient::new("k", "https://example.test/", "example.test", 5)
            .expect("client should build");
        assert_eq!(c.base_url, "https://example.test");
    }
}
