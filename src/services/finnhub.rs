use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

// One slow symbol must not stall the whole batch.
const QUOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Classified result of one quote lookup. Retry policy lives with the
/// caller, not here: the evaluation engine defers to the next pass.
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteOutcome {
    Price(f64),
    NoData,
    RateLimited,
    TransportError(String),
}

#[derive(Clone)]
pub struct FinnhubClient {
    http: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct QuoteBody {
    // current price; Finnhub reports 0 for unknown symbols
    c: Option<f64>,
}

impl FinnhubClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        let http = Client::builder()
            .timeout(QUOTE_TIMEOUT)
            .build()
            .expect("finnhub http client");

        Self {
            http,
            api_key,
            base_url,
        }
    }

    /// GET /quote for one symbol, classified into a `QuoteOutcome`.
    pub async fn quote(&self, symbol: &str) -> QuoteOutcome {
        let url = format!("{}/quote", self.base_url);

        let res = match self
            .http
            .get(&url)
            .query(&[("symbol", symbol), ("token", &self.api_key)])
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return QuoteOutcome::TransportError(e.to_string()),
        };

        if res.status() == StatusCode::TOO_MANY_REQUESTS {
            return QuoteOutcome::RateLimited;
        }

        if !res.status().is_success() {
            return QuoteOutcome::TransportError(format!("finnhub status {}", res.status()));
        }

        let body = match res.json::<QuoteBody>().await {
            Ok(b) => b,
            Err(_) => return QuoteOutcome::NoData,
        };

        match body.c {
            Some(price) if price.is_finite() && price > 0.0 => QuoteOutcome::Price(price),
            _ => QuoteOutcome::NoData,
        }
    }
}
