use std::sync::OnceLock;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde_json::{json, Value};

const HISTORY_TIMEOUT: Duration = Duration::from_secs(10);

fn http_client() -> &'static Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();

    CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(HISTORY_TIMEOUT)
            .build()
            .expect("history http client")
    })
}

/// Error surface for the historical passthrough; the controller maps these
/// straight onto HTTP statuses.
#[derive(Debug, PartialEq, Eq)]
pub enum HistoryError {
    InvalidPeriod,
    UpstreamBlocked,
    NoChartData,
}

fn period_days(period: &str) -> Option<i64> {
    match period {
        "1d" => Some(1),
        "7d" => Some(7),
        "1m" => Some(30),
        _ => None,
    }
}

/// Thin passthrough over the Yahoo Finance chart endpoint.
///
/// No caching, no reshaping beyond flattening candles; the serving process
/// holds no state for this route.
pub async fn fetch_history(symbol: &str, period: &str) -> Result<Vec<Value>, HistoryError> {
    let days = period_days(period).ok_or(HistoryError::InvalidPeriod)?;

    let now = Utc::now().timestamp();
    let start = now - days * 24 * 60 * 60;

    let url = format!(
        "https://query1.finance.yahoo.com/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history",
        symbol.trim().to_uppercase(),
        start,
        now
    );

    let res = http_client()
        .get(&url)
        .header(reqwest::header::USER_AGENT, "Mozilla/5.0")
        .send()
        .await
        .map_err(|_| HistoryError::UpstreamBlocked)?;

    if !res.status().is_success() {
        return Err(HistoryError::UpstreamBlocked);
    }

    let data = res.json::<Value>().await.map_err(|_| HistoryError::UpstreamBlocked)?;

    let result = data
        .pointer("/chart/result/0")
        .ok_or(HistoryError::NoChartData)?;

    let timestamps = result
        .pointer("/timestamp")
        .and_then(Value::as_array)
        .ok_or(HistoryError::NoChartData)?;

    let quotes = result
        .pointer("/indicators/quote/0")
        .ok_or(HistoryError::NoChartData)?;

    let field = |name: &str, i: usize| -> Value {
        quotes
            .pointer(&format!("/{name}/{i}"))
            .cloned()
            .unwrap_or(Value::Null)
    };

    let mut candles = Vec::with_capacity(timestamps.len());
    for (i, ts) in timestamps.iter().enumerate() {
        let time_ms = ts.as_i64().map(|t| t * 1000);

        candles.push(json!({
            "time": time_ms,
            "open": field("open", i),
            "high": field("high", i),
            "low": field("low", i),
            "close": field("close", i),
        }));
    }

    Ok(candles)
}
