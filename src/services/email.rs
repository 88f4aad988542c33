use std::sync::Arc;
use std::time::Duration;

use handlebars::Handlebars;
use reqwest::Client;
use serde_json::json;

use crate::models::AlertEvent;

const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com";

const SEND_TIMEOUT: Duration = Duration::from_secs(15);

/// SendGrid mail sender for triggered alerts.
///
/// Lives entirely off the evaluation path: callers run `send_alert` on a
/// detached task and only log the result.
#[derive(Clone)]
pub struct EmailClient {
    http: Client,
    api_key: String,
    from: String,
    base_url: String,
    hbs: Arc<Handlebars<'static>>,
}

fn build_templates() -> Arc<Handlebars<'static>> {
    let mut hb = Handlebars::new();

    hb.register_template_string("email/alert", include_str!("../../templates/alert_email.hbs"))
        .expect("template email/alert");

    Arc::new(hb)
}

impl EmailClient {
    pub fn new(api_key: String, from: String) -> Self {
        Self::with_base_url(api_key, from, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, from: String, base_url: String) -> Self {
        let http = Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("sendgrid http client");

        Self {
            http,
            api_key,
            from,
            base_url,
            hbs: build_templates(),
        }
    }

    fn has_key(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.from.trim().is_empty()
    }

    pub fn render_alert_body(&self, event: &AlertEvent) -> Result<String, String> {
        self.hbs
            .render(
                "email/alert",
                &json!({
                    "symbol": event.symbol,
                    "current_price": format!("{:.2}", event.current_price),
                    "target_price": format!("{:.2}", event.target_price),
                    "direction": event.direction.as_str(),
                }),
            )
            .map_err(|e| e.to_string())
    }

    pub async fn send_alert(&self, to: &str, event: &AlertEvent) -> Result<(), String> {
        if !self.has_key() {
            return Err("SENDGRID_API_KEY or EMAIL_FROM is missing in .env".to_string());
        }

        let html = self.render_alert_body(event)?;
        let subject = format!("Stock Alert Triggered: {}", event.symbol);

        let body = json!({
            "personalizations": [{ "to": [{ "email": to }] }],
            "from": { "email": self.from },
            "subject": subject,
            "content": [{ "type": "text/html", "value": html }],
        });

        let url = format!("{}/v3/mail/send", self.base_url);

        let res = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(format!("sendgrid send failed: {status} {text}"));
        }

        Ok(())
    }
}
