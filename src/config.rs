use std::env;

#[derive(Debug, Clone)]
pub struct Settings {
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub host: String,
    pub port: u16,

    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,

    pub finnhub_api_key: String,

    pub sendgrid_api_key: String,
    pub email_from: String,

    // shared secret expected on POST /tasks/process
    pub webhook_token: String,

    // seconds between scheduled evaluation passes
    pub check_interval_secs: u64,

    pub cors_origins: Vec<String>,
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let mongodb_uri = env::var("MONGODB_URI")
        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());

    let mongodb_db = env::var("MONGODB_DB")
        .unwrap_or_else(|_| "stockalerts".to_string());

    let host = env::var("HOST")
        .unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| "change-me-dev-secret".to_string());

    let jwt_ttl_minutes = env::var("ACCESS_TOKEN_EXPIRE_MINUTES")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(1440);

    let finnhub_api_key = env::var("FINNHUB_API_KEY").unwrap_or_default();

    let sendgrid_api_key = env::var("SENDGRID_API_KEY").unwrap_or_default();
    let email_from = env::var("EMAIL_FROM").unwrap_or_default();

    let webhook_token = env::var("WEBHOOK_TOKEN").unwrap_or_default();

    let check_interval_secs = env::var("CHECK_INTERVAL_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(10);

    let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173".to_string())
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Settings {
        mongodb_uri,
        mongodb_db,
        host,
        port,
        jwt_secret,
        jwt_ttl_minutes,
        finnhub_api_key,
        sendgrid_api_key,
        email_from,
        webhook_token,
        check_interval_secs,
        cors_origins,
    }
}
