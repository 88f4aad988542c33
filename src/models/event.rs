use serde::Serialize;

use super::{Alert, Direction};

/// Transient trigger notification. Built from committed alert values right
/// after the transition lands, handed to the fanout, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct AlertEvent {
    #[serde(rename = "type")]
    pub kind: &'static str,

    pub symbol: String,
    pub current_price: f64,
    pub target_price: f64,
    pub direction: Direction,
}

impl AlertEvent {
    pub fn triggered(alert: &Alert, current_price: f64) -> Self {
        Self {
            kind: "alert_triggered",
            symbol: alert.symbol.clone(),
            current_price,
            target_price: alert.target_price,
            direction: alert.direction,
        }
    }
}

/// Channel name a user's live sessions listen on. Kept as the wire-visible
/// convention even though delivery is in-process.
pub fn channel_key(user_id: &mongodb::bson::oid::ObjectId) -> String {
    format!("user:{}:alerts", user_id.to_hex())
}
