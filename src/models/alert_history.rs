use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Append-only record of a trigger. Written exactly once per alert, inside
/// the same transaction that flips `is_triggered`. Deleted only when its
/// alert is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertHistory {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub alert_id: ObjectId,

    pub triggered_price: f64,
    pub triggered_at: i64,
}
