use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Which side of the target price fires the alert.
///
/// Stored (and serialized on the wire) as "above" / "below".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Above,
    Below,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Above => "above",
            Direction::Below => "below",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub user_id: ObjectId,

    // canonical uppercase form
    pub symbol: String,

    pub target_price: f64,
    pub direction: Direction,

    // one-way: false -> true, flipped only by the evaluation engine
    pub is_triggered: bool,

    pub created_at: i64,
}
