use chrono::Utc;
use futures_util::StreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::options::FindOptions;

use crate::{
    models::{Alert, AlertHistory, Direction},
    AppState,
};

pub async fn list_user_alerts(state: &AppState, user_id: ObjectId) -> Result<Vec<Alert>, String> {
    let alerts = state.db.collection::<Alert>("alerts");

    let find_opts = FindOptions::builder()
        .sort(doc! { "created_at": -1 })
        .build();

    let mut cursor = alerts
        .find(doc! { "user_id": user_id }, find_opts)
        .await
        .map_err(|e| e.to_string())?;

    let mut items: Vec<Alert> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res.map_err(|e| e.to_string())?);
    }

    Ok(items)
}

/// Create an untriggered alert. At most one active alert may exist per
/// (user, symbol) pair; the partial unique index from `db_init` backs the
/// check here against a concurrent create.
pub async fn create_alert(
    state: &AppState,
    user_id: ObjectId,
    symbol: &str,
    direction: Direction,
    target_price: f64,
) -> Result<Alert, String> {
    let sym = symbol.trim().to_uppercase();
    let alerts = state.db.collection::<Alert>("alerts");

    let existing = alerts
        .find_one(
            doc! { "user_id": user_id, "symbol": &sym, "is_triggered": false },
            None,
        )
        .await
        .map_err(|e| e.to_string())?;

    if existing.is_some() {
        return Err("An active alert for this symbol already exists.".to_string());
    }

    let alert = Alert {
        id: ObjectId::new(),
        user_id,
        symbol: sym,
        target_price,
        direction,
        is_triggered: false,
        created_at: Utc::now().timestamp(),
    };

    alerts
        .insert_one(&alert, None)
        .await
        .map_err(|e| {
            let msg = e.to_string();
            if msg.contains("E11000") {
                "An active alert for this symbol already exists.".to_string()
            } else {
                msg
            }
        })?;

    Ok(alert)
}

/// Delete the alert and cascade its history in one transaction.
/// Returns false when no alert matched (wrong id or wrong owner).
pub async fn delete_alert(
    state: &AppState,
    user_id: ObjectId,
    alert_id: ObjectId,
) -> Result<bool, String> {
    let mut session = state
        .mongo
        .start_session(None)
        .await
        .map_err(|e| e.to_string())?;

    session
        .start_transaction(None)
        .await
        .map_err(|e| e.to_string())?;

    let alerts = state.db.collection::<Alert>("alerts");

    let res = alerts
        .delete_one_with_session(doc! { "_id": alert_id, "user_id": user_id }, None, &mut session)
        .await
        .map_err(|e| e.to_string())?;

    if res.deleted_count == 0 {
        let _ = session.abort_transaction().await;
        return Ok(false);
    }

    let histories = state.db.collection::<AlertHistory>("alert_history");

    if let Err(e) = histories
        .delete_many_with_session(doc! { "alert_id": alert_id }, None, &mut session)
        .await
    {
        let _ = session.abort_transaction().await;
        return Err(e.to_string());
    }

    session
        .commit_transaction()
        .await
        .map_err(|e| e.to_string())?;

    Ok(true)
}

pub async fn list_alert_history(
    state: &AppState,
    user_id: ObjectId,
    alert_id: ObjectId,
) -> Result<Option<Vec<AlertHistory>>, String> {
    let alerts = state.db.collection::<Alert>("alerts");

    // Ownership check before exposing history.
    let owned = alerts
        .find_one(doc! { "_id": alert_id, "user_id": user_id }, None)
        .await
        .map_err(|e| e.to_string())?;

    if owned.is_none() {
        return Ok(None);
    }

    let histories = state.db.collection::<AlertHistory>("alert_history");

    let find_opts = FindOptions::builder()
        .sort(doc! { "triggered_at": -1 })
        .build();

    let mut cursor = histories
        .find(doc! { "alert_id": alert_id }, find_opts)
        .await
        .map_err(|e| e.to_string())?;

    let mut items: Vec<AlertHistory> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res.map_err(|e| e.to_string())?);
    }

    Ok(Some(items))
}
