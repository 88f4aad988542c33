use chrono::Utc;
use mongodb::bson::{doc, oid::ObjectId};

use crate::{
    models::{Alert, AlertHistory},
    AppState,
};

/// Atomically mark `alert` triggered and append its history row.
///
/// Both writes happen in one session transaction: either the alert flips to
/// triggered AND exactly one history row exists, or nothing changed. Once
/// this returns Ok the alert is excluded from every future snapshot read,
/// so re-running the same pass cannot fire it again. Two overlapping passes
/// racing on the same alert are resolved by the `is_triggered: false` filter
/// below: the loser matches nothing and the transaction is aborted.
pub async fn commit(
    state: &AppState,
    alert: &Alert,
    triggered_price: f64,
) -> Result<AlertHistory, String> {
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
        .update_one_with_session(
            doc! { "_id": alert.id, "is_triggered": false },
            doc! { "$set": { "is_triggered": true } },
            None,
            &mut session,
        )
        .await
        .map_err(|e| e.to_string())?;

    if res.matched_count == 0 {
        let _ = session.abort_transaction().await;
        return Err("alert already triggered".to_string());
    }

    let history = AlertHistory {
        id: ObjectId::new(),
        alert_id: alert.id,
        triggered_price,
        triggered_at: Utc::now().timestamp(),
    };

    let histories = state.db.collection::<AlertHistory>("alert_history");

    if let Err(e) = histories
        .insert_one_with_session(&history, None, &mut session)
        .await
    {
        let _ = session.abort_transaction().await;
        return Err(e.to_string());
    }

    session
        .commit_transaction()
        .await
        .map_err(|e| e.to_string())?;

    Ok(history)
}
