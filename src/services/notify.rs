use mongodb::bson::{doc, oid::ObjectId};

use crate::{
    models::{event::channel_key, AlertEvent, User},
    AppState,
};

/// Fan a trigger event out to both delivery channels.
///
/// Fire-and-forget from the engine's point of view: nothing here returns an
/// error to the caller, and neither channel can roll back the commit that
/// produced the event. The real-time publish is a synchronous in-memory
/// broadcast; the email leg (owner lookup included) runs on a detached task
/// so mail-transport latency never delays the pass.
pub fn dispatch(state: &AppState, event: &AlertEvent, owner: ObjectId) {
    let payload = match serde_json::to_string(event) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "failed to encode alert event");
            return;
        }
    };

    let delivered = state.sessions.broadcast(owner, &payload);
    tracing::info!(
        channel = %channel_key(&owner),
        delivered,
        symbol = %event.symbol,
        "published alert event"
    );

    let state = state.clone();
    let event = event.clone();

    tokio::spawn(async move {
        let users = state.db.collection::<User>("users");

        let user = match users.find_one(doc! { "_id": owner }, None).await {
            Ok(Some(u)) => u,
            Ok(None) => {
                tracing::warn!(owner = %owner.to_hex(), "alert owner not found, skipping email");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load alert owner for email");
                return;
            }
        };

        match state.mailer.send_alert(&user.email, &event).await {
            Ok(()) => tracing::info!(to = %user.email, symbol = %event.symbol, "alert email sent"),
            Err(e) => tracing::error!(to = %user.email, error = %e, "alert email failed"),
        }
    });
}
