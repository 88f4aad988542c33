use mongodb::{
    bson::doc,
    options::IndexOptions,
    Database, IndexModel,
};

pub async fn ensure_indexes(db: &Database) -> Result<(), String> {
    // users: unique email
    {
        let col = db.collection::<mongodb::bson::Document>("users");
        let model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // alerts: at most one ACTIVE alert per (user_id, symbol); partial unique
    // index so triggered alerts don't block re-creating one
    {
        let col = db.collection::<mongodb::bson::Document>("alerts");
        let model = IndexModel::builder()
            .keys(doc! { "user_id": 1, "symbol": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .partial_filter_expression(doc! { "is_triggered": false })
                    .build(),
            )
            .build();

        col.create_index(model, None)
            .await
            .map_err(|e| e.to_string())?;
    }

    // alerts: snapshot read of the monitor scans on is_triggered
    {
        let col = db.collection::<mongodb::bson::Document>("alerts");
        let model = IndexModel::builder()
            .keys(doc! { "is_triggered": 1 })
            .build();

        let _ = col.create_index(model, None).await;
    }

    // alert_history: lookups and cascade deletes by alert
    {
        let col = db.collection::<mongodb::bson::Document>("alert_history");
        let model = IndexModel::builder()
            .keys(doc! { "alert_id": 1, "triggered_at": -1 })
            .build();

        let _ = col.create_index(model, None).await;
    }

    Ok(())
}
