use futures_util::StreamExt;
use mongodb::{bson::doc, options::FindOptions};

use crate::{
    models::{Alert, AlertEvent, Direction},
    services::{finnhub::QuoteOutcome, notify, transition},
    AppState,
};

/// Result of one full evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Completed { processed: usize, triggered: usize },
    /// The oracle signalled a global rate limit; the remaining alerts were
    /// not evaluated. Commits made earlier in the pass stand.
    RateLimited { processed: usize, triggered: usize },
}

/// What to do with one alert given its classified quote.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Decision {
    Trigger(f64),
    Skip,
    AbortPass,
}

fn decide(alert: &Alert, outcome: &QuoteOutcome) -> Decision {
    match outcome {
        QuoteOutcome::RateLimited => Decision::AbortPass,
        QuoteOutcome::NoData | QuoteOutcome::TransportError(_) => Decision::Skip,
        QuoteOutcome::Price(price) => {
            // Strict inequality on both sides; equality never triggers.
            let hit = match alert.direction {
                Direction::Above => *price > alert.target_price,
                Direction::Below => *price < alert.target_price,
            };

            if hit {
                Decision::Trigger(*price)
            } else {
                Decision::Skip
            }
        }
    }
}

async fn load_untriggered(state: &AppState) -> Result<Vec<Alert>, String> {
    let alerts = state.db.collection::<Alert>("alerts");

    // Oldest first, so a rate-limited pass always makes progress on the
    // same prefix of the backlog.
    let opts = FindOptions::builder().sort(doc! { "created_at": 1 }).build();

    let mut cursor = alerts
        .find(doc! { "is_triggered": false }, opts)
        .await
        .map_err(|e| e.to_string())?;

    let mut items: Vec<Alert> = Vec::new();
    while let Some(res) = cursor.next().await {
        items.push(res.map_err(|e| e.to_string())?);
    }

    Ok(items)
}

/// Run one evaluation pass over every untriggered alert.
///
/// Alerts are processed sequentially, one oracle call at a time: the oracle
/// enforces a global rate limit, and parallel calls would let one symbol's
/// burst abort evaluation for unrelated alerts. A `RateLimited` quote stops
/// the pass immediately; `NoData`/`TransportError` skip only that alert.
/// Notification dispatch for an alert always happens after its commit is
/// durable, and the pass never waits on delivery.
pub async fn run_pass(state: &AppState) -> Result<PassOutcome, String> {
    let alerts = load_untriggered(state).await?;

    if alerts.is_empty() {
        tracing::debug!("no active alerts");
        return Ok(PassOutcome::Completed {
            processed: 0,
            triggered: 0,
        });
    }

    tracing::info!(count = alerts.len(), "evaluating active alerts");

    let mut processed = 0usize;
    let mut triggered = 0usize;

    for alert in &alerts {
        let symbol = alert.symbol.to_uppercase();
        let outcome = state.finnhub.quote(&symbol).await;

        match decide(alert, &outcome) {
            Decision::AbortPass => {
                tracing::warn!(%symbol, processed, "finnhub rate limit hit, aborting pass");
                return Ok(PassOutcome::RateLimited {
                    processed,
                    triggered,
                });
            }
            Decision::Skip => {
                if let QuoteOutcome::TransportError(ref e) = outcome {
                    tracing::warn!(%symbol, error = %e, "quote failed, skipping alert");
                } else if outcome == QuoteOutcome::NoData {
                    tracing::warn!(%symbol, "no usable price, skipping alert");
                }
                processed += 1;
            }
            Decision::Trigger(price) => {
                processed += 1;

                match transition::commit(state, alert, price).await {
                    Ok(_) => {
                        triggered += 1;

                        let event = AlertEvent::triggered(alert, price);
                        notify::dispatch(state, &event, alert.user_id);

                        tracing::info!(
                            %symbol,
                            price,
                            target = alert.target_price,
                            direction = alert.direction.as_str(),
                            "alert triggered"
                        );
                    }
                    Err(e) => {
                        // Left untriggered; the next pass retries it.
                        tracing::error!(%symbol, error = %e, "trigger commit failed");
                    }
                }
            }
        }
    }

    Ok(PassOutcome::Completed {
        processed,
        triggered,
    })
}
