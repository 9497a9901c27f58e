//! # New-Order Watcher
//!
//! Listens to the store's change feed and, for every new order, re-fetches
//! the recent-orders list and raises an alert. The feed only triggers a
//! refresh; what the operator sees always comes from the store.
//!
//! ```text
//! Database::subscribe() ──► OrderInserted(order)
//!                                 │
//!                                 ▼
//!                      recent_orders(db)  (re-fetch)
//!                                 │
//!                                 ▼
//!                   AlertSink::new_order(NewOrderAlert)
//! ```

use std::future::Future;

use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};
use warung_core::Order;
use warung_db::StoreEvent;

use crate::commands::orders::recent_orders;
use crate::state::DbState;

/// A new order plus the freshly loaded recent-orders list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderAlert {
    pub order: Order,
    pub recent: Vec<Order>,
}

/// Where alerts go (a sound, a toast, a log line).
pub trait AlertSink: Send + Sync {
    fn new_order(&self, alert: &NewOrderAlert);

    /// Called after events were missed; `recent` is the re-fetched list.
    fn refreshed(&self, _recent: &[Order]) {}
}

impl<F> AlertSink for F
where
    F: Fn(&NewOrderAlert) + Send + Sync,
{
    fn new_order(&self, alert: &NewOrderAlert) {
        self(alert)
    }
}

/// Writes each alert to the log.
pub struct LogAlert;

impl AlertSink for LogAlert {
    fn new_order(&self, alert: &NewOrderAlert) {
        info!(
            order = %alert.order.short_id(),
            buyer = %alert.order.buyer_name,
            total = alert.order.total_amount,
            status = ?alert.order.status,
            "New order received"
        );
    }

    fn refreshed(&self, recent: &[Order]) {
        info!(count = recent.len(), "Recent orders refreshed");
    }
}

/// Runs until `shutdown` resolves or the feed closes. Returns the number of
/// alerts raised.
///
/// `feed` is taken from the caller so nothing committed between subscribing
/// and starting the loop is missed.
pub async fn run_watcher<S>(
    db: &DbState,
    mut feed: broadcast::Receiver<StoreEvent>,
    sink: &dyn AlertSink,
    shutdown: S,
) -> usize
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut alerts = 0;
    info!("Order watcher started");

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                info!(alerts, "Order watcher stopping");
                break;
            }
            event = feed.recv() => match event {
                Ok(StoreEvent::OrderInserted(order)) => {
                    debug!(order_id = %order.id, "Order insert received");
                    let recent = match recent_orders(db).await {
                        Ok(recent) => recent,
                        Err(e) => {
                            warn!(error = %e, "Cannot re-fetch recent orders");
                            vec![order.clone()]
                        }
                    };
                    sink.new_order(&NewOrderAlert { order, recent });
                    alerts += 1;
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(missed, "Order feed lagged, re-fetching");
                    match recent_orders(db).await {
                        Ok(recent) => sink.refreshed(&recent),
                        Err(e) => warn!(error = %e, "Cannot re-fetch recent orders"),
                    }
                }
                Err(RecvError::Closed) => {
                    info!("Order feed closed");
                    break;
                }
            }
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::checkout::checkout_cash;
    use crate::test_support::{pos_cart_with, seed_product, stocked};
    use std::time::Duration;
    use tokio::sync::{mpsc, oneshot};

    #[tokio::test]
    async fn test_alert_on_new_order() {
        let db = DbState::in_memory().await.unwrap();
        let p = seed_product(&db, "Telur", 2000, 30).await;
        let stock = stocked(&db).await;

        let (alert_tx, mut alert_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let feed = db.subscribe();
        let watcher_db = db.clone();
        let watcher = tokio::spawn(async move {
            let sink = move |alert: &NewOrderAlert| {
                let _ = alert_tx.send(alert.clone());
            };
            run_watcher(&watcher_db, feed, &sink, async {
                let _ = stop_rx.await;
            })
            .await
        });

        let cart = pos_cart_with(&stock, &p, 2);
        let sale = checkout_cash(&db, &cart, &stock, Some("Rina"), 4000).await.unwrap();

        let alert = tokio::time::timeout(Duration::from_secs(5), alert_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(alert.order.id, sale.order_id);
        assert_eq!(alert.recent[0].id, sale.order_id);

        stop_tx.send(()).unwrap();
        assert_eq!(watcher.await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stops_on_shutdown_without_events() {
        let db = DbState::in_memory().await.unwrap();
        let alerts = run_watcher(&db, db.subscribe(), &LogAlert, async {}).await;
        assert_eq!(alerts, 0);
    }
}
