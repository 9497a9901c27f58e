//! # Credit Tab Repository
//!
//! Tabs live in `credit_tabs`; their charge log in `credit_charges`.
//! Reads always return a tab with its charges loaded, oldest first.
//!
//! ## Adding a Charge
//! ```text
//! BEGIN
//!   UPDATE credit_tabs SET amount = amount + ? WHERE id = ? AND status = 'open'
//!   INSERT INTO credit_charges ...
//! COMMIT
//! ```
//! Balance and log move together or not at all.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use warung_core::{CreditCharge, CreditTab, TabStatus};

const SELECT_TAB: &str = "SELECT id, customer_name, summary, amount, status, order_id, \
                          created_at, settled_at FROM credit_tabs";

const SELECT_CHARGE: &str = "SELECT id, tab_id, amount, note, charged_at FROM credit_charges";

#[derive(Debug, Clone)]
pub struct CreditTabRepository {
    pool: SqlitePool,
}

impl CreditTabRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CreditTabRepository { pool }
    }

    /// Opens a tab. Any charges on the value are ignored.
    pub async fn insert(&self, tab: &CreditTab) -> DbResult<()> {
        debug!(id = %tab.id, customer = %tab.customer_name, amount = tab.amount, "Opening credit tab");

        sqlx::query(
            r#"
            INSERT INTO credit_tabs (
                id, customer_name, summary, amount, status, order_id, created_at, settled_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tab.id)
        .bind(&tab.customer_name)
        .bind(&tab.summary)
        .bind(tab.amount)
        .bind(tab.status)
        .bind(&tab.order_id)
        .bind(tab.created_at)
        .bind(tab.settled_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CreditTab>> {
        let tab = sqlx::query_as::<_, CreditTab>(&format!("{} WHERE id = ?", SELECT_TAB))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(mut tab) = tab else {
            return Ok(None);
        };

        tab.charges = sqlx::query_as::<_, CreditCharge>(&format!(
            "{} WHERE tab_id = ? ORDER BY charged_at, rowid",
            SELECT_CHARGE
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(tab))
    }

    /// All tabs, newest first, each with its charges.
    pub async fn list(&self) -> DbResult<Vec<CreditTab>> {
        let mut tabs = sqlx::query_as::<_, CreditTab>(&format!(
            "{} ORDER BY created_at DESC, rowid DESC",
            SELECT_TAB
        ))
        .fetch_all(&self.pool)
        .await?;

        let charges = sqlx::query_as::<_, CreditCharge>(&format!(
            "{} ORDER BY charged_at, rowid",
            SELECT_CHARGE
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut by_tab: HashMap<String, Vec<CreditCharge>> = HashMap::new();
        for charge in charges {
            by_tab.entry(charge.tab_id.clone()).or_default().push(charge);
        }
        for tab in &mut tabs {
            tab.charges = by_tab.remove(&tab.id).unwrap_or_default();
        }

        debug!(count = tabs.len(), "Listed credit tabs");
        Ok(tabs)
    }

    /// Appends a charge and raises the balance in one transaction.
    ///
    /// ## Errors
    /// `NotFound` when the tab does not exist or is no longer open.
    pub async fn add_charge(&self, charge: &CreditCharge) -> DbResult<CreditTab> {
        debug!(tab_id = %charge.tab_id, amount = charge.amount, "Adding credit charge");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE credit_tabs SET amount = amount + ? WHERE id = ? AND status = ?",
        )
        .bind(charge.amount)
        .bind(&charge.tab_id)
        .bind(TabStatus::Open)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Open credit tab", &charge.tab_id));
        }

        sqlx::query(
            "INSERT INTO credit_charges (id, tab_id, amount, note, charged_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&charge.id)
        .bind(&charge.tab_id)
        .bind(charge.amount)
        .bind(&charge.note)
        .bind(charge.charged_at)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.get_by_id(&charge.tab_id)
            .await?
            .ok_or_else(|| DbError::not_found("Credit tab", &charge.tab_id))
    }

    /// Marks an open tab settled. The amount is left as history.
    ///
    /// Only matches while the tab is open and still owes `expected_amount`,
    /// the balance the settlement was planned and confirmed for. A charge
    /// landing in between makes this fail with [`DbError::Conflict`]
    /// instead of closing the tab on a stale total.
    pub async fn settle(
        &self,
        id: &str,
        expected_amount: i64,
        settled_at: DateTime<Utc>,
    ) -> DbResult<()> {
        debug!(id = %id, expected_amount, "Settling credit tab");

        let result = sqlx::query(
            "UPDATE credit_tabs SET status = ?, settled_at = ? \
             WHERE id = ? AND status = ? AND amount = ?",
        )
        .bind(TabStatus::Settled)
        .bind(settled_at)
        .bind(id)
        .bind(TabStatus::Open)
        .bind(expected_amount)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let current: Option<(TabStatus, i64)> =
                sqlx::query_as("SELECT status, amount FROM credit_tabs WHERE id = ?")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?;
            return Err(match current {
                None => DbError::not_found("Credit tab", id),
                Some((TabStatus::Open, amount)) => DbError::conflict(
                    "Credit tab",
                    id,
                    format!("balance is now {}, not {}", amount, expected_amount),
                ),
                Some((status, _)) => {
                    DbError::conflict("Credit tab", id, format!("already {}", status.as_str()))
                }
            });
        }
        Ok(())
    }

    /// Permanently removes a tab and its charges, whatever its status.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting credit tab");

        let result = sqlx::query("DELETE FROM credit_tabs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Credit tab", id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::test_support::tab;
    use uuid::Uuid;

    fn charge(tab_id: &str, amount: i64, note: Option<&str>) -> CreditCharge {
        CreditCharge {
            id: Uuid::new_v4().to_string(),
            tab_id: tab_id.to_string(),
            amount,
            note: note.map(String::from),
            charged_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_charge_updates_amount_and_log() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.credit_tabs();
        let t = tab("Bu Sri", 20000);
        repo.insert(&t).await.unwrap();

        let updated = repo.add_charge(&charge(&t.id, 5000, Some("extra"))).await.unwrap();
        assert_eq!(updated.amount, 25000);
        assert_eq!(updated.charges.len(), 1);
        assert!(updated.description().contains("+ Rp 5.000 (extra)"));

        let listed = repo.list().await.unwrap();
        assert_eq!(listed[0].charges.len(), 1);
    }

    #[tokio::test]
    async fn test_settle_keeps_amount_and_blocks_charges() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.credit_tabs();
        let t = tab("Pak Budi", 50000);
        repo.insert(&t).await.unwrap();

        repo.settle(&t.id, 50000, Utc::now()).await.unwrap();
        let settled = repo.get_by_id(&t.id).await.unwrap().unwrap();
        assert_eq!(settled.status, TabStatus::Settled);
        assert_eq!(settled.amount, 50000);
        assert!(settled.settled_at.is_some());

        assert!(repo.settle(&t.id, 50000, Utc::now()).await.unwrap_err().is_conflict());
        assert!(repo
            .add_charge(&charge(&t.id, 1000, None))
            .await
            .unwrap_err()
            .is_not_found());
        assert!(repo.get_by_id(&t.id).await.unwrap().unwrap().charges.is_empty());
    }

    #[tokio::test]
    async fn test_settle_refuses_stale_balance() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.credit_tabs();
        let t = tab("Bu Ani", 20000);
        repo.insert(&t).await.unwrap();
        repo.add_charge(&charge(&t.id, 5000, None)).await.unwrap();

        let err = repo.settle(&t.id, 20000, Utc::now()).await.unwrap_err();
        assert!(err.is_conflict());
        assert!(err.to_string().contains("25000"));
        assert_eq!(repo.get_by_id(&t.id).await.unwrap().unwrap().status, TabStatus::Open);

        repo.settle(&t.id, 25000, Utc::now()).await.unwrap();
        assert!(repo.settle("missing", 0, Utc::now()).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_removes_charges() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.credit_tabs();
        let t = tab("Rina", 1000);
        repo.insert(&t).await.unwrap();
        repo.add_charge(&charge(&t.id, 500, None)).await.unwrap();

        repo.delete(&t.id).await.unwrap();
        assert!(repo.get_by_id(&t.id).await.unwrap().is_none());

        let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM credit_charges")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(left, 0);
    }
}
