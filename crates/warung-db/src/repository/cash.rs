//! # Cash Entry Repository
//!
//! The cash book is append-only: entries are inserted and read, never
//! updated or deleted.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use warung_core::CashEntry;

const SELECT_ENTRY: &str = "SELECT id, kind, description, amount, created_at FROM cash_entries";

#[derive(Debug, Clone)]
pub struct CashEntryRepository {
    pool: SqlitePool,
}

impl CashEntryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CashEntryRepository { pool }
    }

    pub async fn insert(&self, entry: &CashEntry) -> DbResult<()> {
        debug!(
            id = %entry.id,
            kind = ?entry.kind,
            amount = entry.amount,
            description = %entry.description,
            "Posting cash entry"
        );

        sqlx::query(
            "INSERT INTO cash_entries (id, kind, description, amount, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(entry.kind)
        .bind(&entry.description)
        .bind(entry.amount)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// All entries, newest first.
    pub async fn list(&self) -> DbResult<Vec<CashEntry>> {
        let entries = sqlx::query_as::<_, CashEntry>(&format!(
            "{} ORDER BY created_at DESC, rowid DESC",
            SELECT_ENTRY
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Entries created in `[start, end)`, oldest first.
    pub async fn list_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<CashEntry>> {
        let entries = sqlx::query_as::<_, CashEntry>(&format!(
            "{} WHERE created_at >= ? AND created_at < ? ORDER BY created_at",
            SELECT_ENTRY
        ))
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = entries.len(), "Fetched cash entries for range");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;
    use warung_core::CashEntryKind;

    fn entry(kind: CashEntryKind, amount: i64, created_at: DateTime<Utc>) -> CashEntry {
        CashEntry {
            id: Uuid::new_v4().to_string(),
            kind,
            description: "test".to_string(),
            amount,
            created_at,
        }
    }

    #[tokio::test]
    async fn test_insert_and_range() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.cash_entries();
        let march = Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap();

        repo.insert(&entry(CashEntryKind::Income, 20000, march)).await.unwrap();
        repo.insert(&entry(CashEntryKind::Expense, 5000, march + Duration::days(1)))
            .await
            .unwrap();
        repo.insert(&entry(CashEntryKind::Income, 7000, march + Duration::days(40)))
            .await
            .unwrap();

        let start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();
        let in_march = repo.list_between(start, end).await.unwrap();
        assert_eq!(in_march.len(), 2);
        assert_eq!(in_march[0].amount, 20000);

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].amount, 7000);
    }
}
