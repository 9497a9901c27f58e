//! # Cash Book Commands
//!
//! Income is posted by the sale sequences; the operator only records
//! expenses here. Entries are never edited.

use tracing::{debug, info};
use warung_core::ledger::{month_bounds, monthly_summary, CashSummary, ExpenseRequest};
use warung_core::CashEntry;

use crate::error::ApiError;
use crate::state::DbState;

/// Newest first.
pub async fn list_cash_entries(db: &DbState) -> Result<Vec<CashEntry>, ApiError> {
    Ok(db.inner().cash_entries().list().await?)
}

pub async fn record_expense(
    db: &DbState,
    description: &str,
    amount: i64,
) -> Result<CashEntry, ApiError> {
    let entry = ExpenseRequest::new(description, amount)?.to_entry();
    db.inner().cash_entries().insert(&entry).await?;

    info!(entry_id = %entry.id, amount, "Expense recorded");
    Ok(entry)
}

/// Income, expense, net and completed orders for one month.
pub async fn cash_summary(db: &DbState, year: i32, month: u32) -> Result<CashSummary, ApiError> {
    debug!(year, month, "cash_summary command");
    let (start, end) = month_bounds(year, month)?;

    let entries = db.inner().cash_entries().list_between(start, end).await?;
    let orders = db.inner().orders().list_between(start, end).await?;

    Ok(monthly_summary(year, month, &entries, &orders)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::checkout::checkout_cash;
    use crate::error::ErrorCode;
    use crate::test_support::{pos_cart_with, seed_product, stocked};
    use chrono::{Datelike, Utc};

    #[tokio::test]
    async fn test_expense_validation() {
        let db = DbState::in_memory().await.unwrap();

        let err = record_expense(&db, "Listrik", 0).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let err = record_expense(&db, " ", 10000).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(list_cash_entries(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_month_summary() {
        let db = DbState::in_memory().await.unwrap();
        let p = seed_product(&db, "Beras", 10000, 10).await;
        let stock = stocked(&db).await;
        let cart = pos_cart_with(&stock, &p, 3);
        checkout_cash(&db, &cart, &stock, None, 30000).await.unwrap();
        record_expense(&db, "Listrik", 12500).await.unwrap();

        let now = Utc::now();
        let summary = cash_summary(&db, now.year(), now.month()).await.unwrap();

        assert_eq!(summary.income, 30000);
        assert_eq!(summary.expense, 12500);
        assert_eq!(summary.net, 17500);
        assert_eq!(summary.completed_orders, 1);

        let empty = cash_summary(&db, now.year() - 1, now.month()).await.unwrap();
        assert_eq!(empty.income, 0);
        assert_eq!(empty.completed_orders, 0);
    }

    #[tokio::test]
    async fn test_bad_month() {
        let db = DbState::in_memory().await.unwrap();
        let err = cash_summary(&db, 2024, 13).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
