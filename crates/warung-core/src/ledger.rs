//! # Cash Book
//!
//! Manual expenses and the monthly income/expense summary.
//!
//! Income entries are only ever created by checkout, order completion and
//! tab settlement. Expenses are entered by hand.

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreResult, ValidationError};
use crate::types::{CashEntry, CashEntryKind, Order, OrderStatus};
use crate::validation::{validate_month, validate_positive_amount, validate_required};

/// A validated manual expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseRequest {
    description: String,
    amount: i64,
}

impl ExpenseRequest {
    pub fn new(description: &str, amount: i64) -> CoreResult<Self> {
        validate_positive_amount("amount", amount)?;
        Ok(ExpenseRequest {
            description: validate_required("description", description)?,
            amount,
        })
    }

    pub fn to_entry(&self) -> CashEntry {
        CashEntry {
            id: Uuid::new_v4().to_string(),
            kind: CashEntryKind::Expense,
            description: self.description.clone(),
            amount: self.amount,
            created_at: Utc::now(),
        }
    }
}

/// Money in, money out and completed orders for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CashSummary {
    pub year: i32,
    pub month: u32,
    pub income: i64,
    pub expense: i64,
    /// `income - expense`, may be negative.
    pub net: i64,
    pub completed_orders: usize,
}

/// `[first instant of month, first instant of next month)` in UTC.
pub fn month_bounds(year: i32, month: u32) -> CoreResult<(DateTime<Utc>, DateTime<Utc>)> {
    validate_month(month)?;

    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let start = first_instant(year, month)?;
    let end = first_instant(next_year, next_month)?;
    Ok((start, end))
}

fn first_instant(year: i32, month: u32) -> CoreResult<DateTime<Utc>> {
    let midnight = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or(ValidationError::OutOfRange {
            field: "year".to_string(),
            min: i64::from(NaiveDate::MIN.year()),
            max: i64::from(NaiveDate::MAX.year()),
        })?;
    Ok(Utc.from_utc_datetime(&midnight))
}

/// Summarises the entries and orders that fall in `year`/`month`.
///
/// Inputs may span more than the month; anything outside is ignored.
pub fn monthly_summary(
    year: i32,
    month: u32,
    entries: &[CashEntry],
    orders: &[Order],
) -> CoreResult<CashSummary> {
    let (start, end) = month_bounds(year, month)?;
    let in_month = |at: &DateTime<Utc>| *at >= start && *at < end;

    let (income, expense) = entries
        .iter()
        .filter(|e| in_month(&e.created_at))
        .fold((0i64, 0i64), |(inc, exp), e| match e.kind {
            CashEntryKind::Income => (inc + e.amount, exp),
            CashEntryKind::Expense => (inc, exp + e.amount),
        });

    let completed_orders = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed && in_month(&o.created_at))
        .count();

    Ok(CashSummary {
        year,
        month,
        income,
        expense,
        net: income - expense,
        completed_orders,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FulfillmentKind, PaymentMethod};

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 10, 0, 0).unwrap()
    }

    fn entry(kind: CashEntryKind, amount: i64, created_at: DateTime<Utc>) -> CashEntry {
        CashEntry {
            id: Uuid::new_v4().to_string(),
            kind,
            description: "x".to_string(),
            amount,
            created_at,
        }
    }

    fn order(status: OrderStatus, created_at: DateTime<Utc>) -> Order {
        Order {
            id: Uuid::new_v4().to_string(),
            buyer_name: "x".to_string(),
            note: None,
            total_amount: 1000,
            status,
            payment_method: PaymentMethod::Cash,
            fulfillment: FulfillmentKind::Pickup,
            delivery_address: None,
            created_at,
        }
    }

    #[test]
    fn test_expense_request() {
        let entry = ExpenseRequest::new(" Electricity ", 150000).unwrap().to_entry();
        assert_eq!(entry.kind, CashEntryKind::Expense);
        assert_eq!(entry.description, "Electricity");
        assert!(ExpenseRequest::new("Electricity", 0).is_err());
        assert!(ExpenseRequest::new("", 1000).is_err());
    }

    #[test]
    fn test_month_bounds_december() {
        let (start, end) = month_bounds(2026, 12).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2026, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap());
        assert!(month_bounds(2026, 13).is_err());
    }

    #[test]
    fn test_monthly_summary() {
        let entries = vec![
            entry(CashEntryKind::Income, 20000, at(2026, 3, 2)),
            entry(CashEntryKind::Income, 5000, at(2026, 3, 31)),
            entry(CashEntryKind::Expense, 30000, at(2026, 3, 15)),
            entry(CashEntryKind::Income, 99999, at(2026, 4, 1)),
        ];
        let orders = vec![
            order(OrderStatus::Completed, at(2026, 3, 2)),
            order(OrderStatus::Pending, at(2026, 3, 3)),
            order(OrderStatus::Completed, at(2026, 2, 28)),
        ];

        let summary = monthly_summary(2026, 3, &entries, &orders).unwrap();
        assert_eq!(summary.income, 25000);
        assert_eq!(summary.expense, 30000);
        assert_eq!(summary.net, -5000);
        assert_eq!(summary.completed_orders, 1);
    }
}
