//! # Credit Tab Commands
//!
//! Pay-later balances: add to them, settle them, remove them.
//!
//! A tab's description is generated from its opening summary and the
//! ordered charge log, so the full history stays readable after any
//! number of charges.

use serde::Serialize;
use tracing::{debug, info};
use warung_core::credit::{apply_charge, plan_settlement, ChargeRequest};
use warung_core::validation::validate_uuid;
use warung_core::{CoreError, CreditTab, Money, PaymentMethod, WriteStep};

use super::sequence::Sequence;
use crate::error::ApiError;
use crate::prompt::{Confirm, Outcome};
use crate::state::DbState;

/// A tab with its generated description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabView {
    #[serde(flatten)]
    pub tab: CreditTab,
    pub description: String,
}

impl From<CreditTab> for TabView {
    fn from(tab: CreditTab) -> Self {
        TabView {
            description: tab.description(),
            tab,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    pub tab_id: String,
    pub cash_entry_id: String,
    pub amount: i64,
    /// Order relabelled as settled, if the tab came from a till sale
    pub relabelled_order: Option<String>,
}

pub async fn list_tabs(db: &DbState) -> Result<Vec<TabView>, ApiError> {
    let tabs = db.inner().credit_tabs().list().await?;
    Ok(tabs.into_iter().map(TabView::from).collect())
}

/// Sum still owed across open tabs.
pub async fn outstanding_total(db: &DbState) -> Result<Money, ApiError> {
    let tabs = db.inner().credit_tabs().list().await?;
    Ok(tabs.iter().map(|t| t.outstanding()).sum())
}

async fn load_tab(db: &DbState, tab_id: &str) -> Result<CreditTab, ApiError> {
    db.inner()
        .credit_tabs()
        .get_by_id(tab_id)
        .await?
        .ok_or_else(|| CoreError::TabNotFound(tab_id.to_string()).into())
}

/// Adds `amount` to an open tab, logging the charge with its note.
pub async fn charge_tab(
    db: &DbState,
    tab_id: &str,
    amount: i64,
    note: Option<&str>,
) -> Result<TabView, ApiError> {
    debug!(tab_id, amount, "charge_tab command");
    validate_uuid(tab_id)?;
    let request = ChargeRequest::new(amount, note)?;

    let tab = load_tab(db, tab_id).await?;
    let charge = apply_charge(&tab, &request)?;
    let updated = db.inner().credit_tabs().add_charge(&charge).await?;

    info!(tab_id, amount, new_amount = updated.amount, "Credit tab charged");
    Ok(TabView::from(updated))
}

/// Settles an open tab in full.
///
/// ## Write Sequence
/// 1. tab → Settled (amount kept as history), only while it still owes
///    the confirmed amount
/// 2. Income entry for that amount
/// 3. linked order's payment relabelled "credit settled"
pub async fn settle_tab(
    db: &DbState,
    confirm: &dyn Confirm,
    tab_id: &str,
) -> Result<Outcome<SettlementReport>, ApiError> {
    debug!(tab_id, "settle_tab command");
    validate_uuid(tab_id)?;

    let tab = load_tab(db, tab_id).await?;
    let plan = plan_settlement(&tab)?;

    let prompt = format!(
        "Settle {} owed by {}?",
        tab.outstanding(),
        tab.customer_name
    );
    if !confirm.confirm(&prompt) {
        return Ok(Outcome::Declined);
    }

    let tabs = db.inner().credit_tabs();
    let mut seq = Sequence::new("settle_tab", plan.relabel_order.as_deref());
    seq.run(
        WriteStep::SettleTab,
        tabs.settle(&plan.tab_id, plan.entry.amount, plan.settled_at),
    )
    .await?;
    seq.run(
        WriteStep::PostCashEntry,
        db.inner().cash_entries().insert(&plan.entry),
    )
    .await?;
    if let Some(order_id) = &plan.relabel_order {
        seq.run(
            WriteStep::RelabelOrder,
            db.inner()
                .orders()
                .update_payment_method(order_id, PaymentMethod::CreditSettled),
        )
        .await?;
    }

    info!(tab_id, amount = plan.entry.amount, customer = %tab.customer_name, "Credit tab settled");
    Ok(Outcome::Done(SettlementReport {
        tab_id: plan.tab_id.clone(),
        cash_entry_id: plan.entry.id.clone(),
        amount: plan.entry.amount,
        relabelled_order: plan.relabel_order.clone(),
    }))
}

/// Deletes a tab and its charge log, open or settled. No cash effect.
pub async fn delete_tab(
    db: &DbState,
    confirm: &dyn Confirm,
    tab_id: &str,
) -> Result<Outcome<()>, ApiError> {
    debug!(tab_id, "delete_tab command");
    validate_uuid(tab_id)?;

    let tab = load_tab(db, tab_id).await?;
    if !confirm.confirm(&format!("Delete the credit tab of {}?", tab.customer_name)) {
        return Ok(Outcome::Declined);
    }

    db.inner().credit_tabs().delete(tab_id).await?;
    info!(tab_id, "Credit tab deleted");
    Ok(Outcome::Done(()))
}
