//! # Credit Tab Ledger
//!
//! Pay-later balances. A tab opens at checkout with the purchase summary,
//! grows through charges, and is settled once in full.
//!
//! ```text
//!   open (checkout) ──► charge ──► charge ──► settle ──► Income posted
//!        Open            Open       Open       Settled
//! ```
//!
//! The charge history is kept as structured [`CreditCharge`] records; the
//! human-readable description is generated from them.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::checkout::WriteStep;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CashEntry, CashEntryKind, CreditCharge, CreditTab, TabStatus};
use crate::validation::{validate_note, validate_positive_amount};

/// Shown in the description when a charge was added without a note.
pub const NO_NOTE: &str = "no note";

impl CreditTab {
    /// What is still owed: the tab amount while open, zero once settled.
    /// `amount` itself is kept after settlement as the settled total.
    pub fn outstanding(&self) -> Money {
        match self.status {
            TabStatus::Open => Money::from_amount(self.amount),
            TabStatus::Settled => Money::zero(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == TabStatus::Open
    }

    /// Opening summary followed by one line per charge:
    ///
    /// ```text
    /// POS purchase: Indomie x2
    /// + Rp 5.000 (extra)
    /// + Rp 2.000 (no note)
    /// ```
    pub fn description(&self) -> String {
        let mut text = self.summary.clone();
        for charge in &self.charges {
            text.push('\n');
            text.push_str(&charge_line(charge));
        }
        text
    }

    /// Records a persisted charge on the in-memory tab.
    pub fn push_charge(&mut self, charge: CreditCharge) {
        self.amount += charge.amount;
        self.charges.push(charge);
    }
}

fn charge_line(charge: &CreditCharge) -> String {
    let note = charge.note.as_deref().unwrap_or(NO_NOTE);
    format!("+ {} ({})", Money::from_amount(charge.amount), note)
}

// =============================================================================
// Charge
// =============================================================================

/// A validated charge: positive amount, optional note.
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeRequest {
    amount: i64,
    note: Option<String>,
}

impl ChargeRequest {
    pub fn new(amount: i64, note: Option<&str>) -> CoreResult<Self> {
        validate_positive_amount("amount", amount)?;
        Ok(ChargeRequest {
            amount,
            note: validate_note("note", note)?,
        })
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }
}

/// Builds the charge record to append to `tab`.
///
/// ## Errors
/// `InvalidTabStatus` if the tab is already settled.
pub fn apply_charge(tab: &CreditTab, request: &ChargeRequest) -> CoreResult<CreditCharge> {
    ensure_open(tab)?;

    Ok(CreditCharge {
        id: Uuid::new_v4().to_string(),
        tab_id: tab.id.clone(),
        amount: request.amount,
        note: request.note.clone(),
        charged_at: Utc::now(),
    })
}

// =============================================================================
// Settlement
// =============================================================================

/// The writes that settle a tab, in order:
/// 1. tab → Settled at `settled_at`
/// 2. Income entry for the outstanding amount
/// 3. linked order relabelled, when there is one
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementPlan {
    pub tab_id: String,
    pub settled_at: DateTime<Utc>,
    pub entry: CashEntry,
    pub relabel_order: Option<String>,
}

impl SettlementPlan {
    pub fn steps(&self) -> Vec<WriteStep> {
        let mut steps = vec![WriteStep::SettleTab, WriteStep::PostCashEntry];
        if self.relabel_order.is_some() {
            steps.push(WriteStep::RelabelOrder);
        }
        steps
    }
}

pub fn plan_settlement(tab: &CreditTab) -> CoreResult<SettlementPlan> {
    ensure_open(tab)?;
    let now = Utc::now();

    Ok(SettlementPlan {
        tab_id: tab.id.clone(),
        settled_at: now,
        entry: CashEntry {
            id: Uuid::new_v4().to_string(),
            kind: CashEntryKind::Income,
            description: format!("Credit settled - {}", tab.customer_name),
            amount: tab.amount,
            created_at: now,
        },
        relabel_order: tab.order_id.clone(),
    })
}

fn ensure_open(tab: &CreditTab) -> CoreResult<()> {
    if !tab.is_open() {
        return Err(CoreError::InvalidTabStatus {
            tab_id: tab.id.clone(),
            current_status: tab.status.as_str().to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
