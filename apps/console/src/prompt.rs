//! # Operator Confirmation
//!
//! Destructive commands (complete, cancel or delete an order; settle or
//! delete a tab) ask a [`Confirm`] before writing anything.
//!
//! ```rust,ignore
//! let outcome = orders::cancel_order(&db, &AutoConfirm, &order_id).await?;
//! if let Outcome::Declined = outcome { /* nothing was written */ }
//! ```

use serde::Serialize;

/// Asks the operator to approve an action.
pub trait Confirm: Send + Sync {
    /// `prompt` is the question shown to the operator.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Approves everything. Scripts and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Refuses everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecline;

impl Confirm for AutoDecline {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of a confirmed command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Done(T),
    /// The operator said no; nothing was written.
    Declined,
}

impl<T> Outcome<T> {
    pub fn is_declined(&self) -> bool {
        matches!(self, Outcome::Declined)
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Declined => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_confirm_sees_prompt() {
        let only_cancel = |prompt: &str| prompt.starts_with("Cancel");
        assert!(only_cancel.confirm("Cancel order #ABCD1234?"));
        assert!(!only_cancel.confirm("Delete order #ABCD1234?"));
    }

    #[test]
    fn test_outcome_serialization() {
        let done = serde_json::to_value(Outcome::Done(3)).unwrap();
        assert_eq!(done["outcome"], "done");
        assert_eq!(done["value"], 3);

        let declined = serde_json::to_value(Outcome::<i32>::Declined).unwrap();
        assert_eq!(declined["outcome"], "declined");
    }
}
