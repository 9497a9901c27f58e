//! Step runner for multi-write sequences.
//!
//! Runs store writes strictly one after another, remembers which steps
//! committed and turns the first failure into an [`ApiError`] tagged with
//! the failing step. Nothing is rolled back: there is no transaction
//! spanning the steps, and committed writes stay committed.

use std::future::Future;

use tracing::{error, warn};
use warung_core::WriteStep;

use crate::error::ApiError;

pub(crate) struct Sequence<'a> {
    name: &'static str,
    order_id: Option<&'a str>,
    completed: Vec<WriteStep>,
}

impl<'a> Sequence<'a> {
    pub(crate) fn new(name: &'static str, order_id: Option<&'a str>) -> Self {
        Sequence {
            name,
            order_id,
            completed: Vec::new(),
        }
    }

    /// Awaits one write of `step`. A step may run several writes (one
    /// stock decrement per line); it counts as completed after the first.
    pub(crate) async fn run<T, E, F>(&mut self, step: WriteStep, write: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<ApiError>,
    {
        match write.await {
            Ok(value) => {
                if !self.completed.contains(&step) {
                    self.completed.push(step);
                }
                Ok(value)
            }
            Err(cause) => {
                let err = ApiError::failed_at(step, &self.completed, self.order_id, cause);
                if err.is_partial() {
                    error!(
                        sequence = self.name,
                        %step,
                        order_id = ?self.order_id,
                        completed = ?self.completed,
                        message = %err.message,
                        "Sequence stopped midway, earlier writes kept"
                    );
                } else {
                    warn!(sequence = self.name, %step, message = %err.message, "Sequence failed before writing");
                }
                Err(err)
            }
        }
    }

    pub(crate) fn completed(&self) -> &[WriteStep] {
        &self.completed
    }
}
