//! The uniform result of every resolution.

use serde::Serialize;

use crate::Error;
use crate::backend::WriteResult;

/// Per-row results of one batch write.
///
/// Row-level rejections are not failures of the resolution; callers that need
/// every row applied inspect [`BatchOutcome::failed`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BatchOutcome {
    rows: Vec<WriteResult>,
}

impl BatchOutcome {
    /// Wraps the per-document rows of one batch write.
    pub fn new(rows: Vec<WriteResult>) -> Self {
        Self { rows }
    }

    /// All rows, in submission order.
    pub fn rows(&self) -> &[WriteResult] {
        &self.rows
    }

    /// Consumes the outcome, returning its rows.
    pub fn into_rows(self) -> Vec<WriteResult> {
        self.rows
    }

    /// Number of rows in the batch.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows the store accepted.
    pub fn written(&self) -> impl Iterator<Item = &WriteResult> {
        self.rows.iter().filter(|row| row.is_ok())
    }

    /// Rows the store rejected.
    pub fn failed(&self) -> impl Iterator<Item = &WriteResult> {
        self.rows.iter().filter(|row| !row.is_ok())
    }

    /// Returns true when every row was accepted.
    pub fn is_clean(&self) -> bool {
        self.rows.iter().all(WriteResult::is_ok)
    }
}

/// Outcome of a resolution: `{success, message, value}`.
///
/// "Nothing to do" (no conflicts, empty scope, unknown id) is a success without a
/// value. A committed batch is a success whose value holds the per-row results.
/// Any failure is reported with `success: false` and the error that caused it.
#[derive(Debug)]
pub struct Resolution {
    pub success: bool,
    pub message: String,
    /// The batch write outcome, when a batch was submitted.
    pub value: Option<BatchOutcome>,
    /// The error behind a failed resolution.
    pub error: Option<Error>,
}

impl Resolution {
    /// A success that wrote nothing.
    pub fn nothing_to_do(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            value: None,
            error: None,
        }
    }

    /// A success that submitted a batch.
    pub fn committed(message: impl Into<String>, outcome: BatchOutcome) -> Self {
        Self {
            success: true,
            message: message.into(),
            value: Some(outcome),
            error: None,
        }
    }

    /// A failure.
    pub fn failed(message: impl Into<String>, error: impl Into<Error>) -> Self {
        Self {
            success: false,
            message: message.into(),
            value: None,
            error: Some(error.into()),
        }
    }

    /// Attaches the batch outcome of a write that preceded the failure.
    pub(crate) fn with_value(mut self, outcome: BatchOutcome) -> Self {
        self.value = Some(outcome);
        self
    }

    /// Number of writes submitted; zero when no batch was sent.
    pub fn writes(&self) -> usize {
        self.value.as_ref().map_or(0, BatchOutcome::len)
    }
}
