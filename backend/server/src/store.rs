//! # Document Store
//!
//! What the numbering step needs from a backend: one optimistic transaction
//! over the shared counter that also creates one complaint document.
//!
//! ## Contract
//! - The body is a pure function of the [`Snapshot`], so the store may run it more than once
//! - If the counter changed between read and commit, the store re-reads and re-runs the body
//! - Retries are bounded by the store, callers see success or a terminal error only
//! - A failed transaction writes nothing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use forms::Complaint;

use crate::error::{SubmitError, TransactionError};

pub const DEFAULT_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter {
    pub complaints_count: u64,
}

/// What a transaction attempt read.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// `None` when the counter document does not exist.
    pub counter: Option<Counter>,
    pub server_time: DateTime<Utc>,
}

/// The two writes of one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub complaint: Complaint,
    pub complaints_count: u64,
}

pub type TransactionBody<'a> =
    &'a (dyn Fn(&Snapshot) -> Result<Mutation, SubmitError> + Send + Sync);

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Runs `body` atomically and applies the returned mutation.
    /// An error returned by `body` aborts without writing and is passed through.
    async fn transact(&self, body: TransactionBody<'_>) -> Result<Mutation, SubmitError>;

    async fn ping(&self) -> Result<(), TransactionError>;
}
