//! In-process [`DocumentStore`].
//!
//! Versioned like an optimistic backend: every commit bumps the version and a
//! commit whose read version is stale is retried. Used for local development
//! and tests, which also get hooks to inject failures and interleavings.

use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::Utc;
use forms::Complaint;
use tokio::sync::{Barrier, Mutex};
use tracing::debug;

use crate::{
    database::occupied_error,
    error::{SubmitError, TransactionError},
    store::{Counter, DEFAULT_ATTEMPTS, DocumentStore, Mutation, Snapshot, TransactionBody},
};

#[derive(Default)]
struct Documents {
    counter: Option<Counter>,
    complaints: BTreeMap<u64, Complaint>,
    version: u64,
}

pub struct MemoryStore {
    documents: Mutex<Documents>,
    max_attempts: u32,
    commit_gate: Option<Arc<Barrier>>,
    fail_next_commit: AtomicBool,
    interference: AtomicU32,
    transactions: AtomicUsize,
}

impl MemoryStore {
    /// `None` leaves the counter document absent.
    pub fn new(complaints_count: Option<u64>) -> Self {
        Self {
            documents: Mutex::new(Documents {
                counter: complaints_count.map(|complaints_count| Counter { complaints_count }),
                ..Default::default()
            }),
            max_attempts: DEFAULT_ATTEMPTS,
            commit_gate: None,
            fail_next_commit: AtomicBool::new(false),
            interference: AtomicU32::new(0),
            transactions: AtomicUsize::new(0),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Holds the first attempt of every transaction at `gate` between its read
    /// and its commit.
    pub fn with_commit_gate(mut self, gate: Arc<Barrier>) -> Self {
        self.commit_gate = Some(gate);
        self
    }

    /// Makes the next commit fail after its body already ran.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Touches the counter document right before each of the next `commits`
    /// commits, as a concurrent writer would.
    pub fn interfere(&self, commits: u32) {
        self.interference.store(commits, Ordering::SeqCst);
    }

    /// Overwrites the counter document outside any transaction, as an
    /// operator would.
    pub async fn set_counter(&self, complaints_count: Option<u64>) {
        let mut documents = self.documents.lock().await;
        documents.counter = complaints_count.map(|complaints_count| Counter { complaints_count });
        documents.version += 1;
    }

    pub fn transactions_started(&self) -> usize {
        self.transactions.load(Ordering::SeqCst)
    }

    pub async fn counter(&self) -> Option<u64> {
        self.documents
            .lock()
            .await
            .counter
            .map(|counter| counter.complaints_count)
    }

    pub async fn complaint(&self, complaint_id: u64) -> Option<Complaint> {
        self.documents
            .lock()
            .await
            .complaints
            .get(&complaint_id)
            .cloned()
    }

    pub async fn complaint_ids(&self) -> Vec<u64> {
        self.documents
            .lock()
            .await
            .complaints
            .keys()
            .copied()
            .collect()
    }

    fn take_interference(&self) -> bool {
        self.interference
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn transact(&self, body: TransactionBody<'_>) -> Result<Mutation, SubmitError> {
        self.transactions.fetch_add(1, Ordering::SeqCst);

        for attempt in 1..=self.max_attempts {
            let (snapshot, read_version) = {
                let documents = self.documents.lock().await;
                let snapshot = Snapshot {
                    counter: documents.counter,
                    server_time: Utc::now(),
                };

                (snapshot, documents.version)
            };

            let mutation = body(&snapshot)?;

            if attempt == 1 {
                if let Some(gate) = &self.commit_gate {
                    gate.wait().await;
                }
            }

            if self.fail_next_commit.swap(false, Ordering::SeqCst) {
                return Err(TransactionError::Backend("injected commit failure".to_string()).into());
            }

            let mut documents = self.documents.lock().await;

            if self.take_interference() {
                documents.version += 1;
            }

            if documents.version != read_version {
                debug!(attempt, "Counter changed since read, retrying");
                continue;
            }

            if documents
                .complaints
                .contains_key(&mutation.complaint.complaint_id)
            {
                return Err(occupied_error(&mutation.complaint.key()).into());
            }

            documents
                .complaints
                .insert(mutation.complaint.complaint_id, mutation.complaint.clone());
            documents.counter = Some(Counter {
                complaints_count: mutation.complaints_count,
            });
            documents.version += 1;

            return Ok(mutation);
        }

        Err(TransactionError::ConflictExhausted {
            attempts: self.max_attempts,
        }
        .into())
    }

    async fn ping(&self) -> Result<(), TransactionError> {
        Ok(())
    }
}
