//! # Submission
//!
//! The one stateful operation: mint the next complaint number and persist the
//! complaint under it, advancing the shared counter in the same transaction.
//!
//! ## Steps, inside one optimistic transaction
//! 1. Read the counter, `C`
//! 2. Next ID is `C + 1`
//! 3. Write the complaint at `complaints:<C + 1>` with status `new` and the server timestamp
//! 4. Set the counter to `C + 1`
//! 5. Commit, or re-run from step 1 if the counter moved under us
//!
//! IDs stay dense and strictly increasing from 1 as long as every write goes
//! through here. The validation gate runs first and a rejected form never
//! opens a transaction.

use forms::{
    Complaint, Locale, SubmissionPayload, ValidSubmission, records::COUNTERS_KEY, validate,
};
use tracing::{debug, error, info, warn};

use crate::{
    error::{SubmitError, TransactionError},
    store::{DocumentStore, Mutation, Snapshot},
};

/// Transaction body. Pure, so the store can re-run it on conflict.
pub fn number_complaint(
    snapshot: &Snapshot,
    submission: &ValidSubmission,
    user_agent: &str,
) -> Result<Mutation, SubmitError> {
    let counter = snapshot
        .counter
        .ok_or(SubmitError::MissingCounter(COUNTERS_KEY))?;

    let complaint_id = counter
        .complaints_count
        .checked_add(1)
        .ok_or_else(|| TransactionError::Backend("complaint counter overflow".to_string()))?;

    Ok(Mutation {
        complaint: Complaint::new(complaint_id, submission, snapshot.server_time, user_agent),
        complaints_count: complaint_id,
    })
}

pub async fn submit(
    store: &dyn DocumentStore,
    payload: &SubmissionPayload,
    locale: Locale,
    user_agent: &str,
) -> Result<Complaint, SubmitError> {
    let submission = validate(payload, locale).map_err(|e| {
        debug!("Rejected submission: {e}");
        e
    })?;

    let body = |snapshot: &Snapshot| number_complaint(snapshot, &submission, user_agent);

    match store.transact(&body).await {
        Ok(mutation) => {
            info!(
                complaint_id = mutation.complaint.complaint_id,
                "Complaint recorded"
            );

            Ok(mutation.complaint)
        }
        Err(e @ SubmitError::MissingCounter(_)) => {
            error!(kind = "configuration", "Submission failed: {e}");
            Err(e)
        }
        Err(SubmitError::Transaction(e)) => {
            warn!(
                kind = "transaction",
                cause = e.kind(),
                "Submission failed: {e}"
            );
            Err(SubmitError::Transaction(e))
        }
        Err(e) => Err(e),
    }
}
