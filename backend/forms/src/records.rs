//! # Records
//!
//! Persisted documents.
//!
//! ## Layout
//! - Counter record: hash [`COUNTERS_KEY`], field [`COUNT_FIELD`] holding the last issued complaint number.
//!   Created out-of-band by the operator, never by a submission.
//! - Complaint record: JSON string under [`complaint_key`], keyed by its sequence number.
//!   Immutable once written.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::ValidSubmission;

pub const COUNTERS_KEY: &str = "metadata_v2:counters";
pub const COUNT_FIELD: &str = "complaintsCount";
pub const COMPLAINTS_PREFIX: &str = "complaints";

pub fn complaint_key(complaint_id: u64) -> String {
    format!("{COMPLAINTS_PREFIX}:{complaint_id}")
}

/// Lifecycle tag. Submissions only ever create `New`; whatever moderation
/// tooling writes later is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    New,
    #[serde(untagged)]
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub complaint_id: u64,
    pub category: String,
    pub subject: String,
    pub body: String,
    pub status: Status,
    pub anonymous: bool,
    pub name: String,
    pub student_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    /// Client user agent, diagnostics only.
    pub ua: String,
}

impl Complaint {
    pub fn new(
        complaint_id: u64,
        submission: &ValidSubmission,
        created_at: DateTime<Utc>,
        user_agent: &str,
    ) -> Self {
        Self {
            complaint_id,
            category: submission.category.clone(),
            subject: submission.subject.clone(),
            body: submission.body.clone(),
            status: Status::New,
            anonymous: submission.anonymous,
            name: submission.name.clone(),
            student_id: submission.student_id.clone(),
            email: submission.email.clone(),
            created_at,
            ua: user_agent.to_string(),
        }
    }

    /// Storage key, the stringified sequence number under the complaints prefix.
    pub fn key(&self) -> String {
        complaint_key(self.complaint_id)
    }
}
