//! # Complaint Form
//!
//! Client-side state of the submission form.
//!
//! ## Rules
//! - Only one submission may be in flight per form, re-entry is refused until it resolves
//! - Nothing is sent if the gate in [`crate::validation`] rejects the contents
//! - Failure keeps every field so the user can retry without re-typing
//! - Success resets every field, anonymity back to on

use thiserror::Error;

use crate::{
    locale::Locale,
    payloads::{Category, SubmissionPayload},
    validation::{ValidationError, validate},
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Blocked {
    #[error("A submission is already in flight")]
    InFlight,

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl Blocked {
    pub fn message(&self, locale: Locale) -> &'static str {
        let messages = locale.messages();
        match self {
            Blocked::InFlight => messages.in_flight,
            Blocked::Invalid(_) => messages.invalid_form,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintForm {
    pub locale: Locale,
    pub category: Category,
    pub subject: String,
    pub message: String,
    pub anonymous: bool,
    pub name: String,
    pub student_id: String,
    pub email: String,
    sending: bool,
}

impl ComplaintForm {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            category: Category::default(),
            subject: String::new(),
            message: String::new(),
            anonymous: true,
            name: String::new(),
            student_id: String::new(),
            email: String::new(),
            sending: false,
        }
    }

    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn payload(&self) -> SubmissionPayload {
        SubmissionPayload {
            category: Some(self.category.label(self.locale).to_string()),
            subject: self.subject.clone(),
            body: self.message.clone(),
            anonymous: self.anonymous,
            name: self.name.clone(),
            student_id: self.student_id.clone(),
            email: self.email.clone(),
            lang: Some(self.locale.code().to_string()),
        }
    }

    /// Marks the form in flight and hands back what to send.
    pub fn begin_submit(&mut self) -> Result<SubmissionPayload, Blocked> {
        if self.sending {
            return Err(Blocked::InFlight);
        }

        let payload = self.payload();
        validate(&payload, self.locale)?;

        self.sending = true;
        Ok(payload)
    }

    /// Resolves the in-flight submission.
    pub fn finish(&mut self, succeeded: bool) {
        self.sending = false;

        if succeeded {
            *self = Self::new(self.locale);
        }
    }
}
