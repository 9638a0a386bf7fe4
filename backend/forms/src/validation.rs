//! Client-side gate run before the numbering transaction.
//!
//! Not a security boundary: nothing downstream re-checks these rules, they only
//! keep obviously broken submissions from reaching the store.

use thiserror::Error;

use crate::{
    locale::Locale,
    payloads::{Category, SubmissionPayload},
};

pub const SUBJECT_MAX: usize = 200;
pub const BODY_MAX: usize = 2000;

/// Stored in place of an identity field the submitter withheld.
pub const NOT_PROVIDED: &str = "مجهول";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Subject is empty")]
    EmptySubject,

    #[error("Subject is {0} units long, limit is {max}", max = SUBJECT_MAX)]
    SubjectTooLong(usize),

    #[error("Body is empty")]
    EmptyBody,

    #[error("Body is {0} units long, limit is {max}", max = BODY_MAX)]
    BodyTooLong(usize),

    #[error("Unknown category {0:?}")]
    UnknownCategory(String),
}

/// Submission that passed the gate, with trimming and sentinels applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    pub category: String,
    pub subject: String,
    pub body: String,
    pub anonymous: bool,
    pub name: String,
    pub student_id: String,
    pub email: String,
}

/// Length in UTF-16 code units.
pub fn units(text: &str) -> usize {
    text.encode_utf16().count()
}

pub fn validate(
    payload: &SubmissionPayload,
    locale: Locale,
) -> Result<ValidSubmission, ValidationError> {
    let category = match payload.category.as_deref() {
        None => Category::default(),
        Some(raw) => raw
            .parse::<Category>()
            .map_err(|_| ValidationError::UnknownCategory(raw.to_string()))?,
    };

    // limits apply to the raw input, emptiness to the trimmed one
    let subject = payload.subject.trim();
    if subject.is_empty() {
        return Err(ValidationError::EmptySubject);
    }
    let subject_units = units(&payload.subject);
    if subject_units > SUBJECT_MAX {
        return Err(ValidationError::SubjectTooLong(subject_units));
    }

    let body = payload.body.trim();
    if body.is_empty() {
        return Err(ValidationError::EmptyBody);
    }
    let body_units = units(&payload.body);
    if body_units > BODY_MAX {
        return Err(ValidationError::BodyTooLong(body_units));
    }

    Ok(ValidSubmission {
        category: category.label(locale).to_string(),
        subject: subject.to_string(),
        body: body.to_string(),
        anonymous: payload.anonymous,
        name: identity(payload.anonymous, &payload.name),
        student_id: identity(payload.anonymous, &payload.student_id),
        email: identity(payload.anonymous, &payload.email),
    })
}

fn identity(anonymous: bool, value: &str) -> String {
    let value = value.trim();

    if anonymous || value.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(subject: &str, body: &str) -> SubmissionPayload {
        SubmissionPayload {
            subject: subject.to_string(),
            body: body.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_subject_boundary() {
        assert!(validate(&payload(&"a".repeat(200), "body"), Locale::En).is_ok());
        assert_eq!(
            validate(&payload(&"a".repeat(201), "body"), Locale::En),
            Err(ValidationError::SubjectTooLong(201))
        );
    }

    #[test]
    fn test_body_boundary() {
        assert!(validate(&payload("s", &"b".repeat(2000)), Locale::En).is_ok());
        assert_eq!(
            validate(&payload("s", &"b".repeat(2001)), Locale::En),
            Err(ValidationError::BodyTooLong(2001))
        );
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert_eq!(
            validate(&payload("   ", "body"), Locale::En),
            Err(ValidationError::EmptySubject)
        );
        assert_eq!(
            validate(&payload("subject", "\n\t "), Locale::En),
            Err(ValidationError::EmptyBody)
        );
    }

    #[test]
    fn test_units_are_utf16() {
        // arabic letters are one unit each, astral emoji two
        assert_eq!(units("شكوى"), 4);
        assert_eq!(units("🙂"), 2);

        let subject = "🙂".repeat(100);
        assert!(validate(&payload(&subject, "body"), Locale::Ar).is_ok());

        let subject = format!("{subject}a");
        assert_eq!(
            validate(&payload(&subject, "body"), Locale::Ar),
            Err(ValidationError::SubjectTooLong(201))
        );
    }

    #[test]
    fn test_values_are_trimmed() {
        let valid = validate(&payload("  Wifi  ", "  Down again \n"), Locale::En).unwrap();

        assert_eq!(valid.subject, "Wifi");
        assert_eq!(valid.body, "Down again");
    }

    #[test]
    fn test_anonymous_hides_identity() {
        let mut submission = payload("s", "b");
        submission.anonymous = true;
        submission.name = "Jane".to_string();
        submission.student_id = "201912345".to_string();

        let valid = validate(&submission, Locale::En).unwrap();

        assert_eq!(valid.name, NOT_PROVIDED);
        assert_eq!(valid.student_id, NOT_PROVIDED);
        assert_eq!(valid.email, NOT_PROVIDED);
    }

    #[test]
    fn test_blank_identity_uses_sentinel() {
        let mut submission = payload("s", "b");
        submission.name = "".to_string();
        submission.student_id = "  ".to_string();
        submission.email = " jane@uni.edu ".to_string();

        let valid = validate(&submission, Locale::En).unwrap();

        assert_eq!(valid.name, NOT_PROVIDED);
        assert_eq!(valid.student_id, NOT_PROVIDED);
        assert_eq!(valid.email, "jane@uni.edu");
    }

    #[test]
    fn test_category_label_follows_locale() {
        let mut submission = payload("s", "b");
        submission.category = Some("Suggestion".to_string());

        assert_eq!(validate(&submission, Locale::Ar).unwrap().category, "اقتراح");
        assert_eq!(validate(&submission, Locale::En).unwrap().category, "Suggestion");

        submission.category = None;
        assert_eq!(validate(&submission, Locale::En).unwrap().category, "Complaint");

        submission.category = Some("Praise".to_string());
        assert_eq!(
            validate(&submission, Locale::En),
            Err(ValidationError::UnknownCategory("Praise".to_string()))
        );
    }
}
