//! JSON bodies between the frontend and the server.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::locale::Locale;

/// Closed set of submission kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Complaint,
    Suggestion,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Complaint, Category::Suggestion];

    pub fn label(self, locale: Locale) -> &'static str {
        let messages = locale.messages();
        match self {
            Category::Complaint => messages.complaint,
            Category::Suggestion => messages.suggestion,
        }
    }
}

/// Accepts the canonical key or the label in either language, since the form
/// sends whichever label its chips displayed.
impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|category| {
                let key = match category {
                    Category::Complaint => "complaint",
                    Category::Suggestion => "suggestion",
                };

                s.eq_ignore_ascii_case(key)
                    || s == category.label(Locale::Ar)
                    || s == category.label(Locale::En)
            })
            .ok_or(())
    }
}

/// Raw form contents as posted to `POST /complaints`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionPayload {
    pub category: Option<String>,
    pub subject: String,
    #[serde(alias = "message")]
    pub body: String,
    pub anonymous: bool,
    pub name: String,
    pub student_id: String,
    pub email: String,
    pub lang: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub complaint_id: u64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryOption {
    pub key: Category,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LangRequest {
    pub lang: Locale,
}

pub fn category_options(locale: Locale) -> Vec<CategoryOption> {
    Category::ALL
        .into_iter()
        .map(|key| CategoryOption {
            key,
            label: key.label(locale).to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_accepts_keys_and_labels() {
        assert_eq!("complaint".parse::<Category>(), Ok(Category::Complaint));
        assert_eq!("Suggestion".parse::<Category>(), Ok(Category::Suggestion));
        assert_eq!("شكوى".parse::<Category>(), Ok(Category::Complaint));
        assert_eq!("اقتراح".parse::<Category>(), Ok(Category::Suggestion));
        assert_eq!("Praise".parse::<Category>(), Err(()));
    }

    #[test]
    fn test_payload_accepts_message_alias_and_defaults() {
        let payload: SubmissionPayload =
            serde_json::from_str(r#"{"subject":"Wifi","message":"Down again","studentId":"2021"}"#)
                .unwrap();

        assert_eq!(payload.body, "Down again");
        assert_eq!(payload.student_id, "2021");
        assert_eq!(payload.category, None);
        assert!(!payload.anonymous);
    }

    #[test]
    fn test_category_options_are_localized() {
        let options = category_options(Locale::Ar);

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].label, "شكوى");
        assert_eq!(options[1].key, Category::Suggestion);
    }
}
