use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the cookie the selected language is persisted under.
pub const LANG_COOKIE: &str = "lang";

/// One year, in seconds.
pub const LANG_COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Ar,
    En,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown language {0:?}")]
pub struct UnknownLocale(pub String);

impl FromStr for Locale {
    type Err = UnknownLocale;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ar" => Ok(Locale::Ar),
            "en" => Ok(Locale::En),
            other => Err(UnknownLocale(other.to_string())),
        }
    }
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::Ar => "ar",
            Locale::En => "en",
        }
    }

    /// Picks the request language: explicit choice first, then the persisted
    /// cookie, then Arabic.
    pub fn resolve(explicit: Option<&str>, cookie_header: Option<&str>) -> Self {
        explicit
            .and_then(|code| code.parse::<Locale>().ok())
            .or_else(|| cookie_header.and_then(Self::from_cookie_header))
            .unwrap_or_default()
    }

    /// Reads the `lang` cookie out of a raw `Cookie` header value.
    pub fn from_cookie_header(header: &str) -> Option<Self> {
        header
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .find(|(name, _)| name.trim() == LANG_COOKIE)
            .and_then(|(_, value)| value.parse().ok())
    }

    /// `Set-Cookie` value persisting this language across sessions.
    pub fn set_cookie(self) -> String {
        format!(
            "{LANG_COOKIE}={}; Path=/; Max-Age={LANG_COOKIE_MAX_AGE}; SameSite=Lax",
            self.code()
        )
    }

    pub fn messages(self) -> &'static Messages {
        match self {
            Locale::Ar => &AR,
            Locale::En => &EN,
        }
    }
}

/// Strings shown around the complaint form.
pub struct Messages {
    pub invalid_form: &'static str,
    pub submitted: &'static str,
    pub submit_failed: &'static str,
    pub in_flight: &'static str,
    pub complaint: &'static str,
    pub suggestion: &'static str,
}

static AR: Messages = Messages {
    invalid_form: "الرجاء تعبئة العنوان والنص بشكل صحيح",
    submitted: "تم إرسال الشكوى بنجاح",
    submit_failed: "فشل الإرسال. تأكد من إعداد العداد والقواعد.",
    in_flight: "جارٍ الإرسال...",
    complaint: "شكوى",
    suggestion: "اقتراح",
};

static EN: Messages = Messages {
    invalid_form: "Please fill subject and message correctly",
    submitted: "Complaint submitted successfully",
    submit_failed: "Failed to submit. Check counter setup and rules.",
    in_flight: "Sending...",
    complaint: "Complaint",
    suggestion: "Suggestion",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("ar".parse::<Locale>(), Ok(Locale::Ar));
        assert_eq!(" EN ".parse::<Locale>(), Ok(Locale::En));
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn test_resolve_order() {
        assert_eq!(Locale::resolve(Some("en"), Some("lang=ar")), Locale::En);
        assert_eq!(Locale::resolve(None, Some("theme=dark; lang=en")), Locale::En);
        assert_eq!(Locale::resolve(Some("xx"), Some("lang=en")), Locale::En);
        assert_eq!(Locale::resolve(None, Some("lang=zz")), Locale::Ar);
        assert_eq!(Locale::resolve(None, None), Locale::Ar);
    }

    #[test]
    fn test_set_cookie_round_trips_through_header() {
        let cookie = Locale::En.set_cookie();
        let pair = cookie.split(';').next().unwrap();

        assert_eq!(Locale::from_cookie_header(pair), Some(Locale::En));
        assert!(cookie.contains("Max-Age=31536000"));
    }
}
