use axum::http::{
    HeaderMap,
    header::{COOKIE, USER_AGENT},
};
use forms::Locale;

/// Client user agent, empty when the header is missing or not text.
pub fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn request_locale(headers: &HeaderMap, explicit: Option<&str>) -> Locale {
    let cookies = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .collect::<Vec<_>>()
        .join("; ");

    Locale::resolve(explicit, Some(cookies.as_str()))
}
