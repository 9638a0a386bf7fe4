use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use forms::{
    SubmissionPayload,
    payloads::{LangRequest, SubmissionReceipt, category_options},
};
use serde::Deserialize;

use crate::{
    error::AppError,
    state::AppState,
    submission::submit,
    utils::{request_locale, user_agent},
};

pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<SubmissionPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|_| AppError::MalformedPayload)?;
    let locale = request_locale(&headers, payload.lang.as_deref());

    let complaint = submit(state.store.as_ref(), &payload, locale, &user_agent(&headers))
        .await
        .map_err(|error| AppError::Submit { error, locale })?;

    let receipt = SubmissionReceipt {
        complaint_id: complaint.complaint_id,
        message: locale.messages().submitted.to_string(),
    };

    Ok((StatusCode::CREATED, Json(receipt)))
}

#[derive(Deserialize)]
pub struct LangQuery {
    lang: Option<String>,
}

pub async fn categories_handler(
    headers: HeaderMap,
    Query(query): Query<LangQuery>,
) -> impl IntoResponse {
    let locale = request_locale(&headers, query.lang.as_deref());

    Json(category_options(locale))
}

pub async fn lang_handler(
    payload: Result<Json<LangRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(request) = payload.map_err(|_| AppError::MalformedPayload)?;

    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, request.lang.set_cookie())]))
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Result<StatusCode, AppError> {
    state
        .store
        .ping()
        .await
        .map(|_| StatusCode::OK)
        .map_err(|_| AppError::Unavailable)
}
