use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::Serialize;

use crate::phrases::{PhraseError, PhraseRecord};
use crate::response::{AppError, SuccessResponse};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResolvedPhrase {
    date: NaiveDate,
    offset_days: i64,
    index: usize,
    phrase: PhraseRecord,
}

#[derive(Debug, Serialize)]
struct CatalogSummary {
    total: usize,
    phrases: Vec<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_phrases))
        .route("/today", get(today))
        .route("/offset/:offset", get(for_offset))
}

async fn list_phrases(State(state): State<AppState>) -> Json<SuccessResponse<CatalogSummary>> {
    let catalog = state.resolver().store().catalog();
    SuccessResponse::ok(CatalogSummary {
        total: catalog.len(),
        phrases: catalog.iter().map(|record| record.phrase.clone()).collect(),
    })
}

async fn today(State(state): State<AppState>) -> Result<Json<SuccessResponse<ResolvedPhrase>>, AppError> {
    resolve(&state, 0).map(SuccessResponse::ok)
}

async fn for_offset(
    State(state): State<AppState>,
    Path(offset): Path<String>,
) -> Result<Json<SuccessResponse<ResolvedPhrase>>, AppError> {
    let offset: i64 = offset
        .trim()
        .parse()
        .map_err(|_| AppError::validation("offset must be an integer"))?;
    if offset > 0 {
        return Err(AppError::validation("future phrases are not available"));
    }
    resolve(&state, offset).map(SuccessResponse::ok)
}

fn resolve(state: &AppState, offset_days: i64) -> Result<ResolvedPhrase, AppError> {
    let resolver = state.resolver();
    let date = resolver.date_for_offset(offset_days).map_err(resolve_error)?;
    let phrase = resolver.resolve_phrase(date).map_err(resolve_error)?;
    Ok(ResolvedPhrase {
        date,
        offset_days,
        index: resolver.index_for(date),
        phrase,
    })
}

fn resolve_error(err: PhraseError) -> AppError {
    match err {
        PhraseError::DateOutOfRange(_) => AppError::bad_request(err.to_string()),
        other => AppError::internal(other.to_string()),
    }
}
